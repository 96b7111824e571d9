// Control plane: pause switches and execution mode
//
// Provides the global kill switch, per-venue-kind circuit breakers and the
// direct-transfer execution mode flag consumed by the calling vault.
// Per-venue pause flags live on the venue registration itself.
//
// Numan Thabit 2025 Nov

use crate::errors::RouterError;
use crate::router::routes::VenueKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitches {
    global: bool,
    kinds: HashSet<VenueKind>,
    direct_transfer: bool,
}

impl PauseSwitches {
    pub fn is_paused(&self) -> bool {
        self.global
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.global = paused;
        debug!(paused, "global pause switch");
    }

    pub fn is_kind_paused(&self, kind: VenueKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn set_kind_paused(&mut self, kind: VenueKind, paused: bool) {
        if paused {
            self.kinds.insert(kind);
        } else {
            self.kinds.remove(&kind);
        }
        debug!(kind = kind.as_str(), paused, "venue kind pause switch");
    }

    pub fn direct_transfer(&self) -> bool {
        self.direct_transfer
    }

    pub fn set_direct_transfer(&mut self, enabled: bool) {
        self.direct_transfer = enabled;
    }

    pub fn ensure_not_paused(&self) -> Result<(), RouterError> {
        if self.global {
            return Err(RouterError::Paused);
        }
        Ok(())
    }

    pub fn ensure_kind_active(&self, kind: VenueKind) -> Result<(), RouterError> {
        if self.kinds.contains(&kind) {
            return Err(RouterError::ProtocolPaused(kind));
        }
        Ok(())
    }
}
