// Route configuration store
// This file holds the persisted router state: the route table keyed by
// ordered asset pair, the venue registry, selector lists, per-pair overrides,
// roles and pause switches, plus JSON snapshot save/load
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::control::PauseSwitches;
use crate::errors::RouterError;
use crate::router::routes::{PairKey, RouteDescriptor};
use crate::security::{
    AccessTable, OperationSelector, Role, SecretCommitment, SelectorPolicy, VenueRegistration,
    VenueRegistry,
};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RouterState {
    pub(crate) commitment: Option<SecretCommitment>,
    pub(crate) routes: HashMap<PairKey, RouteDescriptor>,
    pub(crate) venues: VenueRegistry,
    pub(crate) selectors: SelectorPolicy,
    pub(crate) slippage_overrides: HashMap<PairKey, u32>,
    pub(crate) fallback_rates: HashMap<PairKey, u32>,
    pub(crate) access: AccessTable,
    pub(crate) switches: PauseSwitches,
}

impl RouterState {
    pub fn new(venue_cooldown_secs: u64) -> Self {
        Self {
            commitment: None,
            routes: HashMap::new(),
            venues: VenueRegistry::new(venue_cooldown_secs),
            selectors: SelectorPolicy::default(),
            slippage_overrides: HashMap::new(),
            fallback_rates: HashMap::new(),
            access: AccessTable::default(),
            switches: PauseSwitches::default(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.commitment.is_some()
    }

    pub fn ensure_initialized(&self) -> Result<SecretCommitment, RouterError> {
        self.commitment.ok_or(RouterError::NotInitialized)
    }

    /// Stored descriptor for the exact ordered pair.
    pub fn route(&self, asset_in: AssetId, asset_out: AssetId) -> Option<&RouteDescriptor> {
        self.routes
            .get(&PairKey::new(asset_in, asset_out))
            .filter(|r| r.is_configured)
    }

    pub fn slippage_override(&self, pair: PairKey) -> Option<u32> {
        self.slippage_overrides.get(&pair).copied()
    }

    /// Static conversion rate for fallback estimates (10 000 = 1:1).
    pub fn fallback_rate_bps(&self, pair: PairKey) -> u32 {
        self.fallback_rates
            .get(&pair)
            .copied()
            .or_else(|| {
                // a configured forward rate implies the inverse
                self.fallback_rates
                    .get(&pair.reversed())
                    .filter(|r| **r > 0)
                    .map(|r| ((100_000_000u64 / u64::from(*r)).min(u64::from(u32::MAX))) as u32)
            })
            .unwrap_or(crate::quant::BPS_DENOMINATOR)
    }

    pub fn venues(&self) -> &VenueRegistry {
        &self.venues
    }

    pub fn selectors(&self) -> &SelectorPolicy {
        &self.selectors
    }

    pub fn switches(&self) -> &PauseSwitches {
        &self.switches
    }

    pub fn access(&self) -> &AccessTable {
        &self.access
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let mut routes: Vec<RouteEntry> = self
            .routes
            .iter()
            .map(|(k, r)| RouteEntry {
                asset_in: k.asset_in,
                asset_out: k.asset_out,
                route: r.clone(),
            })
            .collect();
        routes.sort_by_key(|e| (e.asset_in, e.asset_out));
        let pairs = |m: &HashMap<PairKey, u32>| {
            let mut v: Vec<PairValue> = m
                .iter()
                .map(|(k, v)| PairValue {
                    asset_in: k.asset_in,
                    asset_out: k.asset_out,
                    value: *v,
                })
                .collect();
            v.sort_by_key(|e| (e.asset_in, e.asset_out));
            v
        };
        StateSnapshot {
            commitment: self.commitment,
            venue_cooldown_secs: self.venues.cooldown_secs(),
            routes,
            venues: self.venues.entries(),
            allowed_selectors: self.selectors.allowed(),
            denied_selectors: self.selectors.denied(),
            slippage_overrides: pairs(&self.slippage_overrides),
            fallback_rates: pairs(&self.fallback_rates),
            roles: self.access.entries(),
            switches: self.switches.clone(),
        }
    }

    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        let mut state = Self::new(snapshot.venue_cooldown_secs);
        state.commitment = snapshot.commitment;
        state.routes = snapshot
            .routes
            .into_iter()
            .map(|e| (PairKey::new(e.asset_in, e.asset_out), e.route))
            .collect();
        state.venues.restore(snapshot.venues);
        for sel in snapshot.allowed_selectors {
            state.selectors.set_allowed(sel, true);
        }
        for sel in snapshot.denied_selectors {
            state.selectors.set_denied(sel, true);
        }
        state.slippage_overrides = snapshot
            .slippage_overrides
            .into_iter()
            .map(|e| (PairKey::new(e.asset_in, e.asset_out), e.value))
            .collect();
        state.fallback_rates = snapshot
            .fallback_rates
            .into_iter()
            .map(|e| (PairKey::new(e.asset_in, e.asset_out), e.value))
            .collect();
        for (account, role) in snapshot.roles {
            state.access.grant(role, account);
        }
        state.switches = snapshot.switches;
        state
    }

    pub fn save(&self, path: &Path) -> Result<(), RouterError> {
        let json = serde_json::to_vec_pretty(&self.snapshot())
            .map_err(|e| RouterError::Snapshot(format!("encode: {e}")))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| RouterError::Snapshot(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| RouterError::Snapshot(format!("rename {}: {e}", path.display())))?;
        info!(path = %path.display(), routes = self.routes.len(), "router state saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, RouterError> {
        let raw = std::fs::read(path)
            .map_err(|e| RouterError::Snapshot(format!("read {}: {e}", path.display())))?;
        let snapshot: StateSnapshot = serde_json::from_slice(&raw)
            .map_err(|e| RouterError::Snapshot(format!("decode: {e}")))?;
        let state = Self::from_snapshot(snapshot);
        info!(path = %path.display(), routes = state.routes.len(), "router state loaded");
        Ok(state)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub route: RouteDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairValue {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub value: u32,
}

/// Serialized form of [`RouterState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub commitment: Option<SecretCommitment>,
    pub venue_cooldown_secs: u64,
    pub routes: Vec<RouteEntry>,
    pub venues: Vec<VenueRegistration>,
    pub allowed_selectors: Vec<OperationSelector>,
    pub denied_selectors: Vec<OperationSelector>,
    pub slippage_overrides: Vec<PairValue>,
    pub fallback_rates: Vec<PairValue>,
    pub roles: Vec<(Address, Role)>,
    pub switches: PauseSwitches,
}
