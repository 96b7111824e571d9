// Security gate
// This file implements role checks, the construction-time route secret
// commitment, the timelocked venue registry, selector allow/deny filtering
// and the process-wide reentrancy guard
//
// Numan Thabit 2025 Nov

use crate::errors::RouterError;
use alloy_primitives::{Address, FixedBytes};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Default delay between venue registration and de-registration eligibility.
pub const DEFAULT_VENUE_COOLDOWN_SECS: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    RouteManager,
    Pauser,
}

/// Identity and credentials of the caller of an admin operation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub caller: Address,
    pub secret: Option<String>,
}

impl AuthContext {
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    roles: HashMap<Address, HashSet<Role>>,
}

impl AccessTable {
    pub fn has(&self, role: Role, account: Address) -> bool {
        self.roles
            .get(&account)
            .is_some_and(|roles| roles.contains(&role))
    }

    pub fn require_any(&self, roles: &[Role], account: Address) -> Result<(), RouterError> {
        if roles.iter().any(|r| self.has(*r, account)) {
            Ok(())
        } else {
            warn!(%account, ?roles, "unauthorized admin call");
            Err(RouterError::Unauthorized(account))
        }
    }

    /// Returns false if the account already held the role.
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        self.roles.entry(account).or_default().insert(role)
    }

    /// Returns false if the account did not hold the role.
    pub fn revoke(&mut self, role: Role, account: Address) -> bool {
        let removed = self
            .roles
            .get_mut(&account)
            .is_some_and(|roles| roles.remove(&role));
        if self.roles.get(&account).is_some_and(|r| r.is_empty()) {
            self.roles.remove(&account);
        }
        removed
    }

    pub fn count(&self, role: Role) -> usize {
        self.roles.values().filter(|r| r.contains(&role)).count()
    }

    pub fn entries(&self) -> Vec<(Address, Role)> {
        let mut out: Vec<_> = self
            .roles
            .iter()
            .flat_map(|(a, roles)| roles.iter().map(move |r| (*a, *r)))
            .collect();
        out.sort_by_key(|(a, r)| (*a, *r as u8));
        out
    }
}

/// blake2b-256 commitment to the route-mutation secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretCommitment(pub FixedBytes<32>);

impl SecretCommitment {
    pub fn from_secret(secret: &str) -> Self {
        Self(FixedBytes::from(hash_secret(secret)))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, RouterError> {
        let raw = hex::decode(hex_str.trim_start_matches("0x"))
            .map_err(|e| RouterError::InvalidCommitment(e.to_string()))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| RouterError::InvalidCommitment("expected 32 bytes".into()))?;
        Ok(Self(FixedBytes::from(bytes)))
    }

    pub fn verify(&self, secret: Option<&str>) -> Result<(), RouterError> {
        let secret = secret.ok_or(RouterError::InvalidSecret)?;
        let candidate = hash_secret(secret);
        let diff = candidate
            .iter()
            .zip(self.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            Ok(())
        } else {
            Err(RouterError::InvalidSecret)
        }
    }
}

type Blake2b256 = Blake2b<U32>;

fn hash_secret(secret: &str) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(secret.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Four-byte operation code at the head of a venue call payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationSelector(pub FixedBytes<4>);

impl OperationSelector {
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(FixedBytes::from(bytes))
    }

    pub fn parse(s: &str) -> Result<Self, RouterError> {
        let raw = hex::decode(s.trim_start_matches("0x"))
            .map_err(|_| RouterError::MalformedSelector(s.to_string()))?;
        let bytes: [u8; 4] = raw
            .try_into()
            .map_err(|_| RouterError::MalformedSelector(s.to_string()))?;
        Ok(Self::new(bytes))
    }

    pub fn of_payload(payload: &[u8]) -> Result<Self, RouterError> {
        let head: [u8; 4] = payload
            .get(..4)
            .and_then(|h| h.try_into().ok())
            .ok_or_else(|| RouterError::MalformedSelector(format!("0x{}", hex::encode(payload))))?;
        Ok(Self::new(head))
    }
}

impl fmt::Display for OperationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allow/deny sets for venue operations. Deny always wins.
#[derive(Debug, Clone, Default)]
pub struct SelectorPolicy {
    allowed: HashSet<OperationSelector>,
    denied: HashSet<OperationSelector>,
}

impl SelectorPolicy {
    pub fn set_allowed(&mut self, selector: OperationSelector, allowed: bool) {
        if allowed {
            self.allowed.insert(selector);
        } else {
            self.allowed.remove(&selector);
        }
    }

    pub fn set_denied(&mut self, selector: OperationSelector, denied: bool) {
        if denied {
            self.denied.insert(selector);
        } else {
            self.denied.remove(&selector);
        }
    }

    pub fn is_allowed(&self, selector: &OperationSelector) -> bool {
        self.allowed.contains(selector)
    }

    pub fn is_denied(&self, selector: &OperationSelector) -> bool {
        self.denied.contains(selector)
    }

    pub fn check(&self, selector: OperationSelector) -> Result<(), RouterError> {
        if self.denied.contains(&selector) {
            return Err(RouterError::SelectorBlacklisted(selector.to_string()));
        }
        if !self.allowed.contains(&selector) {
            return Err(RouterError::SelectorNotWhitelisted(selector.to_string()));
        }
        Ok(())
    }

    pub fn check_payload(&self, payload: &[u8]) -> Result<(), RouterError> {
        self.check(OperationSelector::of_payload(payload)?)
    }

    pub fn allowed(&self) -> Vec<OperationSelector> {
        self.allowed.iter().copied().collect()
    }

    pub fn denied(&self) -> Vec<OperationSelector> {
        self.denied.iter().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRegistration {
    pub venue: Address,
    pub whitelisted: bool,
    pub paused: bool,
    pub registered_at: u64,
    pub registered_by: Address,
}

/// Registered venues with a cooldown before de-registration.
#[derive(Debug, Clone)]
pub struct VenueRegistry {
    venues: HashMap<Address, VenueRegistration>,
    cooldown_secs: u64,
}

impl VenueRegistry {
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            venues: HashMap::new(),
            cooldown_secs,
        }
    }

    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    pub fn set_cooldown_secs(&mut self, cooldown_secs: u64) {
        self.cooldown_secs = cooldown_secs;
    }

    pub fn get(&self, venue: &Address) -> Option<&VenueRegistration> {
        self.venues.get(venue)
    }

    pub fn check_can_register(&self, venue: Address) -> Result<(), RouterError> {
        if venue == Address::ZERO {
            return Err(RouterError::VenueHasNoCode(venue));
        }
        if self.venues.contains_key(&venue) {
            return Err(RouterError::VenueAlreadyRegistered(venue));
        }
        Ok(())
    }

    pub fn register(
        &mut self,
        venue: Address,
        by: Address,
        now: u64,
    ) -> Result<&VenueRegistration, RouterError> {
        self.check_can_register(venue)?;
        info!(%venue, %by, at = now, "venue registered");
        Ok(self.venues.entry(venue).or_insert(VenueRegistration {
            venue,
            whitelisted: true,
            paused: false,
            registered_at: now,
            registered_by: by,
        }))
    }

    pub fn check_can_unregister(&self, venue: Address, now: u64) -> Result<(), RouterError> {
        let reg = self
            .venues
            .get(&venue)
            .ok_or(RouterError::VenueNotRegistered(venue))?;
        let unlock_at = reg.registered_at.saturating_add(self.cooldown_secs);
        if now < unlock_at {
            return Err(RouterError::TimelockActive {
                venue,
                remaining_secs: unlock_at - now,
            });
        }
        Ok(())
    }

    pub fn unregister(&mut self, venue: Address, now: u64) -> Result<VenueRegistration, RouterError> {
        self.check_can_unregister(venue, now)?;
        self.venues
            .remove(&venue)
            .ok_or(RouterError::VenueNotRegistered(venue))
    }

    pub fn get_mut(&mut self, venue: Address) -> Result<&mut VenueRegistration, RouterError> {
        self.venues
            .get_mut(&venue)
            .ok_or(RouterError::VenueNotRegistered(venue))
    }

    /// Venue must be registered, whitelisted and not paused.
    pub fn ensure_usable(&self, venue: Address) -> Result<(), RouterError> {
        let reg = self
            .venues
            .get(&venue)
            .ok_or(RouterError::VenueNotRegistered(venue))?;
        if !reg.whitelisted {
            return Err(RouterError::VenueNotWhitelisted(venue));
        }
        if reg.paused {
            return Err(RouterError::VenuePaused(venue));
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<VenueRegistration> {
        let mut out: Vec<_> = self.venues.values().cloned().collect();
        out.sort_by_key(|r| r.venue);
        out
    }

    pub fn restore(&mut self, entries: Vec<VenueRegistration>) {
        self.venues = entries.into_iter().map(|r| (r.venue, r)).collect();
    }
}

/// Rejects nested entry into sensitive operations.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

/// Held for the duration of a sensitive operation; releases on drop.
#[must_use]
pub struct ReentrancyLock<'a> {
    guard: &'a ReentrancyGuard,
}

impl ReentrancyGuard {
    pub fn enter(&self) -> Result<ReentrancyLock<'_>, RouterError> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RouterError::Reentrancy)?;
        Ok(ReentrancyLock { guard: self })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}
