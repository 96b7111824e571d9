// Error types and error handling module
// This file defines the router error taxonomy and the coarse error kinds
// callers use to decide whether a failure is retryable
//
// Numan Thabit 2025 Nov

use crate::assets::{AssetCategory, AssetId};
use crate::router::routes::VenueKind;
use alloy_primitives::Address;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`RouterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InputValidation,
    Configuration,
    Security,
    Execution,
    State,
}

#[derive(Debug, Error)]
pub enum RouterError {
    // input validation
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("cannot swap asset {0} for itself")]
    SameAsset(AssetId),
    #[error("multi-hop path too short: {len} assets, need at least {min}")]
    PathTooShort { len: usize, min: usize },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("malformed selector: {0}")]
    MalformedSelector(String),
    #[error("invalid route parameters: {0}")]
    InvalidRoute(String),
    #[error("slippage {0} bps out of range")]
    InvalidSlippage(u32),

    // configuration
    #[error("no route found for {asset_in} -> {asset_out}")]
    NoRouteFound { asset_in: AssetId, asset_out: AssetId },
    #[error("route {asset_in} -> {asset_out} is not configured")]
    RouteNotConfigured { asset_in: AssetId, asset_out: AssetId },
    #[error("cross-category swap {from:?} -> {to:?} has no bridge")]
    CrossCategorySwap { from: AssetCategory, to: AssetCategory },
    #[error("venue {0} is not whitelisted")]
    VenueNotWhitelisted(Address),
    #[error("venue {0} is paused")]
    VenuePaused(Address),
    #[error("venue kind {0:?} is paused")]
    ProtocolPaused(VenueKind),
    #[error("router is paused")]
    Paused,

    // security
    #[error("caller {0} lacks the required role")]
    Unauthorized(Address),
    #[error("route secret does not match commitment")]
    InvalidSecret,
    #[error("invalid secret commitment: {0}")]
    InvalidCommitment(String),
    #[error("selector {0} is blacklisted")]
    SelectorBlacklisted(String),
    #[error("selector {0} is not whitelisted")]
    SelectorNotWhitelisted(String),
    #[error("venue {0} is not registered")]
    VenueNotRegistered(Address),
    #[error("venue {0} is already registered")]
    VenueAlreadyRegistered(Address),
    #[error("venue {venue} is timelocked for another {remaining_secs}s")]
    TimelockActive { venue: Address, remaining_secs: u64 },
    #[error("venue {0} has no deployed code")]
    VenueHasNoCode(Address),
    #[error("reentrant call rejected")]
    Reentrancy,

    // execution
    #[error("output {actual} below minimum {minimum}")]
    InsufficientOutput { actual: String, minimum: String },
    #[error("venue call to {target} failed: {reason}")]
    VenueCall { target: Address, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("quote is stale: age {age_secs}s exceeds {max_age_secs}s")]
    StaleQuote { age_secs: u64, max_age_secs: u64 },

    // state
    #[error("router already initialized")]
    AlreadyInitialized,
    #[error("router not initialized")]
    NotInitialized,
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl RouterError {
    pub fn kind(&self) -> ErrorKind {
        use RouterError::*;
        match self {
            ZeroAmount
            | SameAsset(_)
            | PathTooShort { .. }
            | InvalidPath(_)
            | MalformedSelector(_)
            | InvalidRoute(_)
            | InvalidSlippage(_) => ErrorKind::InputValidation,
            NoRouteFound { .. }
            | RouteNotConfigured { .. }
            | CrossCategorySwap { .. }
            | VenueNotWhitelisted(_)
            | VenuePaused(_)
            | ProtocolPaused(_)
            | Paused => ErrorKind::Configuration,
            Unauthorized(_)
            | InvalidSecret
            | InvalidCommitment(_)
            | SelectorBlacklisted(_)
            | SelectorNotWhitelisted(_)
            | VenueNotRegistered(_)
            | VenueAlreadyRegistered(_)
            | TimelockActive { .. }
            | VenueHasNoCode(_)
            | Reentrancy => ErrorKind::Security,
            InsufficientOutput { .. }
            | VenueCall { .. }
            | Transport(_)
            | StaleQuote { .. } => ErrorKind::Execution,
            AlreadyInitialized | NotInitialized | Snapshot(_) => ErrorKind::State,
        }
    }
}
