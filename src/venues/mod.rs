// Venue integrations
// Per-kind swap encoders and quote readers, and the plan generator that
// assembles them into execution plans
//
// Numan Thabit 2025 Nov

pub mod abi;
pub mod adapter;
pub mod concentrated;
pub mod converter;
pub mod multi_hop;
pub mod plan;
pub mod stable_swap;
pub mod wrap;

pub use adapter::{Invocation, SwapLeg, VenueClient};
pub use plan::{Approval, ExecutionPlan, StepCall};

use crate::security::OperationSelector;
use abi::{Erc4626Vault, NativeStaking, StableSwapPool, UniV3Router, WrappedNative};
use alloy_sol_types::SolCall;

/// Selectors of every invocation the router can emit.
pub fn builtin_selectors() -> Vec<OperationSelector> {
    [
        UniV3Router::exactInputSingleCall::SELECTOR,
        UniV3Router::exactInputCall::SELECTOR,
        StableSwapPool::exchangeCall::SELECTOR,
        StableSwapPool::exchange_underlyingCall::SELECTOR,
        NativeStaking::submitCall::SELECTOR,
        Erc4626Vault::depositCall::SELECTOR,
        WrappedNative::depositCall::SELECTOR,
        WrappedNative::withdrawCall::SELECTOR,
    ]
    .into_iter()
    .map(OperationSelector::new)
    .collect()
}
