// Venue adapter module
// This file defines the read-only venue client seam and dispatches swap
// encoding and quote candidates to the per-kind venue generators
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::errors::RouterError;
use crate::router::routes::{RouteParams, VenueKind};
use crate::venues::{concentrated, converter, multi_hop, stable_swap};
use alloy_primitives::{Address, Bytes, U256};
use std::future::Future;

/// Read-only access to deployed venues.
pub trait VenueClient: Send + Sync + 'static {
    /// Execute a static call and return the raw return data.
    fn call(
        &self,
        target: Address,
        calldata: Bytes,
    ) -> impl Future<Output = Result<Bytes, RouterError>> + Send;

    /// Size of the code deployed at `target`; zero for plain accounts.
    fn code_size(&self, target: Address) -> impl Future<Output = Result<usize, RouterError>> + Send;
}

/// One venue-level swap as seen by the venue: assets are the ones the venue
/// actually receives and produces.
#[derive(Debug, Clone)]
pub struct SwapLeg {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: U256,
    pub minimum_output: U256,
    pub recipient: Address,
    pub deadline: u64,
    pub wrapped_native: AssetId,
}

impl SwapLeg {
    /// Token address the venue sees; the native sentinel maps to wrapped native.
    pub fn token(&self, asset: AssetId) -> Address {
        if asset.is_native() {
            self.wrapped_native.address()
        } else {
            asset.address()
        }
    }

    /// Native input rides along as call value.
    pub fn native_value(&self) -> U256 {
        if self.asset_in.is_native() {
            self.amount_in
        } else {
            U256::ZERO
        }
    }
}

/// Encoded venue call: target, calldata and attached value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: Address,
    pub payload: Bytes,
    pub value: U256,
}

pub type ReturnDecoder = fn(&[u8]) -> Result<U256, alloy_sol_types::Error>;

/// A read-only quoting call to try; the first non-zero answer wins.
#[derive(Clone)]
pub struct QuoteCandidate {
    pub label: String,
    pub target: Address,
    pub calldata: Bytes,
    pub decode: ReturnDecoder,
}

impl std::fmt::Debug for QuoteCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteCandidate")
            .field("label", &self.label)
            .field("target", &self.target)
            .finish()
    }
}

/// Encode the swap invocation for a single (non-chain) route.
pub fn encode_swap(params: &RouteParams, leg: &SwapLeg) -> Result<Invocation, RouterError> {
    match params {
        RouteParams::ConcentratedLiquidity { router, fee, .. } => {
            Ok(concentrated::encode_swap(*router, *fee, leg))
        }
        RouteParams::StableSwap {
            pool,
            i,
            j,
            underlying,
        } => Ok(stable_swap::encode_swap(*pool, *i, *j, *underlying, leg)),
        RouteParams::DirectConverter { converter, call } => {
            converter::encode_swap(*converter, call, leg)
        }
        RouteParams::MultiHopPath {
            router, path, fees, ..
        } => multi_hop::encode_swap(*router, path, fees, leg),
        RouteParams::MultiStepChain { .. } => Err(RouterError::InvalidRoute(
            "multi-step chains are planned hop by hop".into(),
        )),
    }
}

/// Live quoting calls for a route, in the order they should be tried.
pub fn quote_candidates(params: &RouteParams, leg: &SwapLeg) -> Vec<QuoteCandidate> {
    match params {
        RouteParams::ConcentratedLiquidity { quoter, fee, .. } => {
            concentrated::quote_candidates(*quoter, *fee, leg)
        }
        RouteParams::StableSwap {
            pool,
            i,
            j,
            underlying,
        } => stable_swap::quote_candidates(*pool, *i, *j, *underlying, leg),
        RouteParams::MultiHopPath {
            quoter, path, fees, ..
        } => multi_hop::quote_candidates(*quoter, path, fees, leg),
        RouteParams::DirectConverter { .. } | RouteParams::MultiStepChain { .. } => Vec::new(),
    }
}

/// Kinds whose output is known without asking the venue.
pub fn has_fixed_rate(kind: VenueKind) -> bool {
    kind == VenueKind::DirectConverter
}
