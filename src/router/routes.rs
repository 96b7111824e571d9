// Route types and venue-specific route parameters
// This file defines venue kinds, the per-kind parameter payloads and the
// route descriptors stored for each ordered asset pair
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::errors::RouterError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Minimum number of assets in a multi-hop path (two hops).
pub const MIN_PATH_LEN: usize = 3;
/// Maximum number of assets in a multi-hop path.
pub const MAX_PATH_LEN: usize = 5;
/// Maximum intermediates in a multi-step chain.
pub const MAX_CHAIN_INTERMEDIATES: usize = 3;
/// Largest fee a concentrated-liquidity pool can carry (uint24).
pub const MAX_POOL_FEE: u32 = 0x00ff_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    ConcentratedLiquidityAmm,
    StableSwapAmm,
    DirectConverter,
    MultiHopPath,
    MultiStepChain,
}

impl VenueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueKind::ConcentratedLiquidityAmm => "concentrated_liquidity_amm",
            VenueKind::StableSwapAmm => "stable_swap_amm",
            VenueKind::DirectConverter => "direct_converter",
            VenueKind::MultiHopPath => "multi_hop_path",
            VenueKind::MultiStepChain => "multi_step_chain",
        }
    }
}

/// Call shape of a mint-style converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ConverterCall {
    /// Payable `submit(referral)` staking entry point; input must be native.
    NativeStake { referral: Address },
    /// ERC-4626 `deposit(assets, receiver)`.
    Erc4626Deposit,
}

/// Venue-specific route payload; the variant is the discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RouteParams {
    ConcentratedLiquidity {
        router: Address,
        quoter: Address,
        fee: u32,
    },
    StableSwap {
        pool: Address,
        i: i8,
        j: i8,
        #[serde(default)]
        underlying: bool,
    },
    DirectConverter {
        converter: Address,
        call: ConverterCall,
    },
    MultiHopPath {
        router: Address,
        quoter: Address,
        path: Vec<AssetId>,
        fees: Vec<u32>,
    },
    MultiStepChain {
        via: Vec<AssetId>,
    },
}

impl RouteParams {
    pub fn kind(&self) -> VenueKind {
        match self {
            RouteParams::ConcentratedLiquidity { .. } => VenueKind::ConcentratedLiquidityAmm,
            RouteParams::StableSwap { .. } => VenueKind::StableSwapAmm,
            RouteParams::DirectConverter { .. } => VenueKind::DirectConverter,
            RouteParams::MultiHopPath { .. } => VenueKind::MultiHopPath,
            RouteParams::MultiStepChain { .. } => VenueKind::MultiStepChain,
        }
    }

    /// Venue the emitted invocation is sent to. Chains have no single target.
    pub fn target(&self) -> Option<Address> {
        match self {
            RouteParams::ConcentratedLiquidity { router, .. } => Some(*router),
            RouteParams::StableSwap { pool, .. } => Some(*pool),
            RouteParams::DirectConverter { converter, .. } => Some(*converter),
            RouteParams::MultiHopPath { router, .. } => Some(*router),
            RouteParams::MultiStepChain { .. } => None,
        }
    }

    /// Parameters for the opposite direction, for kinds that can be reversed.
    pub fn reversed(&self) -> Option<RouteParams> {
        match self {
            RouteParams::ConcentratedLiquidity { .. } => Some(self.clone()),
            RouteParams::StableSwap {
                pool,
                i,
                j,
                underlying,
            } => Some(RouteParams::StableSwap {
                pool: *pool,
                i: *j,
                j: *i,
                underlying: *underlying,
            }),
            RouteParams::MultiHopPath {
                router,
                quoter,
                path,
                fees,
            } => Some(RouteParams::MultiHopPath {
                router: *router,
                quoter: *quoter,
                path: path.iter().rev().copied().collect(),
                fees: fees.iter().rev().copied().collect(),
            }),
            RouteParams::DirectConverter { .. } | RouteParams::MultiStepChain { .. } => None,
        }
    }

    /// Shape checks that do not depend on router state.
    pub fn validate(&self, asset_in: AssetId, asset_out: AssetId) -> Result<(), RouterError> {
        match self {
            RouteParams::ConcentratedLiquidity { router, fee, .. } => {
                ensure_address(*router, "router")?;
                if *fee == 0 || *fee > MAX_POOL_FEE {
                    return Err(RouterError::InvalidRoute(format!("fee tier {fee} out of range")));
                }
            }
            RouteParams::StableSwap { pool, i, j, .. } => {
                ensure_address(*pool, "pool")?;
                if i == j || *i < 0 || *j < 0 {
                    return Err(RouterError::InvalidRoute(format!(
                        "stable-swap indices ({i}, {j}) invalid"
                    )));
                }
            }
            RouteParams::DirectConverter { converter, call } => {
                ensure_address(*converter, "converter")?;
                if matches!(call, ConverterCall::NativeStake { .. }) && !asset_in.is_native() {
                    return Err(RouterError::InvalidRoute(
                        "native-stake converter requires native input".into(),
                    ));
                }
            }
            RouteParams::MultiHopPath {
                router, path, fees, ..
            } => {
                ensure_address(*router, "router")?;
                if path.len() < MIN_PATH_LEN {
                    return Err(RouterError::PathTooShort {
                        len: path.len(),
                        min: MIN_PATH_LEN,
                    });
                }
                if path.len() > MAX_PATH_LEN {
                    return Err(RouterError::InvalidPath(format!(
                        "{} assets exceeds maximum {MAX_PATH_LEN}",
                        path.len()
                    )));
                }
                if fees.len() != path.len() - 1 {
                    return Err(RouterError::InvalidPath(format!(
                        "{} fees for {} hops",
                        fees.len(),
                        path.len() - 1
                    )));
                }
                if path.first() != Some(&asset_in) || path.last() != Some(&asset_out) {
                    return Err(RouterError::InvalidPath(
                        "path endpoints do not match the pair".into(),
                    ));
                }
                if path.iter().any(|a| a.is_native()) {
                    return Err(RouterError::InvalidPath(
                        "path must use wrapped assets".into(),
                    ));
                }
                if path.windows(2).any(|w| w[0] == w[1]) {
                    return Err(RouterError::InvalidPath("repeated adjacent asset".into()));
                }
                if let Some(fee) = fees.iter().find(|f| **f == 0 || **f > MAX_POOL_FEE) {
                    return Err(RouterError::InvalidPath(format!("fee tier {fee} out of range")));
                }
            }
            RouteParams::MultiStepChain { via } => {
                if via.is_empty() || via.len() > MAX_CHAIN_INTERMEDIATES {
                    return Err(RouterError::InvalidRoute(format!(
                        "chain needs 1..={MAX_CHAIN_INTERMEDIATES} intermediates, got {}",
                        via.len()
                    )));
                }
                if via.iter().any(|a| *a == asset_in || *a == asset_out) {
                    return Err(RouterError::InvalidRoute(
                        "chain intermediate repeats an endpoint".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn ensure_address(addr: Address, what: &str) -> Result<(), RouterError> {
    if addr == Address::ZERO {
        return Err(RouterError::InvalidRoute(format!("{what} address is zero")));
    }
    Ok(())
}

/// Ordered asset pair used as the route table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
}

impl PairKey {
    pub fn new(asset_in: AssetId, asset_out: AssetId) -> Self {
        Self {
            asset_in,
            asset_out,
        }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.asset_out, self.asset_in)
    }
}

/// Stored route for one ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub params: RouteParams,
    pub is_configured: bool,
    pub fallback_slippage_bps: u32,
    pub supports_live_quote: bool,
}

impl RouteDescriptor {
    pub fn venue_kind(&self) -> VenueKind {
        self.params.kind()
    }
}

/// Native-asset conversion bracketing a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapStep {
    Wrap,
    Unwrap,
}
