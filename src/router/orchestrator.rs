// Multi-step orchestrator
// This file decomposes bridged and chained routes into ordered hops, chains
// hop estimates forward and propagates intermediate minimums backward so a
// conservative early hop never leaves a later hop's target unreachable
//
// Numan Thabit 2025 Nov

use crate::assets::{AssetId, AssetRegistry};
use crate::errors::RouterError;
use crate::quant::gross_up;
use crate::router::engine::RouterSettings;
use crate::router::quote::{
    effective_slippage_bps, minimum_output, Quote, QuoteRequest, QuoteService, QuoteSource,
};
use crate::router::resolver::{resolve_single, Resolution, ResolvedHop};
use crate::router::routes::{RouteParams, VenueKind};
use crate::router::store::RouterState;
use crate::venues::adapter::VenueClient;
use crate::venues::plan::ExecutionPlan;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One hop of a strategy with its planned amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopPlan {
    pub index: usize,
    pub hop: ResolvedHop,
    /// Input the hop was estimated with (realized input may differ).
    pub estimated_input: U256,
    pub expected_output: U256,
    pub minimum_output: U256,
    pub slippage_bps: u32,
    /// Configured slippage the hop falls back to when no live quote holds.
    pub fallback_slippage_bps: u32,
    pub quote_source: QuoteSource,
}

/// Ordered hop plans plus the first hop's executable plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStrategy {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: U256,
    pub expected_output: U256,
    pub minimum_output: U256,
    pub hops: Vec<HopPlan>,
    pub first: ExecutionPlan,
}

impl SwapStrategy {
    pub fn hop(&self, index: usize) -> Result<&HopPlan, RouterError> {
        self.hops.get(index).ok_or_else(|| {
            RouterError::InvalidRoute(format!(
                "hop {index} out of range for a {}-hop strategy",
                self.hops.len()
            ))
        })
    }

    pub fn remaining_after(&self, index: usize) -> usize {
        self.hops.len().saturating_sub(index + 1)
    }
}

/// Quote and bounds for one hop before propagation.
#[derive(Debug, Clone)]
pub struct HopEstimate {
    pub input: U256,
    pub quote: Quote,
    pub naive_minimum: U256,
    /// Slippage actually applied to this estimate (live buffer or fallback).
    pub slippage_bps: u32,
    pub fallback_slippage_bps: u32,
}

/// Flatten a resolution into single-venue hops, expanding chain templates.
pub fn expand_hops(
    resolution: &Resolution,
    state: &RouterState,
    assets: &AssetRegistry,
) -> Result<Vec<ResolvedHop>, RouterError> {
    match resolution {
        Resolution::Bridge { first, second, .. } => Ok(vec![first.clone(), second.clone()]),
        Resolution::Single(hop) => match &hop.route.params {
            RouteParams::MultiStepChain { via } => {
                let mut waypoints = Vec::with_capacity(via.len() + 2);
                waypoints.push(hop.asset_in);
                waypoints.extend(via.iter().copied());
                waypoints.push(hop.asset_out);
                waypoints
                    .windows(2)
                    .map(|w| {
                        let leg = resolve_single(state, assets, w[0], w[1]).ok_or(
                            RouterError::NoRouteFound {
                                asset_in: w[0],
                                asset_out: w[1],
                            },
                        )?;
                        if leg.venue_kind() == VenueKind::MultiStepChain {
                            return Err(RouterError::InvalidRoute(format!(
                                "nested multi-step chain at {} -> {}",
                                w[0], w[1]
                            )));
                        }
                        Ok(leg)
                    })
                    .collect()
            }
            _ => Ok(vec![hop.clone()]),
        },
    }
}

/// Raise intermediate minimums so each later hop can still reach its own.
///
/// Working backward, the input hop `k + 1` needs is its minimum converted
/// through its estimated rate and grossed up by its fallback slippage, since
/// a live quote seen now may be gone when that hop executes. Hop `k`'s
/// minimum is the larger of that and its own naive bound.
pub fn propagate_minimums(estimates: &[HopEstimate], floor: U256) -> Vec<U256> {
    let n = estimates.len();
    let mut mins: Vec<U256> = estimates.iter().map(|e| e.naive_minimum).collect();
    if n == 0 {
        return mins;
    }
    mins[n - 1] = mins[n - 1].max(floor);

    for k in (0..n.saturating_sub(1)).rev() {
        let next = &estimates[k + 1];
        let needed_in = if next.quote.amount.is_zero() || next.input.is_zero() {
            mins[k + 1]
        } else {
            ceil_mul_div(mins[k + 1], next.input, next.quote.amount)
        };
        let required = gross_up(needed_in, next.fallback_slippage_bps);
        if required > mins[k] {
            debug!(hop = k, naive = %mins[k], %required, "raised intermediate minimum");
            mins[k] = required;
        }
    }
    mins
}

fn ceil_mul_div(a: U256, b: U256, d: U256) -> U256 {
    let product = a.saturating_mul(b);
    let q = product / d;
    if q * d < product {
        q + U256::from(1u8)
    } else {
        q
    }
}

/// Quote hops sequentially, each hop's estimate feeding the next.
///
/// `requests` carry per-hop metadata; their amounts are overwritten here.
pub async fn estimate_hops<C: VenueClient>(
    quotes: &QuoteService<C>,
    mut requests: Vec<QuoteRequest>,
    slippages: &[u32],
    amount_in: U256,
    now: u64,
    live: bool,
    settings: &RouterSettings,
) -> Vec<HopEstimate> {
    let mut estimates = Vec::with_capacity(requests.len());
    let mut input = amount_in;
    for (req, slippage) in requests.iter_mut().zip(slippages) {
        req.amount_in = input;
        let quote = if live {
            quotes.quote(req, now).await
        } else {
            quotes.offline(req, now)
        };
        let fresh = quote.is_fresh(now, settings.quote_max_age_secs);
        let naive_minimum = minimum_output(
            &quote,
            fresh,
            settings.live_buffer_bps,
            *slippage,
            U256::ZERO,
        );
        let slippage_bps =
            effective_slippage_bps(&quote, fresh, settings.live_buffer_bps, *slippage);
        input = quote.amount;
        estimates.push(HopEstimate {
            input: req.amount_in,
            quote,
            naive_minimum,
            slippage_bps,
            fallback_slippage_bps: *slippage,
        });
    }
    estimates
}

/// Combine hops, estimates and propagated minimums into hop plans.
pub fn hop_plans(hops: Vec<ResolvedHop>, estimates: &[HopEstimate], mins: &[U256]) -> Vec<HopPlan> {
    hops.into_iter()
        .zip(estimates.iter().zip(mins))
        .enumerate()
        .map(|(index, (hop, (est, min)))| HopPlan {
            index,
            hop,
            estimated_input: est.input,
            expected_output: est.quote.amount,
            minimum_output: *min,
            slippage_bps: est.slippage_bps,
            fallback_slippage_bps: est.fallback_slippage_bps,
            quote_source: est.quote.source,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::apply_bps_discount;

    fn estimate(input: u128, output: u128, slippage_bps: u32) -> HopEstimate {
        let quote = Quote {
            amount: U256::from(output),
            valid: false,
            source: QuoteSource::Fallback,
            timestamp: 0,
        };
        HopEstimate {
            input: U256::from(input),
            naive_minimum: apply_bps_discount(quote.amount, slippage_bps),
            quote,
            slippage_bps,
            fallback_slippage_bps: slippage_bps,
        }
    }

    #[test]
    fn intermediate_minimum_keeps_next_hop_reachable() {
        let e = 1_000_000_000_000_000_000u128;
        let estimates = vec![
            estimate(e, 980_000_000_000_000_000, 50),
            estimate(980_000_000_000_000_000, 960_400_000_000_000_000, 50),
        ];
        let mins = propagate_minimums(&estimates, U256::ZERO);
        assert_eq!(mins[1], estimates[1].naive_minimum);
        assert!(mins[0] >= estimates[0].naive_minimum);
        // intermediate bound through the second hop's 0.98 rate, less its slippage
        let reachable =
            apply_bps_discount(mins[0], 50) * U256::from(9_604u32) / U256::from(9_800u32);
        assert!(reachable >= mins[1]);
        assert_eq!(mins[0], U256::from(980_000_000_000_000_000u128));
    }

    #[test]
    fn one_to_one_chain_satisfies_reachability() {
        let estimates = vec![estimate(1_000, 1_000, 100), estimate(1_000, 1_000, 300)];
        let floor = U256::from(990u64);
        let mins = propagate_minimums(&estimates, floor);
        assert_eq!(mins[1], floor);
        assert!(apply_bps_discount(mins[0], 300) >= mins[1]);
        assert!(apply_bps_discount(mins[0] - U256::from(1u8), 300) < mins[1]);
    }

    #[test]
    fn live_next_hop_is_grossed_up_by_its_fallback_slippage() {
        let e = 1_000_000_000_000_000_000u128;
        let mut second = estimate(e, e, 30);
        second.fallback_slippage_bps = 50;
        let estimates = vec![estimate(e, e, 30), second];
        let mins = propagate_minimums(&estimates, U256::ZERO);
        assert_eq!(mins[1], U256::from(997_000_000_000_000_000u128));
        assert!(apply_bps_discount(mins[0], 50) >= mins[1]);
        assert!(apply_bps_discount(mins[0] - U256::from(1u8), 50) < mins[1]);
    }

    #[test]
    fn single_hop_only_applies_floor() {
        let estimates = vec![estimate(10, 10, 50)];
        assert_eq!(
            propagate_minimums(&estimates, U256::from(11u8)),
            vec![U256::from(11u8)]
        );
        assert!(propagate_minimums(&[], U256::from(1u8)).is_empty());
    }
}
