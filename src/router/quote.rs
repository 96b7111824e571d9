// Quote service
// This file obtains output estimates for a resolved hop: live venue reads
// tried candidate by candidate, fixed-rate conversions, and the static
// fallback estimate, plus the minimum-output computation built on them
//
// Numan Thabit 2025 Nov

use crate::assets::{AssetId, AssetRegistry};
use crate::errors::RouterError;
use crate::events::{EventBus, RouterEvent};
use crate::metrics::QUOTES;
use crate::quant::{apply_bps_discount, normalize_decimals, scale_bps};
use crate::router::resolver::ResolvedHop;
use crate::router::routes::{PairKey, RouteParams, VenueKind};
use crate::router::store::RouterState;
use crate::venues::adapter::{has_fixed_rate, quote_candidates, QuoteCandidate, SwapLeg, VenueClient};
use crate::venues::converter::fixed_quote;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Haircut applied to the static fallback estimate.
pub const DEFAULT_FALLBACK_HAIRCUT_BPS: u32 = 200;
/// Buffer applied below a fresh live quote.
pub const DEFAULT_LIVE_BUFFER_BPS: u32 = 30;
/// Oldest quote accepted for executable plans.
pub const DEFAULT_QUOTE_MAX_AGE_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Live,
    Fallback,
    Fixed,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSource::Live => "live",
            QuoteSource::Fallback => "fallback",
            QuoteSource::Fixed => "fixed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount: U256,
    /// True when the amount came from the venue or a fixed conversion.
    pub valid: bool,
    pub source: QuoteSource,
    pub timestamp: u64,
}

impl Quote {
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    pub fn is_fresh(&self, now: u64, max_age_secs: u64) -> bool {
        self.valid && self.age(now) <= max_age_secs
    }

    /// Rejects a valid quote that has aged out.
    pub fn ensure_not_stale(&self, now: u64, max_age_secs: u64) -> Result<(), RouterError> {
        if self.valid && self.age(now) > max_age_secs {
            return Err(RouterError::StaleQuote {
                age_secs: self.age(now),
                max_age_secs,
            });
        }
        Ok(())
    }
}

/// Everything needed to quote one hop, captured so no state lock is held
/// across venue reads.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub params: RouteParams,
    pub supports_live_quote: bool,
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub venue_asset_in: AssetId,
    pub venue_asset_out: AssetId,
    pub amount_in: U256,
    pub decimals_in: u8,
    pub decimals_out: u8,
    pub fallback_rate_bps: u32,
    pub wrapped_native: AssetId,
}

impl QuoteRequest {
    pub fn for_hop(
        hop: &ResolvedHop,
        amount_in: U256,
        state: &RouterState,
        assets: &AssetRegistry,
    ) -> Self {
        Self {
            params: hop.route.params.clone(),
            supports_live_quote: hop.route.supports_live_quote,
            asset_in: hop.asset_in,
            asset_out: hop.asset_out,
            venue_asset_in: hop.venue_asset_in,
            venue_asset_out: hop.venue_asset_out,
            amount_in,
            decimals_in: assets.decimals(hop.asset_in),
            decimals_out: assets.decimals(hop.asset_out),
            fallback_rate_bps: state.fallback_rate_bps(PairKey::new(hop.asset_in, hop.asset_out)),
            wrapped_native: assets.wrapped_native(),
        }
    }

    pub fn kind(&self) -> VenueKind {
        self.params.kind()
    }

    fn leg(&self) -> SwapLeg {
        SwapLeg {
            asset_in: self.venue_asset_in,
            asset_out: self.venue_asset_out,
            amount_in: self.amount_in,
            minimum_output: U256::ZERO,
            recipient: Address::ZERO,
            deadline: 0,
            wrapped_native: self.wrapped_native,
        }
    }
}

/// `amount × rate × (1 − haircut)`, rescaled to the output precision.
pub fn fallback_estimate(
    amount_in: U256,
    rate_bps: u32,
    decimals_in: u8,
    decimals_out: u8,
    haircut_bps: u32,
) -> U256 {
    let converted = normalize_decimals(scale_bps(amount_in, rate_bps), decimals_in, decimals_out);
    apply_bps_discount(converted, haircut_bps)
}

/// Minimum acceptable output for a quote.
///
/// A fresh valid quote keeps `live_buffer_bps` of headroom; anything else is
/// treated as a fallback estimate and discounted by `slippage_bps`. The caller
/// floor always wins when higher.
pub fn minimum_output(
    quote: &Quote,
    fresh: bool,
    live_buffer_bps: u32,
    slippage_bps: u32,
    caller_floor: U256,
) -> U256 {
    let computed = if quote.valid && fresh {
        apply_bps_discount(quote.amount, live_buffer_bps)
    } else {
        apply_bps_discount(quote.amount, slippage_bps)
    };
    computed.max(caller_floor)
}

/// Basis points actually deducted by [`minimum_output`] for a quote.
pub fn effective_slippage_bps(
    quote: &Quote,
    fresh: bool,
    live_buffer_bps: u32,
    slippage_bps: u32,
) -> u32 {
    if quote.valid && fresh {
        live_buffer_bps
    } else {
        slippage_bps
    }
}

pub struct QuoteService<C> {
    client: Arc<C>,
    events: EventBus,
    fallback_haircut_bps: u32,
}

impl<C: VenueClient> QuoteService<C> {
    pub fn new(client: Arc<C>, events: EventBus, fallback_haircut_bps: u32) -> Self {
        Self {
            client,
            events,
            fallback_haircut_bps,
        }
    }

    /// Quote without touching any venue: fixed conversions or the static
    /// fallback estimate.
    pub fn offline(&self, req: &QuoteRequest, now: u64) -> Quote {
        let quote = if has_fixed_rate(req.kind()) {
            self.fixed(req, now)
        } else {
            self.fallback(req, now)
        };
        QUOTES
            .with_label_values(&[quote.source.as_str(), req.kind().as_str()])
            .inc();
        quote
    }

    /// Quote a hop, preferring live venue reads.
    pub async fn quote(&self, req: &QuoteRequest, now: u64) -> Quote {
        if has_fixed_rate(req.kind()) || !req.supports_live_quote {
            return self.offline(req, now);
        }

        let candidates = quote_candidates(&req.params, &req.leg());
        let mut last_error = String::from("no live quote candidates");
        for candidate in &candidates {
            match self.try_candidate(candidate).await {
                Ok(amount) if !amount.is_zero() => {
                    debug!(label = %candidate.label, %amount, "live quote");
                    QUOTES
                        .with_label_values(&[QuoteSource::Live.as_str(), req.kind().as_str()])
                        .inc();
                    return Quote {
                        amount,
                        valid: true,
                        source: QuoteSource::Live,
                        timestamp: now,
                    };
                }
                Ok(_) => {
                    debug!(label = %candidate.label, "live quote returned zero");
                    last_error = format!("{} returned zero", candidate.label);
                }
                Err(err) => {
                    warn!(label = %candidate.label, error = %err, "live quote failed");
                    last_error = err.to_string();
                }
            }
        }

        self.events.emit(RouterEvent::QuoteFallback {
            asset_in: req.asset_in,
            asset_out: req.asset_out,
            reason: last_error,
        });
        self.offline(req, now)
    }

    async fn try_candidate(&self, candidate: &QuoteCandidate) -> Result<U256, RouterError> {
        let raw = self
            .client
            .call(candidate.target, candidate.calldata.clone())
            .await?;
        (candidate.decode)(&raw).map_err(|e| RouterError::VenueCall {
            target: candidate.target,
            reason: format!("decode {}: {e}", candidate.label),
        })
    }

    fn fixed(&self, req: &QuoteRequest, now: u64) -> Quote {
        Quote {
            amount: fixed_quote(req.amount_in, req.decimals_in, req.decimals_out),
            valid: true,
            source: QuoteSource::Fixed,
            timestamp: now,
        }
    }

    fn fallback(&self, req: &QuoteRequest, now: u64) -> Quote {
        Quote {
            amount: fallback_estimate(
                req.amount_in,
                req.fallback_rate_bps,
                req.decimals_in,
                req.decimals_out,
                self.fallback_haircut_bps,
            ),
            valid: false,
            source: QuoteSource::Fallback,
            timestamp: now,
        }
    }
}
