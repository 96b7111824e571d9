// Quantity math for slippage and decimal normalization
// This file handles basis-point discounts, minimum-output bounds and
// precision conversion between assets with different decimals
//
// Numan Thabit 2025 Nov

use crate::errors::RouterError;
use alloy_primitives::U256;

pub const BPS_DENOMINATOR: u32 = 10_000;
/// Upper bound accepted for any configured slippage value.
pub const MAX_SLIPPAGE_BPS: u32 = 5_000;

pub fn ensure_slippage(bps: u32) -> Result<u32, RouterError> {
    if bps > MAX_SLIPPAGE_BPS {
        return Err(RouterError::InvalidSlippage(bps));
    }
    Ok(bps)
}

/// `amount * (1 - bps / 10_000)`, rounded down.
pub fn apply_bps_discount(amount: U256, bps: u32) -> U256 {
    let keep = BPS_DENOMINATOR.saturating_sub(bps);
    amount.saturating_mul(U256::from(keep)) / U256::from(BPS_DENOMINATOR)
}

/// `amount * rate_bps / 10_000`, rounded down.
pub fn scale_bps(amount: U256, rate_bps: u32) -> U256 {
    amount.saturating_mul(U256::from(rate_bps)) / U256::from(BPS_DENOMINATOR)
}

/// Smallest `x` such that `apply_bps_discount(x, bps) >= required`.
pub fn gross_up(required: U256, bps: u32) -> U256 {
    if required.is_zero() {
        return U256::ZERO;
    }
    // nothing survives a full discount
    if bps >= BPS_DENOMINATOR {
        return U256::MAX;
    }
    let keep = U256::from(BPS_DENOMINATOR.saturating_sub(bps).max(1));
    let mut x = required
        .saturating_mul(U256::from(BPS_DENOMINATOR))
        .saturating_add(keep - U256::from(1u8))
        / keep;
    // integer division in the discount can still land one unit short
    while apply_bps_discount(x, bps) < required && x < U256::MAX {
        x += U256::from(1u8);
    }
    x
}

/// Convert an amount between decimal precisions, rounding down.
pub fn normalize_decimals(amount: U256, from_decimals: u8, to_decimals: u8) -> U256 {
    use std::cmp::Ordering;
    match to_decimals.cmp(&from_decimals) {
        Ordering::Equal => amount,
        Ordering::Greater => {
            let factor = U256::from(10u8).pow(U256::from(to_decimals - from_decimals));
            amount.saturating_mul(factor)
        }
        Ordering::Less => {
            let factor = U256::from(10u8).pow(U256::from(from_decimals - to_decimals));
            amount / factor
        }
    }
}
