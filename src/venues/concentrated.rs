// Concentrated-liquidity AMM venue
// exactInputSingle swaps and quoter reads across fee tiers
//
// Numan Thabit 2025 Nov

use crate::venues::abi::{UniV3Quoter, UniV3Router};
use crate::venues::adapter::{Invocation, QuoteCandidate, SwapLeg};
use alloy_primitives::aliases::{U160, U24};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

/// Common pool fee tiers tried after the configured one.
pub const FEE_TIERS: [u32; 4] = [500, 3_000, 10_000, 100];

/// Configured tier first, then the common tiers, without duplicates.
pub fn fee_candidates(configured: u32) -> Vec<u32> {
    let mut fees = vec![configured];
    for fee in FEE_TIERS {
        if !fees.contains(&fee) {
            fees.push(fee);
        }
    }
    fees
}

pub fn encode_swap(router: Address, fee: u32, leg: &SwapLeg) -> Invocation {
    let params = UniV3Router::ExactInputSingleParams {
        tokenIn: leg.token(leg.asset_in),
        tokenOut: leg.token(leg.asset_out),
        fee: U24::saturating_from(fee),
        recipient: leg.recipient,
        deadline: U256::from(leg.deadline),
        amountIn: leg.amount_in,
        amountOutMinimum: leg.minimum_output,
        sqrtPriceLimitX96: U160::ZERO,
    };
    Invocation {
        target: router,
        payload: UniV3Router::exactInputSingleCall { params }.abi_encode().into(),
        value: leg.native_value(),
    }
}

fn decode_single(data: &[u8]) -> Result<U256, alloy_sol_types::Error> {
    UniV3Quoter::quoteExactInputSingleCall::abi_decode_returns(data, true).map(|r| r.amountOut)
}

pub fn quote_candidates(quoter: Address, fee: u32, leg: &SwapLeg) -> Vec<QuoteCandidate> {
    fee_candidates(fee)
        .into_iter()
        .map(|fee| {
            let call = UniV3Quoter::quoteExactInputSingleCall {
                tokenIn: leg.token(leg.asset_in),
                tokenOut: leg.token(leg.asset_out),
                fee: U24::saturating_from(fee),
                amountIn: leg.amount_in,
                sqrtPriceLimitX96: U160::ZERO,
            };
            QuoteCandidate {
                label: format!("quoteExactInputSingle(fee={fee})"),
                target: quoter,
                calldata: call.abi_encode().into(),
                decode: decode_single,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetId;
    use alloy_sol_types::SolValue;

    fn leg(asset_in: AssetId) -> SwapLeg {
        SwapLeg {
            asset_in,
            asset_out: AssetId(Address::repeat_byte(2)),
            amount_in: U256::from(1_000u64),
            minimum_output: U256::from(990u64),
            recipient: Address::repeat_byte(9),
            deadline: 1_800,
            wrapped_native: AssetId(Address::repeat_byte(0x10)),
        }
    }

    #[test]
    fn configured_tier_goes_first_without_duplicates() {
        assert_eq!(fee_candidates(3_000), vec![3_000, 500, 10_000, 100]);
        assert_eq!(fee_candidates(2_500), vec![2_500, 500, 3_000, 10_000, 100]);
    }

    #[test]
    fn native_input_swaps_wrapped_token_with_value() {
        let inv = encode_swap(Address::repeat_byte(7), 500, &leg(AssetId::NATIVE));
        assert_eq!(inv.value, U256::from(1_000u64));
        assert_eq!(&inv.payload[..4], UniV3Router::exactInputSingleCall::SELECTOR.as_slice());
        let decoded = UniV3Router::exactInputSingleCall::abi_decode(&inv.payload, true).unwrap();
        assert_eq!(decoded.params.tokenIn, Address::repeat_byte(0x10));
        assert_eq!(decoded.params.amountOutMinimum, U256::from(990u64));
    }

    #[test]
    fn quote_decoder_reads_amount_out() {
        let ret = U256::from(42u8).abi_encode();
        assert_eq!(decode_single(&ret).unwrap(), U256::from(42u8));
    }
}
