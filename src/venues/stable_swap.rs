// Stable-swap AMM venue
// Curve-style exchange by coin index, with get_dy quoting
//
// Numan Thabit 2025 Nov

use crate::venues::abi::StableSwapPool;
use crate::venues::adapter::{Invocation, QuoteCandidate, SwapLeg};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

pub fn encode_swap(pool: Address, i: i8, j: i8, underlying: bool, leg: &SwapLeg) -> Invocation {
    let (i, j) = (i128::from(i), i128::from(j));
    let payload = if underlying {
        StableSwapPool::exchange_underlyingCall {
            i,
            j,
            dx: leg.amount_in,
            min_dy: leg.minimum_output,
        }
        .abi_encode()
    } else {
        StableSwapPool::exchangeCall {
            i,
            j,
            dx: leg.amount_in,
            min_dy: leg.minimum_output,
        }
        .abi_encode()
    };
    Invocation {
        target: pool,
        payload: payload.into(),
        value: leg.native_value(),
    }
}

fn decode_dy(data: &[u8]) -> Result<U256, alloy_sol_types::Error> {
    StableSwapPool::get_dyCall::abi_decode_returns(data, true).map(|r| r.dy)
}

fn decode_dy_underlying(data: &[u8]) -> Result<U256, alloy_sol_types::Error> {
    StableSwapPool::get_dy_underlyingCall::abi_decode_returns(data, true).map(|r| r.dy)
}

pub fn quote_candidates(
    pool: Address,
    i: i8,
    j: i8,
    underlying: bool,
    leg: &SwapLeg,
) -> Vec<QuoteCandidate> {
    let (i, j) = (i128::from(i), i128::from(j));
    let mut out = vec![QuoteCandidate {
        label: "get_dy".into(),
        target: pool,
        calldata: StableSwapPool::get_dyCall {
            i,
            j,
            dx: leg.amount_in,
        }
        .abi_encode()
        .into(),
        decode: decode_dy,
    }];
    if underlying {
        out.push(QuoteCandidate {
            label: "get_dy_underlying".into(),
            target: pool,
            calldata: StableSwapPool::get_dy_underlyingCall {
                i,
                j,
                dx: leg.amount_in,
            }
            .abi_encode()
            .into(),
            decode: decode_dy_underlying,
        });
    }
    out
}
