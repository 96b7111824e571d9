// Multi-hop path venue
// exactInput swaps over a packed token/fee path and quoteExactInput reads
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::errors::RouterError;
use crate::venues::abi::{UniV3Quoter, UniV3Router};
use crate::venues::adapter::{Invocation, QuoteCandidate, SwapLeg};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

/// Pack a path as `token(20) ‖ fee(3) ‖ token(20) …`.
pub fn encode_path(tokens: &[Address], fees: &[u32]) -> Result<Bytes, RouterError> {
    if tokens.len() < 2 || fees.len() != tokens.len() - 1 {
        return Err(RouterError::InvalidPath(format!(
            "{} tokens with {} fees",
            tokens.len(),
            fees.len()
        )));
    }
    let mut out = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    for (idx, token) in tokens.iter().enumerate() {
        out.extend_from_slice(token.as_slice());
        if let Some(fee) = fees.get(idx) {
            out.extend_from_slice(&fee.to_be_bytes()[1..]);
        }
    }
    Ok(out.into())
}

fn packed(path: &[AssetId], fees: &[u32], leg: &SwapLeg) -> Result<Bytes, RouterError> {
    let tokens: Vec<Address> = path.iter().map(|a| leg.token(*a)).collect();
    encode_path(&tokens, fees)
}

pub fn encode_swap(
    router: Address,
    path: &[AssetId],
    fees: &[u32],
    leg: &SwapLeg,
) -> Result<Invocation, RouterError> {
    let params = UniV3Router::ExactInputParams {
        path: packed(path, fees, leg)?,
        recipient: leg.recipient,
        deadline: U256::from(leg.deadline),
        amountIn: leg.amount_in,
        amountOutMinimum: leg.minimum_output,
    };
    Ok(Invocation {
        target: router,
        payload: UniV3Router::exactInputCall { params }.abi_encode().into(),
        value: leg.native_value(),
    })
}

fn decode_path_quote(data: &[u8]) -> Result<U256, alloy_sol_types::Error> {
    UniV3Quoter::quoteExactInputCall::abi_decode_returns(data, true).map(|r| r.amountOut)
}

pub fn quote_candidates(
    quoter: Address,
    path: &[AssetId],
    fees: &[u32],
    leg: &SwapLeg,
) -> Vec<QuoteCandidate> {
    match packed(path, fees, leg) {
        Ok(path) => vec![QuoteCandidate {
            label: "quoteExactInput".into(),
            target: quoter,
            calldata: UniV3Quoter::quoteExactInputCall {
                path,
                amountIn: leg.amount_in,
            }
            .abi_encode()
            .into(),
            decode: decode_path_quote,
        }],
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_packs_tokens_and_three_byte_fees() {
        let a = Address::repeat_byte(0xa1);
        let b = Address::repeat_byte(0xb2);
        let c = Address::repeat_byte(0xc3);
        let packed = encode_path(&[a, b, c], &[500, 3_000]).unwrap();
        assert_eq!(packed.len(), 20 * 3 + 3 * 2);
        assert_eq!(&packed[..20], a.as_slice());
        assert_eq!(&packed[20..23], &[0x00, 0x01, 0xf4]);
        assert_eq!(&packed[23..43], b.as_slice());
        assert_eq!(&packed[43..46], &[0x00, 0x0b, 0xb8]);
        assert_eq!(&packed[46..], c.as_slice());
    }

    #[test]
    fn mismatched_fee_count_rejected() {
        let a = Address::repeat_byte(1);
        assert!(matches!(
            encode_path(&[a, a], &[]),
            Err(RouterError::InvalidPath(_))
        ));
    }
}
