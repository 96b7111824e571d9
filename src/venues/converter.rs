// Direct converter venue
// Mint-style conversions: payable native staking submit and ERC-4626 deposit.
// Output is treated as 1:1 after decimal normalization.
//
// Numan Thabit 2025 Nov

use crate::errors::RouterError;
use crate::quant::normalize_decimals;
use crate::router::routes::ConverterCall;
use crate::venues::abi::{Erc4626Vault, NativeStaking};
use crate::venues::adapter::{Invocation, SwapLeg};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

pub fn encode_swap(
    converter: Address,
    call: &ConverterCall,
    leg: &SwapLeg,
) -> Result<Invocation, RouterError> {
    match call {
        ConverterCall::NativeStake { referral } => {
            if !leg.asset_in.is_native() {
                return Err(RouterError::InvalidRoute(
                    "native-stake converter requires native input".into(),
                ));
            }
            Ok(Invocation {
                target: converter,
                payload: NativeStaking::submitCall {
                    referral: *referral,
                }
                .abi_encode()
                .into(),
                value: leg.amount_in,
            })
        }
        ConverterCall::Erc4626Deposit => Ok(Invocation {
            target: converter,
            payload: Erc4626Vault::depositCall {
                assets: leg.amount_in,
                receiver: leg.recipient,
            }
            .abi_encode()
            .into(),
            value: leg.native_value(),
        }),
    }
}

/// Fixed 1:1 conversion rescaled to the output precision.
pub fn fixed_quote(amount_in: U256, decimals_in: u8, decimals_out: u8) -> U256 {
    normalize_decimals(amount_in, decimals_in, decimals_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetId;

    fn leg(asset_in: AssetId) -> SwapLeg {
        SwapLeg {
            asset_in,
            asset_out: AssetId(Address::repeat_byte(2)),
            amount_in: U256::from(7u8),
            minimum_output: U256::from(7u8),
            recipient: Address::repeat_byte(9),
            deadline: 0,
            wrapped_native: AssetId(Address::repeat_byte(0x10)),
        }
    }

    #[test]
    fn native_stake_is_payable() {
        let call = ConverterCall::NativeStake {
            referral: Address::ZERO,
        };
        let inv = encode_swap(Address::repeat_byte(4), &call, &leg(AssetId::NATIVE)).unwrap();
        assert_eq!(inv.value, U256::from(7u8));
        assert_eq!(&inv.payload[..4], NativeStaking::submitCall::SELECTOR.as_slice());
        assert!(encode_swap(
            Address::repeat_byte(4),
            &call,
            &leg(AssetId(Address::repeat_byte(1)))
        )
        .is_err());
    }

    #[test]
    fn vault_deposit_targets_recipient() {
        let inv = encode_swap(
            Address::repeat_byte(4),
            &ConverterCall::Erc4626Deposit,
            &leg(AssetId(Address::repeat_byte(1))),
        )
        .unwrap();
        let decoded = Erc4626Vault::depositCall::abi_decode(&inv.payload, true).unwrap();
        assert_eq!(decoded.receiver, Address::repeat_byte(9));
        assert_eq!(inv.value, U256::ZERO);
    }

    #[test]
    fn fixed_quote_normalizes_decimals() {
        assert_eq!(
            fixed_quote(U256::from(1_000_000u64), 6, 18),
            U256::from(1_000_000_000_000_000_000u128)
        );
    }
}
