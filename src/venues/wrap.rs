// Native wrap and unwrap steps on the wrapped-native contract
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::router::routes::WrapStep;
use crate::venues::abi::WrappedNative;
use crate::venues::adapter::Invocation;
use alloy_primitives::U256;
use alloy_sol_types::SolCall;

pub fn encode_step(step: WrapStep, wrapped_native: AssetId, amount: U256) -> Invocation {
    match step {
        WrapStep::Wrap => Invocation {
            target: wrapped_native.address(),
            payload: WrappedNative::depositCall {}.abi_encode().into(),
            value: amount,
        },
        WrapStep::Unwrap => Invocation {
            target: wrapped_native.address(),
            payload: WrappedNative::withdrawCall { wad: amount }.abi_encode().into(),
            value: U256::ZERO,
        },
    }
}
