// Plan generator
// This file turns a resolved hop plus its computed amounts into an
// ExecutionPlan: venue gating, payload encoding, approvals, wrap steps and
// selector filtering
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::errors::RouterError;
use crate::metrics::PLANS;
use crate::router::quote::QuoteSource;
use crate::router::resolver::ResolvedHop;
use crate::router::routes::{VenueKind, WrapStep};
use crate::router::store::RouterState;
use crate::venues::adapter::{encode_swap, SwapLeg};
use crate::venues::wrap::encode_step;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token allowance the caller grants before the venue call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub asset: AssetId,
    pub spender: Address,
    pub amount: U256,
    /// Allowance must be set back to zero after the call.
    pub reset_after: bool,
}

/// Wrap or unwrap call executed around the main venue call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCall {
    pub step: WrapStep,
    pub target: Address,
    pub payload: Bytes,
    pub value: U256,
}

/// Venue-specific invocation descriptor handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub venue_kind: VenueKind,
    pub target: Address,
    pub payload: Bytes,
    pub value: U256,
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: U256,
    pub approval: Option<Approval>,
    pub minimum_output: U256,
    pub expected_output: U256,
    pub quote_source: QuoteSource,
    pub deadline: u64,
    pub pre_step: Option<StepCall>,
    pub post_step: Option<StepCall>,
    /// Hops still to run after this one when part of a strategy.
    pub remaining_hops: usize,
    pub direct_transfer: bool,
}

/// Amounts and metadata computed upstream for one hop.
#[derive(Debug, Clone)]
pub struct PlanInput<'a> {
    pub hop: &'a ResolvedHop,
    pub amount_in: U256,
    pub minimum_output: U256,
    pub expected_output: U256,
    pub quote_source: QuoteSource,
    pub recipient: Address,
    pub deadline: u64,
    pub remaining_hops: usize,
}

pub fn generate(
    state: &RouterState,
    wrapped_native: AssetId,
    input: PlanInput<'_>,
) -> Result<ExecutionPlan, RouterError> {
    let hop = input.hop;
    let kind = hop.venue_kind();
    state.switches().ensure_kind_active(kind)?;
    let target = hop.route.params.target().ok_or_else(|| {
        RouterError::InvalidRoute("multi-step chains are planned hop by hop".into())
    })?;
    state.venues().ensure_usable(target)?;

    let leg = SwapLeg {
        asset_in: hop.venue_asset_in,
        asset_out: hop.venue_asset_out,
        amount_in: input.amount_in,
        minimum_output: input.minimum_output,
        recipient: input.recipient,
        deadline: input.deadline,
        wrapped_native,
    };
    let invocation = encode_swap(&hop.route.params, &leg)?;
    state.selectors().check_payload(&invocation.payload)?;

    let step_call = |step: WrapStep, amount: U256| -> Result<StepCall, RouterError> {
        let inv = encode_step(step, wrapped_native, amount);
        state.selectors().check_payload(&inv.payload)?;
        Ok(StepCall {
            step,
            target: inv.target,
            payload: inv.payload,
            value: inv.value,
        })
    };
    let pre_step = hop
        .pre_step
        .map(|step| step_call(step, input.amount_in))
        .transpose()?;
    // the realized output is unknown here; the guaranteed minimum is unwrapped
    let post_step = hop
        .post_step
        .map(|step| step_call(step, input.minimum_output))
        .transpose()?;

    let approval = (!hop.venue_asset_in.is_native()).then(|| Approval {
        asset: hop.venue_asset_in,
        spender: target,
        amount: input.amount_in,
        reset_after: true,
    });

    PLANS.with_label_values(&[kind.as_str()]).inc();
    debug!(
        kind = kind.as_str(),
        %target,
        asset_in = %hop.asset_in,
        asset_out = %hop.asset_out,
        minimum_output = %input.minimum_output,
        "execution plan generated"
    );

    Ok(ExecutionPlan {
        venue_kind: kind,
        target,
        payload: invocation.payload,
        value: invocation.value,
        asset_in: hop.asset_in,
        asset_out: hop.asset_out,
        amount_in: input.amount_in,
        approval,
        minimum_output: input.minimum_output,
        expected_output: input.expected_output,
        quote_source: input.quote_source,
        deadline: input.deadline,
        pre_step,
        post_step,
        remaining_hops: input.remaining_hops,
        direct_transfer: state.switches().direct_transfer(),
    })
}
