// Quote and plan generation integration tests
//
// Numan Thabit 2025 Nov

mod common;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use common::*;
use ultra_router::assets::AssetId;
use ultra_router::errors::RouterError;
use ultra_router::events::RouterEvent;
use ultra_router::quant::apply_bps_discount;
use ultra_router::router::{ConverterCall, Quote, QuoteSource, RouterState, VenueKind, WrapStep};
use ultra_router::venues::abi::{NativeStaking, StableSwapPool, UniV3Router, WrappedNative};

#[tokio::test]
async fn fallback_plan_matches_reference_scenario() {
    let h = harness().await;
    h.steth_route().await;
    let mut rx = h.router.events().subscribe();

    let plan = h
        .router
        .get_quoted_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();

    assert_eq!(plan.quote_source, QuoteSource::Fallback);
    assert_eq!(plan.expected_output, U256::from(980_000_000_000_000_000u128));
    assert_eq!(plan.minimum_output, U256::from(975_100_000_000_000_000u128));
    assert_eq!(plan.venue_kind, VenueKind::StableSwapAmm);
    assert_eq!(plan.target, STETH_POOL);
    assert_eq!(&plan.payload[..4], StableSwapPool::exchangeCall::SELECTOR.as_slice());
    assert_eq!(plan.remaining_hops, 0);
    assert_eq!(plan.deadline, START + 1_800);
    let approval = plan.approval.expect("token input needs an approval");
    assert_eq!(approval.spender, STETH_POOL);
    assert!(approval.reset_after);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, RouterEvent::QuoteFallback { asset_in, .. } if *asset_in == STETH)));
}

#[tokio::test]
async fn native_stake_pool_uses_category_default_slippage() {
    let h = harness().await;
    h.router
        .configure_route(
            &admin_auth(),
            AssetId::NATIVE,
            STETH,
            stable(STETH_POOL, 0, 1),
            true,
            None,
        )
        .await
        .unwrap();

    let plan = h
        .router
        .get_quoted_swap_execution_data(AssetId::NATIVE, STETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    assert_eq!(plan.quote_source, QuoteSource::Fallback);
    assert_eq!(plan.expected_output, U256::from(980_000_000_000_000_000u128));
    assert_eq!(plan.minimum_output, U256::from(975_100_000_000_000_000u128));
    assert_eq!(plan.value, e18(1));
    assert!(plan.approval.is_none());
    assert!(plan.pre_step.is_none());
    let call = StableSwapPool::exchangeCall::abi_decode(&plan.payload, true).unwrap();
    assert_eq!((call.i, call.j), (0, 1));
}

#[tokio::test]
async fn live_quote_keeps_only_the_buffer() {
    let h = harness().await;
    h.steth_route().await;
    h.venue.answer(Some(U256::from(990_000_000_000_000_000u128)));

    let plan = h
        .router
        .get_quoted_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    assert_eq!(plan.quote_source, QuoteSource::Live);
    assert_eq!(plan.expected_output, U256::from(990_000_000_000_000_000u128));
    assert_eq!(plan.minimum_output, U256::from(987_030_000_000_000_000u128));
}

#[tokio::test]
async fn caller_floor_wins_over_computed_minimum() {
    let h = harness().await;
    h.steth_route().await;
    let floor = U256::from(979_000_000_000_000_000u128);
    let plan = h
        .router
        .generate_swap_execution_data(STETH, WETH, e18(1), floor, RECIPIENT)
        .await
        .unwrap();
    assert_eq!(plan.minimum_output, floor);
    // offline planning never reads the venue
    assert_eq!(h.venue.calls(), 0);
}

#[tokio::test]
async fn reverse_lookup_uses_swapped_indices() {
    let h = harness().await;
    h.steth_route().await;
    let plan = h
        .router
        .generate_swap_execution_data(WETH, STETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    let call = StableSwapPool::exchangeCall::abi_decode(&plan.payload, true).unwrap();
    assert_eq!((call.i, call.j), (0, 1));
    assert_eq!(call.dx, e18(1));
}

#[tokio::test]
async fn native_input_resolves_through_wrapped_alias() {
    let h = harness().await;
    h.router
        .configure_route(&admin_auth(), WETH, STETH, stable(STETH_POOL, 0, 1), true, Some(50))
        .await
        .unwrap();
    let plan = h
        .router
        .generate_swap_execution_data(AssetId::NATIVE, STETH, e18(2), U256::ZERO, RECIPIENT)
        .await
        .unwrap();

    let pre = plan.pre_step.expect("native input is wrapped first");
    assert_eq!(pre.step, WrapStep::Wrap);
    assert_eq!(pre.target, WETH.address());
    assert_eq!(pre.value, e18(2));
    assert_eq!(&pre.payload[..4], WrappedNative::depositCall::SELECTOR.as_slice());
    assert_eq!(plan.approval.map(|a| a.asset), Some(WETH));
    assert!(plan.post_step.is_none());
}

#[tokio::test]
async fn native_output_unwraps_the_minimum() {
    let h = harness().await;
    h.steth_route().await;
    let plan = h
        .router
        .generate_swap_execution_data(STETH, AssetId::NATIVE, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    let post = plan.post_step.expect("wrapped output is unwrapped");
    assert_eq!(post.step, WrapStep::Unwrap);
    let call = WrappedNative::withdrawCall::abi_decode(&post.payload, true).unwrap();
    assert_eq!(call.wad, plan.minimum_output);
}

#[tokio::test]
async fn direct_mint_is_a_fixed_rate_native_call() {
    let h = harness().await;
    h.router
        .configure_direct_mint_route(
            &admin_auth(),
            AssetId::NATIVE,
            STETH,
            STAKER,
            ConverterCall::NativeStake {
                referral: Address::ZERO,
            },
        )
        .await
        .unwrap();
    let quoted = h
        .router
        .get_quote_and_execution_data(AssetId::NATIVE, STETH, e18(3), RECIPIENT)
        .await
        .unwrap();
    assert_eq!(quoted.quoted_amount, e18(3));
    assert_eq!(quoted.venue_kind, VenueKind::DirectConverter);
    assert_eq!(quoted.value, e18(3));
    assert_eq!(&quoted.payload[..4], NativeStaking::submitCall::SELECTOR.as_slice());
    assert_eq!(quoted.plan.quote_source, QuoteSource::Fixed);
    assert!(quoted.plan.approval.is_none());
    assert_eq!(h.venue.calls(), 0);
}

#[tokio::test]
async fn multi_hop_path_encodes_packed_route() {
    let h = harness().await;
    h.venue.answer(Some(U256::from(999_000u64)));
    h.router
        .configure_multi_hop_route(
            &admin_auth(),
            DAI,
            USDT,
            V3_ROUTER,
            V3_QUOTER,
            vec![DAI, USDC, USDT],
            vec![100, 100],
        )
        .await
        .unwrap();
    let plan = h
        .router
        .get_quoted_swap_execution_data(DAI, USDT, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    assert_eq!(plan.venue_kind, VenueKind::MultiHopPath);
    assert_eq!(plan.quote_source, QuoteSource::Live);
    let call = UniV3Router::exactInputCall::abi_decode(&plan.payload, true).unwrap();
    // 3 tokens and 2 fee tiers, packed
    assert_eq!(call.params.path.len(), 3 * 20 + 2 * 3);
    assert_eq!(call.params.amountOutMinimum, plan.minimum_output);
}

#[tokio::test]
async fn bridge_needs_both_legs() {
    let h = harness().await;
    h.steth_route().await;
    let err = h
        .router
        .get_complex_swap_strategy(STETH, RETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::NoRouteFound { .. }));
    assert!(!h.router.has_route(STETH, RETH).await);

    h.reth_route().await;
    assert!(h.router.has_route(STETH, RETH).await);
    let strategy = h
        .router
        .get_complex_swap_strategy(STETH, RETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    assert_eq!(strategy.hops.len(), 2);
    assert_eq!(strategy.first.remaining_hops, 1);
    assert_eq!(strategy.first.asset_out, WETH);
    assert_eq!(strategy.hops[1].estimated_input, strategy.hops[0].expected_output);
}

#[tokio::test]
async fn bridged_intermediate_minimum_covers_second_hop() {
    let h = harness().await;
    h.steth_route().await;
    h.reth_route().await;
    let strategy = h
        .router
        .get_complex_swap_strategy(STETH, RETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    let first = &strategy.hops[0];
    let second = &strategy.hops[1];
    assert_eq!(second.fallback_slippage_bps, 50);
    // worst-case second-hop output from the first hop's minimum
    let reachable =
        apply_bps_discount(first.minimum_output, second.fallback_slippage_bps)
            * second.expected_output
            / second.estimated_input;
    assert!(reachable >= second.minimum_output);
    assert_eq!(strategy.first.minimum_output, first.minimum_output);
}

#[tokio::test]
async fn live_bridge_keeps_second_hop_reachable_on_fallback() {
    let h = harness().await;
    h.steth_route().await;
    h.reth_route().await;
    h.venue.answer(Some(e18(1)));

    let strategy = h
        .router
        .get_complex_swap_strategy(STETH, RETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    let first = &strategy.hops[0];
    let second = &strategy.hops[1];
    assert_eq!(second.quote_source, QuoteSource::Live);
    assert_eq!(second.slippage_bps, 30);
    assert_eq!(second.fallback_slippage_bps, 50);
    assert_eq!(strategy.minimum_output, U256::from(997_000_000_000_000_000u128));
    // intermediateMin x (1 - fallback slippage) >= overall minimum
    assert!(
        apply_bps_discount(first.minimum_output, second.fallback_slippage_bps)
            >= strategy.minimum_output
    );
    assert!(
        apply_bps_discount(first.minimum_output - U256::from(1u8), second.fallback_slippage_bps)
            < strategy.minimum_output
    );
}

#[tokio::test]
async fn cross_category_pairs_have_no_route() {
    let h = harness().await;
    h.steth_route().await;
    let err = h
        .router
        .generate_swap_execution_data(STETH, USDC, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::CrossCategorySwap { .. }));
}

#[tokio::test]
async fn chained_route_plans_hop_by_hop() {
    let h = harness().await;
    h.steth_route().await;
    h.reth_route().await;
    h.router
        .configure_multi_step_route(&admin_auth(), STETH, RETH, vec![WETH])
        .await
        .unwrap();
    let strategy = h
        .router
        .get_complex_swap_strategy(STETH, RETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    assert_eq!(strategy.hops.len(), 2);

    let realized = strategy.hops[0].expected_output;
    let next = h
        .router
        .continue_strategy(&strategy, 1, realized, RECIPIENT)
        .await
        .unwrap();
    assert_eq!(next.asset_in, WETH);
    assert_eq!(next.asset_out, RETH);
    assert_eq!(next.remaining_hops, 0);
    assert!(next.minimum_output >= strategy.hops[1].minimum_output);

    let err = h
        .router
        .continue_strategy(&strategy, 5, realized, RECIPIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::InvalidRoute(_)));
}

#[tokio::test]
async fn continue_rejects_reconfigured_hop() {
    let h = harness().await;
    h.steth_route().await;
    h.reth_route().await;
    let strategy = h
        .router
        .get_complex_swap_strategy(STETH, RETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    h.router
        .configure_route(&admin_auth(), WETH, RETH, stable(RETH_POOL, 0, 2), true, Some(50))
        .await
        .unwrap();
    let err = h
        .router
        .continue_strategy(&strategy, 1, strategy.hops[0].expected_output, RECIPIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::InvalidRoute(_)));
}

#[tokio::test]
async fn stale_supplied_quote_is_rejected() {
    let h = harness().await;
    h.steth_route().await;
    let mut rx = h.router.events().subscribe();
    let quote = Quote {
        amount: e18(1),
        valid: true,
        source: QuoteSource::Live,
        timestamp: START - 61,
    };
    let err = h
        .router
        .generate_swap_execution_data_with_quote(STETH, WETH, e18(1), U256::ZERO, RECIPIENT, quote.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::StaleQuote { age_secs: 61, .. }));
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, RouterEvent::PlanRejected { .. })));

    let fresh = Quote {
        timestamp: START - 10,
        ..quote
    };
    let plan = h
        .router
        .generate_swap_execution_data_with_quote(STETH, WETH, e18(1), U256::ZERO, RECIPIENT, fresh)
        .await
        .unwrap();
    assert_eq!(plan.minimum_output, U256::from(997_000_000_000_000_000u128));
}

#[tokio::test]
async fn zero_amount_and_same_asset_rejected() {
    let h = harness().await;
    h.steth_route().await;
    assert!(matches!(
        h.router
            .generate_swap_execution_data(STETH, WETH, U256::ZERO, U256::ZERO, RECIPIENT)
            .await,
        Err(RouterError::ZeroAmount)
    ));
    assert!(matches!(
        h.router
            .generate_swap_execution_data(STETH, STETH, e18(1), U256::ZERO, RECIPIENT)
            .await,
        Err(RouterError::SameAsset(_))
    ));
}

#[tokio::test]
async fn blacklisted_selector_blocks_plans_even_when_allowed() {
    let h = harness().await;
    h.steth_route().await;
    let selector = ultra_router::security::OperationSelector::new(StableSwapPool::exchangeCall::SELECTOR);
    h.router
        .blacklist_selector(&admin_auth(), selector, true)
        .await
        .unwrap();
    h.router
        .whitelist_selector(&admin_auth(), selector, true)
        .await
        .unwrap();
    let err = h
        .router
        .generate_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::SelectorBlacklisted(_)));
}

#[tokio::test]
async fn pause_switches_gate_planning() {
    let h = harness().await;
    h.steth_route().await;
    let auth = admin_auth();

    h.router.set_pool_paused(&auth, STETH_POOL, true).await.unwrap();
    assert!(matches!(
        h.router
            .generate_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
            .await,
        Err(RouterError::VenuePaused(_))
    ));
    h.router.set_pool_paused(&auth, STETH_POOL, false).await.unwrap();

    h.router
        .set_protocol_paused(&auth, VenueKind::StableSwapAmm, true)
        .await
        .unwrap();
    assert!(h.router.get_protocol_status(VenueKind::StableSwapAmm).await);
    assert!(matches!(
        h.router
            .generate_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
            .await,
        Err(RouterError::ProtocolPaused(VenueKind::StableSwapAmm))
    ));
    h.router
        .set_protocol_paused(&auth, VenueKind::StableSwapAmm, false)
        .await
        .unwrap();

    h.router.pause(&auth).await.unwrap();
    assert!(matches!(
        h.router
            .generate_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
            .await,
        Err(RouterError::Paused)
    ));
    h.router.unpause(&auth).await.unwrap();
    assert!(h
        .router
        .generate_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .is_ok());
}

#[tokio::test]
async fn validation_is_a_side_effect_free_dry_run() {
    let h = harness().await;
    h.steth_route().await;
    let mut rx = h.router.events().subscribe();

    let ok = h
        .router
        .validate_swap_execution(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
        .await;
    assert!(ok.valid);
    assert_eq!(ok.estimated_output, U256::from(980_000_000_000_000_000u128));

    let too_greedy = h
        .router
        .validate_swap_execution(STETH, WETH, e18(1), e18(1), RECIPIENT)
        .await;
    assert!(!too_greedy.valid);

    let no_route = h
        .router
        .validate_swap_execution(STETH, RETH, e18(1), U256::ZERO, RECIPIENT)
        .await;
    assert!(!no_route.valid);
    assert!(no_route.reason.is_some());

    assert_eq!(h.venue.calls(), 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn shortfall_is_reported() {
    let h = harness().await;
    h.steth_route().await;
    let mut rx = h.router.events().subscribe();
    let plan = h
        .router
        .generate_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    assert!(h.router.verify_execution(&plan, plan.minimum_output).is_ok());
    let err = h
        .router
        .verify_execution(&plan, plan.minimum_output - U256::from(1u8))
        .unwrap_err();
    assert!(matches!(err, RouterError::InsufficientOutput { .. }));
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, RouterEvent::ExecutionShortfall { .. })));
}

#[tokio::test]
async fn configured_fallback_rate_drives_estimate() {
    let h = harness().await;
    h.steth_route().await;
    // 1 stETH = 0.95 WETH
    h.router
        .set_fallback_rate(&admin_auth(), STETH, WETH, Some(9_500))
        .await
        .unwrap();
    let plan = h
        .router
        .generate_swap_execution_data(STETH, WETH, e18(1), U256::ZERO, RECIPIENT)
        .await
        .unwrap();
    // 0.95 less the 2% haircut
    assert_eq!(plan.expected_output, U256::from(931_000_000_000_000_000u128));
}

#[tokio::test]
async fn state_snapshot_restores_routes() {
    let h = harness().await;
    h.steth_route().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    h.router.save_state(&path).await.unwrap();

    let restored = ultra_router::router::Router::new(
        h.venue.clone(),
        registry(),
        ultra_router::router::RouterSettings::default(),
    )
    .with_state(RouterState::load(&path).unwrap());
    assert!(restored.is_initialized().await);
    assert_eq!(
        restored.get_route(STETH, WETH).await,
        h.router.get_route(STETH, WETH).await
    );
    assert!(restored.get_pool_status(STETH_POOL).await.is_some());
}

#[tokio::test]
async fn restored_state_follows_configured_cooldown() {
    let h = harness().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    h.router.save_state(&path).await.unwrap();

    let settings = ultra_router::router::RouterSettings {
        venue_cooldown_secs: 60,
        ..Default::default()
    };
    let clock = ultra_router::clock::ManualClock::new(START + 60);
    let restored = ultra_router::router::Router::new(h.venue.clone(), registry(), settings)
        .with_clock(std::sync::Arc::new(clock))
        .with_state(RouterState::load(&path).unwrap());
    assert_eq!(restored.snapshot().await.venue_cooldown_secs, 60);
    restored.unregister_dex(&admin_auth(), RETH_POOL).await.unwrap();
    assert!(restored.get_pool_status(RETH_POOL).await.is_none());
}
