// Shared fixtures for router integration tests
// A scripted in-memory venue client, a manual clock and a router seeded with
// a small asset universe
//
// Numan Thabit 2025 Nov

#![allow(dead_code)]

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use ultra_router::assets::{AssetCategory, AssetId, AssetInfo, AssetRegistry};
use ultra_router::clock::ManualClock;
use ultra_router::errors::RouterError;
use ultra_router::events::RouterEvent;
use ultra_router::router::{Router, RouterSettings, RouteParams};
use ultra_router::security::{AuthContext, SecretCommitment};
use ultra_router::venues::VenueClient;

pub const SECRET: &str = "route-secret";
pub const START: u64 = 1_700_000_000;
pub const E18: u128 = 1_000_000_000_000_000_000;

pub const WETH: AssetId = AssetId(address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
pub const STETH: AssetId = AssetId(address!("ae7ab96520DE3A18E5e111B5EaAb095312D7fE84"));
pub const RETH: AssetId = AssetId(address!("ae78736Cd615f374D3085123A210448E74Fc6393"));
pub const USDC: AssetId = AssetId(address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
pub const USDT: AssetId = AssetId(address!("dAC17F958D2ee523a2206206994597C13D831ec7"));
pub const DAI: AssetId = AssetId(address!("6B175474E89094C44Da98b954EedeAC495271d0F"));

pub const STETH_POOL: Address = Address::repeat_byte(0x51);
pub const RETH_POOL: Address = Address::repeat_byte(0x52);
pub const STAKER: Address = Address::repeat_byte(0x53);
pub const V3_ROUTER: Address = Address::repeat_byte(0x54);
pub const V3_QUOTER: Address = Address::repeat_byte(0x55);
pub const RECIPIENT: Address = Address::repeat_byte(0x77);

pub fn admin() -> Address {
    Address::repeat_byte(0xad)
}

pub fn admin_auth() -> AuthContext {
    AuthContext::new(admin()).with_secret(SECRET)
}

pub fn e18(units: u128) -> U256 {
    U256::from(units * E18)
}

/// Venue client answering every static call with one scripted amount.
#[derive(Default)]
pub struct MockVenue {
    codes: Mutex<HashMap<Address, usize>>,
    answer: Mutex<Option<U256>>,
    calls: AtomicUsize,
}

impl MockVenue {
    pub fn deploy(&self, target: Address) {
        self.codes.lock().unwrap().insert(target, 1_024);
    }

    /// `None` makes every call revert.
    pub fn answer(&self, amount: Option<U256>) {
        *self.answer.lock().unwrap() = amount;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VenueClient for MockVenue {
    async fn call(&self, target: Address, _calldata: Bytes) -> Result<Bytes, RouterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = *self.answer.lock().unwrap();
        match answer {
            Some(amount) => Ok(Bytes::from(amount.abi_encode())),
            None => Err(RouterError::VenueCall {
                target,
                reason: "execution reverted".into(),
            }),
        }
    }

    async fn code_size(&self, target: Address) -> Result<usize, RouterError> {
        Ok(self.codes.lock().unwrap().get(&target).copied().unwrap_or(0))
    }
}

pub fn registry() -> AssetRegistry {
    let info = |decimals, category| AssetInfo { decimals, category };
    AssetRegistry::new(WETH)
        .with_asset(STETH, info(18, AssetCategory::NativeDerivative))
        .with_asset(RETH, info(18, AssetCategory::NativeDerivative))
        .with_asset(USDC, info(6, AssetCategory::Stable))
        .with_asset(USDT, info(6, AssetCategory::Stable))
        .with_asset(DAI, info(18, AssetCategory::Stable))
        .with_bridge(AssetCategory::NativeDerivative, WETH)
        .with_bridge(AssetCategory::Stable, USDC)
}

pub struct Harness {
    pub router: Router<MockVenue>,
    pub venue: Arc<MockVenue>,
    pub clock: ManualClock,
}

/// Initialized router with every fixture venue registered and reverting
/// quotes.
pub async fn harness() -> Harness {
    let venue = Arc::new(MockVenue::default());
    for target in [STETH_POOL, RETH_POOL, STAKER, V3_ROUTER] {
        venue.deploy(target);
    }
    let clock = ManualClock::new(START);
    let router = Router::new(venue.clone(), registry(), RouterSettings::default())
        .with_clock(Arc::new(clock.clone()));
    router
        .initialize(admin(), SecretCommitment::from_secret(SECRET))
        .await
        .unwrap();
    for target in [STETH_POOL, RETH_POOL, STAKER, V3_ROUTER] {
        router.register_dex(&admin_auth(), target).await.unwrap();
    }
    Harness {
        router,
        venue,
        clock,
    }
}

pub fn stable(pool: Address, i: i8, j: i8) -> RouteParams {
    RouteParams::StableSwap {
        pool,
        i,
        j,
        underlying: false,
    }
}

impl Harness {
    /// stETH -> WETH on the stETH pool, 50 bps fallback slippage.
    pub async fn steth_route(&self) {
        self.router
            .configure_route(&admin_auth(), STETH, WETH, stable(STETH_POOL, 1, 0), true, Some(50))
            .await
            .unwrap();
    }

    /// WETH -> rETH on the rETH pool, 50 bps fallback slippage.
    pub async fn reth_route(&self) {
        self.router
            .configure_route(&admin_auth(), WETH, RETH, stable(RETH_POOL, 0, 1), true, Some(50))
            .await
            .unwrap();
    }
}

pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<RouterEvent>) -> Vec<RouterEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}
