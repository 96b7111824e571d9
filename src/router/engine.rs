// Router engine
// This file implements the router façade: read-only queries, quote and plan
// computation over the resolver, quote service, orchestrator and plan
// generator, and the capability-gated admin surface
//
// Numan Thabit 2025 Nov

use crate::assets::{AssetCategory, AssetId, AssetRegistry};
use crate::clock::{Clock, SystemClock};
use crate::errors::RouterError;
use crate::events::{EventBus, RouterEvent};
use crate::metrics::PLAN_REJECTIONS;
use crate::quant::ensure_slippage;
use crate::router::orchestrator::{
    estimate_hops, expand_hops, hop_plans, propagate_minimums, HopEstimate, SwapStrategy,
};
use crate::router::quote::{
    effective_slippage_bps, minimum_output, Quote, QuoteRequest, QuoteService,
    DEFAULT_FALLBACK_HAIRCUT_BPS, DEFAULT_LIVE_BUFFER_BPS, DEFAULT_QUOTE_MAX_AGE_SECS,
};
use crate::router::resolver::{resolve, resolve_single, ResolvedHop};
use crate::router::routes::{
    ConverterCall, PairKey, RouteDescriptor, RouteParams, VenueKind,
};
use crate::router::store::{RouterState, StateSnapshot};
use crate::security::{
    AuthContext, OperationSelector, ReentrancyGuard, Role, SecretCommitment, VenueRegistration,
    DEFAULT_VENUE_COOLDOWN_SECS,
};
use crate::venues::adapter::VenueClient;
use crate::venues::builtin_selectors;
use crate::venues::plan::{generate, ExecutionPlan, PlanInput};
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Default validity window embedded in generated plans.
pub const DEFAULT_DEADLINE_SECS: u64 = 1_800;

/// Engine tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    pub live_buffer_bps: u32,
    pub fallback_haircut_bps: u32,
    pub quote_max_age_secs: u64,
    pub deadline_secs: u64,
    pub venue_cooldown_secs: u64,
    pub event_buffer: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            live_buffer_bps: DEFAULT_LIVE_BUFFER_BPS,
            fallback_haircut_bps: DEFAULT_FALLBACK_HAIRCUT_BPS,
            quote_max_age_secs: DEFAULT_QUOTE_MAX_AGE_SECS,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            venue_cooldown_secs: DEFAULT_VENUE_COOLDOWN_SECS,
            event_buffer: 1024,
        }
    }
}

impl RouterSettings {
    /// Reject basis-point tunables outside the accepted slippage range.
    pub fn validate(&self) -> Result<(), RouterError> {
        ensure_slippage(self.live_buffer_bps)?;
        ensure_slippage(self.fallback_haircut_bps)?;
        Ok(())
    }
}

/// Outcome of a dry-run feasibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapValidation {
    pub valid: bool,
    pub reason: Option<String>,
    pub estimated_output: U256,
}

/// Live quote together with the first invocation to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotedExecution {
    pub quoted_amount: U256,
    pub payload: Bytes,
    pub venue_kind: VenueKind,
    pub target: Address,
    pub value: U256,
    pub plan: ExecutionPlan,
}

enum QuoteMode {
    Live,
    Offline,
    Supplied(Quote),
}

pub struct Router<C> {
    state: RwLock<RouterState>,
    assets: AssetRegistry,
    client: Arc<C>,
    quotes: QuoteService<C>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    guard: ReentrancyGuard,
    settings: RouterSettings,
}

impl<C: VenueClient> Router<C> {
    pub fn new(client: Arc<C>, assets: AssetRegistry, settings: RouterSettings) -> Self {
        let events = EventBus::new(settings.event_buffer.max(1));
        let mut state = RouterState::new(settings.venue_cooldown_secs);
        for selector in builtin_selectors() {
            state.selectors.set_allowed(selector, true);
        }
        Self {
            state: RwLock::new(state),
            quotes: QuoteService::new(client.clone(), events.clone(), settings.fallback_haircut_bps),
            assets,
            client,
            clock: Arc::new(SystemClock),
            events,
            guard: ReentrancyGuard::default(),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the initial state, e.g. with one restored from a snapshot.
    /// The configured venue cooldown replaces the one stored in the state.
    pub fn with_state(mut self, mut state: RouterState) -> Self {
        let stored = state.venues.cooldown_secs();
        if stored != self.settings.venue_cooldown_secs {
            warn!(
                stored,
                configured = self.settings.venue_cooldown_secs,
                "restored venue cooldown differs from configuration; using configured value"
            );
            state.venues.set_cooldown_secs(self.settings.venue_cooldown_secs);
        }
        self.state = RwLock::new(state);
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    pub fn reentrancy_guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn save_state(&self, path: &Path) -> Result<(), RouterError> {
        self.state.read().await.save(path)
    }

    // ---- queries ----

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_initialized()
    }

    pub async fn is_paused(&self) -> bool {
        self.state.read().await.switches().is_paused()
    }

    /// True if the pair resolves to any route, including bridged ones.
    pub async fn has_route(&self, asset_in: AssetId, asset_out: AssetId) -> bool {
        let state = self.state.read().await;
        resolve(&state, &self.assets, asset_in, asset_out).is_ok()
    }

    /// Stored descriptor for the exact ordered pair.
    pub async fn get_route(&self, asset_in: AssetId, asset_out: AssetId) -> Option<RouteDescriptor> {
        self.state.read().await.route(asset_in, asset_out).cloned()
    }

    pub async fn get_pool_status(&self, venue: Address) -> Option<VenueRegistration> {
        self.state.read().await.venues().get(&venue).cloned()
    }

    /// True when the venue kind is paused.
    pub async fn get_protocol_status(&self, kind: VenueKind) -> bool {
        self.state.read().await.switches().is_kind_paused(kind)
    }

    pub async fn slippage_override(&self, asset_in: AssetId, asset_out: AssetId) -> Option<u32> {
        self.state
            .read()
            .await
            .slippage_override(PairKey::new(asset_in, asset_out))
    }

    pub async fn selector_status(&self, selector: OperationSelector) -> (bool, bool) {
        let state = self.state.read().await;
        (
            state.selectors().is_allowed(&selector),
            state.selectors().is_denied(&selector),
        )
    }

    pub async fn has_role(&self, role: Role, account: Address) -> bool {
        self.state.read().await.access().has(role, account)
    }

    /// Dry run of a swap: resolution, gating and an offline estimate. Never
    /// calls a venue and never changes state.
    #[instrument(skip(self))]
    pub async fn validate_swap_execution(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        min_out: U256,
        executor: Address,
    ) -> SwapValidation {
        let estimated = async {
            if executor == Address::ZERO {
                return Err(RouterError::InvalidRoute("executor address is zero".into()));
            }
            let strategy = self
                .build_strategy(asset_in, asset_out, amount_in, U256::ZERO, executor, QuoteMode::Offline)
                .await?;
            Ok::<U256, RouterError>(strategy.expected_output)
        }
        .await;

        match estimated {
            Ok(estimated_output) if estimated_output >= min_out => SwapValidation {
                valid: true,
                reason: None,
                estimated_output,
            },
            Ok(estimated_output) => SwapValidation {
                valid: false,
                reason: Some(format!(
                    "estimated output {estimated_output} below requested minimum {min_out}"
                )),
                estimated_output,
            },
            Err(err) => SwapValidation {
                valid: false,
                reason: Some(err.to_string()),
                estimated_output: U256::ZERO,
            },
        }
    }

    // ---- compute ----

    /// Live quote plus the first invocation, with no caller floor.
    #[instrument(skip(self))]
    pub async fn get_quote_and_execution_data(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        recipient: Address,
    ) -> Result<QuotedExecution, RouterError> {
        let result = self
            .build_strategy(asset_in, asset_out, amount_in, U256::ZERO, recipient, QuoteMode::Live)
            .await
            .map(|strategy| QuotedExecution {
                quoted_amount: strategy.expected_output,
                payload: strategy.first.payload.clone(),
                venue_kind: strategy.first.venue_kind,
                target: strategy.first.target,
                value: strategy.first.value,
                plan: strategy.first,
            });
        self.reject_on_error(asset_in, asset_out, result)
    }

    /// Plan with a live quote and the caller's minimum as floor.
    #[instrument(skip(self))]
    pub async fn get_quoted_swap_execution_data(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        min_out: U256,
        recipient: Address,
    ) -> Result<ExecutionPlan, RouterError> {
        let result = self
            .build_strategy(asset_in, asset_out, amount_in, min_out, recipient, QuoteMode::Live)
            .await
            .map(|s| s.first);
        self.reject_on_error(asset_in, asset_out, result)
    }

    /// Plan from the offline estimate only; no venue is called.
    #[instrument(skip(self))]
    pub async fn generate_swap_execution_data(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        min_out: U256,
        recipient: Address,
    ) -> Result<ExecutionPlan, RouterError> {
        let result = self
            .build_strategy(asset_in, asset_out, amount_in, min_out, recipient, QuoteMode::Offline)
            .await
            .map(|s| s.first);
        self.reject_on_error(asset_in, asset_out, result)
    }

    /// Plan from a quote the caller obtained earlier; stale valid quotes are
    /// rejected.
    #[instrument(skip(self))]
    pub async fn generate_swap_execution_data_with_quote(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        min_out: U256,
        recipient: Address,
        quote: Quote,
    ) -> Result<ExecutionPlan, RouterError> {
        let result = self
            .build_strategy(
                asset_in,
                asset_out,
                amount_in,
                min_out,
                recipient,
                QuoteMode::Supplied(quote),
            )
            .await
            .map(|s| s.first);
        self.reject_on_error(asset_in, asset_out, result)
    }

    /// Full hop-by-hop strategy with the first hop's plan.
    #[instrument(skip(self))]
    pub async fn get_complex_swap_strategy(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        min_out: U256,
        recipient: Address,
    ) -> Result<SwapStrategy, RouterError> {
        let result = self
            .build_strategy(asset_in, asset_out, amount_in, min_out, recipient, QuoteMode::Live)
            .await;
        self.reject_on_error(asset_in, asset_out, result)
    }

    /// Plan hop `hop_index` of a strategy from the realized output of the
    /// previous hop. The hop must still match the stored configuration.
    #[instrument(skip(self, strategy))]
    pub async fn continue_strategy(
        &self,
        strategy: &SwapStrategy,
        hop_index: usize,
        realized_in: U256,
        recipient: Address,
    ) -> Result<ExecutionPlan, RouterError> {
        let result = self
            .continue_inner(strategy, hop_index, realized_in, recipient)
            .await;
        self.reject_on_error(strategy.asset_in, strategy.asset_out, result)
    }

    /// Check a realized output against the plan's minimum.
    pub fn verify_execution(&self, plan: &ExecutionPlan, realized_output: U256) -> Result<(), RouterError> {
        if realized_output < plan.minimum_output {
            warn!(
                target = %plan.target,
                minimum = %plan.minimum_output,
                actual = %realized_output,
                "execution output below minimum"
            );
            self.events.emit(RouterEvent::ExecutionShortfall {
                target: plan.target,
                minimum: plan.minimum_output.to_string(),
                actual: realized_output.to_string(),
            });
            return Err(RouterError::InsufficientOutput {
                actual: realized_output.to_string(),
                minimum: plan.minimum_output.to_string(),
            });
        }
        Ok(())
    }

    fn reject_on_error<T>(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        result: Result<T, RouterError>,
    ) -> Result<T, RouterError> {
        if let Err(err) = &result {
            let kind = format!("{:?}", err.kind());
            PLAN_REJECTIONS.with_label_values(&[kind.as_str()]).inc();
            warn!(%asset_in, %asset_out, error = %err, "plan request rejected");
            self.events.emit(RouterEvent::PlanRejected {
                asset_in,
                asset_out,
                reason: err.to_string(),
            });
        }
        result
    }

    fn precheck(state: &RouterState, amount_in: U256, recipient: Address) -> Result<(), RouterError> {
        state.ensure_initialized()?;
        state.switches().ensure_not_paused()?;
        if amount_in.is_zero() {
            return Err(RouterError::ZeroAmount);
        }
        if recipient == Address::ZERO {
            return Err(RouterError::InvalidRoute("recipient address is zero".into()));
        }
        Ok(())
    }

    fn gate_hop(state: &RouterState, hop: &ResolvedHop) -> Result<(), RouterError> {
        state.switches().ensure_kind_active(hop.venue_kind())?;
        if let Some(target) = hop.route.params.target() {
            state.venues().ensure_usable(target)?;
        }
        Ok(())
    }

    fn slippage_for(state: &RouterState, hop: &ResolvedHop) -> u32 {
        state
            .slippage_override(PairKey::new(hop.asset_in, hop.asset_out))
            .or_else(|| state.slippage_override(hop.stored_key))
            .unwrap_or(hop.route.fallback_slippage_bps)
    }

    async fn build_strategy(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: U256,
        floor: U256,
        recipient: Address,
        mode: QuoteMode,
    ) -> Result<SwapStrategy, RouterError> {
        let now = self.clock.now();
        let (hops, requests, slippages) = {
            let state = self.state.read().await;
            Self::precheck(&state, amount_in, recipient)?;
            let resolution = resolve(&state, &self.assets, asset_in, asset_out)?;
            let hops = expand_hops(&resolution, &state, &self.assets)?;
            for hop in &hops {
                Self::gate_hop(&state, hop)?;
            }
            let requests: Vec<QuoteRequest> = hops
                .iter()
                .map(|h| QuoteRequest::for_hop(h, U256::ZERO, &state, &self.assets))
                .collect();
            let slippages: Vec<u32> = hops.iter().map(|h| Self::slippage_for(&state, h)).collect();
            (hops, requests, slippages)
        };

        let estimates = match mode {
            QuoteMode::Live => {
                estimate_hops(&self.quotes, requests, &slippages, amount_in, now, true, &self.settings)
                    .await
            }
            QuoteMode::Offline => {
                estimate_hops(&self.quotes, requests, &slippages, amount_in, now, false, &self.settings)
                    .await
            }
            QuoteMode::Supplied(quote) => {
                quote.ensure_not_stale(now, self.settings.quote_max_age_secs)?;
                if hops.len() != 1 {
                    return Err(RouterError::InvalidRoute(
                        "a supplied quote only applies to single-hop routes".into(),
                    ));
                }
                let fresh = quote.is_fresh(now, self.settings.quote_max_age_secs);
                vec![HopEstimate {
                    input: amount_in,
                    naive_minimum: minimum_output(
                        &quote,
                        fresh,
                        self.settings.live_buffer_bps,
                        slippages[0],
                        U256::ZERO,
                    ),
                    slippage_bps: effective_slippage_bps(
                        &quote,
                        fresh,
                        self.settings.live_buffer_bps,
                        slippages[0],
                    ),
                    fallback_slippage_bps: slippages[0],
                    quote,
                }]
            }
        };

        let mins = propagate_minimums(&estimates, floor);
        let plans = hop_plans(hops, &estimates, &mins);
        let (Some(first_hop), Some(last_hop)) = (plans.first(), plans.last()) else {
            return Err(RouterError::NoRouteFound {
                asset_in,
                asset_out,
            });
        };
        let expected_output = last_hop.expected_output;
        let minimum_output = last_hop.minimum_output;

        let first = {
            let state = self.state.read().await;
            state.ensure_initialized()?;
            state.switches().ensure_not_paused()?;
            generate(
                &state,
                self.assets.wrapped_native(),
                PlanInput {
                    hop: &first_hop.hop,
                    amount_in,
                    minimum_output: first_hop.minimum_output,
                    expected_output: first_hop.expected_output,
                    quote_source: first_hop.quote_source,
                    recipient,
                    deadline: now.saturating_add(self.settings.deadline_secs),
                    remaining_hops: plans.len() - 1,
                },
            )?
        };

        info!(
            %asset_in,
            %asset_out,
            %amount_in,
            hops = plans.len(),
            %expected_output,
            %minimum_output,
            "swap planned"
        );
        Ok(SwapStrategy {
            asset_in,
            asset_out,
            amount_in,
            expected_output,
            minimum_output,
            hops: plans,
            first,
        })
    }

    async fn continue_inner(
        &self,
        strategy: &SwapStrategy,
        hop_index: usize,
        realized_in: U256,
        recipient: Address,
    ) -> Result<ExecutionPlan, RouterError> {
        let planned = strategy.hop(hop_index)?;
        let now = self.clock.now();
        let (request, slippage) = {
            let state = self.state.read().await;
            Self::precheck(&state, realized_in, recipient)?;
            let current = resolve_single(&state, &self.assets, planned.hop.asset_in, planned.hop.asset_out)
                .ok_or(RouterError::NoRouteFound {
                    asset_in: planned.hop.asset_in,
                    asset_out: planned.hop.asset_out,
                })?;
            if current != planned.hop {
                return Err(RouterError::InvalidRoute(format!(
                    "hop {hop_index} configuration changed since planning"
                )));
            }
            Self::gate_hop(&state, &current)?;
            (
                QuoteRequest::for_hop(&current, realized_in, &state, &self.assets),
                Self::slippage_for(&state, &current),
            )
        };

        let quote = self.quotes.quote(&request, now).await;
        let fresh = quote.is_fresh(now, self.settings.quote_max_age_secs);
        // the committed minimum keeps later hops reachable
        let min = minimum_output(
            &quote,
            fresh,
            self.settings.live_buffer_bps,
            slippage,
            planned.minimum_output,
        );

        let state = self.state.read().await;
        state.switches().ensure_not_paused()?;
        generate(
            &state,
            self.assets.wrapped_native(),
            PlanInput {
                hop: &planned.hop,
                amount_in: realized_in,
                minimum_output: min,
                expected_output: quote.amount,
                quote_source: quote.source,
                recipient,
                deadline: now.saturating_add(self.settings.deadline_secs),
                remaining_hops: strategy.remaining_after(hop_index),
            },
        )
    }

    // ---- admin ----

    fn authorize(
        state: &RouterState,
        auth: &AuthContext,
        roles: &[Role],
        allow_when_paused: bool,
        needs_secret: bool,
    ) -> Result<(), RouterError> {
        let commitment = state.ensure_initialized()?;
        if !allow_when_paused {
            state.switches().ensure_not_paused()?;
        }
        state.access().require_any(roles, auth.caller)?;
        if needs_secret {
            commitment.verify(auth.secret.as_deref())?;
        }
        Ok(())
    }

    /// Run a mutation under the reentrancy guard and the write lock. The
    /// closure validates before it writes and returns the events to publish.
    async fn mutate<T, F>(
        &self,
        op: &'static str,
        auth: &AuthContext,
        roles: &[Role],
        allow_when_paused: bool,
        needs_secret: bool,
        apply: F,
    ) -> Result<T, RouterError>
    where
        F: FnOnce(&mut RouterState, u64) -> Result<(T, Vec<RouterEvent>), RouterError> + Send,
        T: Send,
    {
        let _entered = self.guard.enter()?;
        let mut state = self.state.write().await;
        Self::authorize(&state, auth, roles, allow_when_paused, needs_secret)?;
        let (out, events) = apply(&mut state, self.clock.now())?;
        drop(state);
        info!(op, caller = %auth.caller, "admin operation applied");
        for event in events {
            self.events.emit(event);
        }
        Ok(out)
    }

    /// One-time setup: fix the route secret commitment and seat the admin.
    pub async fn initialize(
        &self,
        admin: Address,
        commitment: SecretCommitment,
    ) -> Result<(), RouterError> {
        let _entered = self.guard.enter()?;
        let mut state = self.state.write().await;
        if state.is_initialized() {
            return Err(RouterError::AlreadyInitialized);
        }
        if admin == Address::ZERO {
            return Err(RouterError::Unauthorized(admin));
        }
        state.commitment = Some(commitment);
        state.access.grant(Role::Admin, admin);
        drop(state);
        info!(%admin, "router initialized");
        self.events.emit(RouterEvent::Initialized { admin });
        self.events.emit(RouterEvent::RoleGranted {
            role: Role::Admin,
            account: admin,
        });
        Ok(())
    }

    fn default_slippage(&self, asset_in: AssetId, asset_out: AssetId) -> u32 {
        // unknown assets are treated as volatile; the looser side wins
        [asset_in, asset_out]
            .iter()
            .map(|a| {
                self.assets
                    .category(*a)
                    .unwrap_or(AssetCategory::Volatile)
                    .default_slippage_bps()
            })
            .max()
            .unwrap_or(AssetCategory::Volatile.default_slippage_bps())
    }

    /// Configure (or replace) the route for an ordered pair.
    pub async fn configure_route(
        &self,
        auth: &AuthContext,
        asset_in: AssetId,
        asset_out: AssetId,
        params: RouteParams,
        supports_live_quote: bool,
        fallback_slippage_bps: Option<u32>,
    ) -> Result<RouteDescriptor, RouterError> {
        let slippage = fallback_slippage_bps.unwrap_or_else(|| self.default_slippage(asset_in, asset_out));
        let assets = &self.assets;
        self.mutate(
            "configure_route",
            auth,
            &[Role::Admin, Role::RouteManager],
            false,
            true,
            move |state, _now| {
                if asset_in == asset_out {
                    return Err(RouterError::SameAsset(asset_in));
                }
                params.validate(asset_in, asset_out)?;
                let slippage = ensure_slippage(slippage)?;
                if let Some(target) = params.target() {
                    if state.venues().get(&target).is_none() {
                        return Err(RouterError::VenueNotRegistered(target));
                    }
                }
                if let RouteParams::MultiStepChain { via } = &params {
                    let mut waypoints = vec![asset_in];
                    waypoints.extend(via.iter().copied());
                    waypoints.push(asset_out);
                    for w in waypoints.windows(2) {
                        let leg = resolve_single(state, assets, w[0], w[1]).ok_or(
                            RouterError::NoRouteFound {
                                asset_in: w[0],
                                asset_out: w[1],
                            },
                        )?;
                        if leg.venue_kind() == VenueKind::MultiStepChain {
                            return Err(RouterError::InvalidRoute(
                                "multi-step chains cannot nest".into(),
                            ));
                        }
                    }
                }
                let live = supports_live_quote
                    && !matches!(
                        params.kind(),
                        VenueKind::DirectConverter | VenueKind::MultiStepChain
                    );
                let route = RouteDescriptor {
                    params,
                    is_configured: true,
                    fallback_slippage_bps: slippage,
                    supports_live_quote: live,
                };
                state
                    .routes
                    .insert(PairKey::new(asset_in, asset_out), route.clone());
                let event = RouterEvent::RouteConfigured {
                    asset_in,
                    asset_out,
                    route: route.clone(),
                };
                Ok((route, vec![event]))
            },
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn configure_multi_hop_route(
        &self,
        auth: &AuthContext,
        asset_in: AssetId,
        asset_out: AssetId,
        router: Address,
        quoter: Address,
        path: Vec<AssetId>,
        fees: Vec<u32>,
    ) -> Result<RouteDescriptor, RouterError> {
        let params = RouteParams::MultiHopPath {
            router,
            quoter,
            path,
            fees,
        };
        self.configure_route(auth, asset_in, asset_out, params, true, None)
            .await
    }

    pub async fn configure_multi_step_route(
        &self,
        auth: &AuthContext,
        asset_in: AssetId,
        asset_out: AssetId,
        via: Vec<AssetId>,
    ) -> Result<RouteDescriptor, RouterError> {
        let params = RouteParams::MultiStepChain { via };
        self.configure_route(auth, asset_in, asset_out, params, false, None)
            .await
    }

    pub async fn configure_direct_mint_route(
        &self,
        auth: &AuthContext,
        asset_in: AssetId,
        asset_out: AssetId,
        converter: Address,
        call: ConverterCall,
    ) -> Result<RouteDescriptor, RouterError> {
        let params = RouteParams::DirectConverter { converter, call };
        self.configure_route(auth, asset_in, asset_out, params, false, None)
            .await
    }

    pub async fn remove_route(
        &self,
        auth: &AuthContext,
        asset_in: AssetId,
        asset_out: AssetId,
    ) -> Result<(), RouterError> {
        self.mutate(
            "remove_route",
            auth,
            &[Role::Admin, Role::RouteManager],
            false,
            true,
            move |state, _now| {
                state
                    .routes
                    .remove(&PairKey::new(asset_in, asset_out))
                    .ok_or(RouterError::RouteNotConfigured {
                        asset_in,
                        asset_out,
                    })?;
                Ok(((), vec![RouterEvent::RouteRemoved { asset_in, asset_out }]))
            },
        )
        .await
    }

    async fn set_whitelisted(
        &self,
        auth: &AuthContext,
        venue: Address,
        whitelisted: bool,
    ) -> Result<(), RouterError> {
        self.mutate("set_whitelisted", auth, &[Role::Admin], false, false, move |state, _now| {
            state.venues.get_mut(venue)?.whitelisted = whitelisted;
            Ok(((), vec![RouterEvent::VenueWhitelisted { venue, whitelisted }]))
        })
        .await
    }

    pub async fn whitelist_pool(&self, auth: &AuthContext, venue: Address) -> Result<(), RouterError> {
        self.set_whitelisted(auth, venue, true).await
    }

    pub async fn remove_pool_from_whitelist(
        &self,
        auth: &AuthContext,
        venue: Address,
    ) -> Result<(), RouterError> {
        self.set_whitelisted(auth, venue, false).await
    }

    pub async fn set_pool_paused(
        &self,
        auth: &AuthContext,
        venue: Address,
        paused: bool,
    ) -> Result<(), RouterError> {
        self.mutate(
            "set_pool_paused",
            auth,
            &[Role::Admin, Role::Pauser],
            true,
            false,
            move |state, _now| {
                state.venues.get_mut(venue)?.paused = paused;
                Ok(((), vec![RouterEvent::VenuePaused { venue, paused }]))
            },
        )
        .await
    }

    pub async fn set_protocol_paused(
        &self,
        auth: &AuthContext,
        kind: VenueKind,
        paused: bool,
    ) -> Result<(), RouterError> {
        self.mutate(
            "set_protocol_paused",
            auth,
            &[Role::Admin, Role::Pauser],
            true,
            false,
            move |state, _now| {
                state.switches.set_kind_paused(kind, paused);
                Ok(((), vec![RouterEvent::ProtocolPaused { kind, paused }]))
            },
        )
        .await
    }

    /// Register a venue after confirming code is deployed at its address.
    pub async fn register_dex(
        &self,
        auth: &AuthContext,
        venue: Address,
    ) -> Result<VenueRegistration, RouterError> {
        let _entered = self.guard.enter()?;
        {
            let state = self.state.read().await;
            Self::authorize(&state, auth, &[Role::Admin], false, false)?;
            state.venues().check_can_register(venue)?;
        }
        if self.client.code_size(venue).await? == 0 {
            return Err(RouterError::VenueHasNoCode(venue));
        }
        let mut state = self.state.write().await;
        Self::authorize(&state, auth, &[Role::Admin], false, false)?;
        let now = self.clock.now();
        let registration = state.venues.register(venue, auth.caller, now)?.clone();
        drop(state);
        self.events.emit(RouterEvent::VenueRegistered {
            venue,
            by: auth.caller,
            at: now,
        });
        Ok(registration)
    }

    /// De-register a venue once its cooldown has elapsed.
    pub async fn unregister_dex(&self, auth: &AuthContext, venue: Address) -> Result<(), RouterError> {
        let caller = auth.caller;
        self.mutate("unregister_dex", auth, &[Role::Admin], false, false, move |state, now| {
            state.venues.unregister(venue, now)?;
            Ok(((), vec![RouterEvent::VenueUnregistered { venue, by: caller }]))
        })
        .await
    }

    pub async fn whitelist_selector(
        &self,
        auth: &AuthContext,
        selector: OperationSelector,
        allowed: bool,
    ) -> Result<(), RouterError> {
        self.mutate("whitelist_selector", auth, &[Role::Admin], false, false, move |state, _now| {
            state.selectors.set_allowed(selector, allowed);
            Ok(((), vec![RouterEvent::SelectorWhitelisted { selector, allowed }]))
        })
        .await
    }

    pub async fn blacklist_selector(
        &self,
        auth: &AuthContext,
        selector: OperationSelector,
        denied: bool,
    ) -> Result<(), RouterError> {
        self.mutate("blacklist_selector", auth, &[Role::Admin], false, false, move |state, _now| {
            state.selectors.set_denied(selector, denied);
            Ok(((), vec![RouterEvent::SelectorBlacklisted { selector, denied }]))
        })
        .await
    }

    /// Set or clear (`None`) the per-pair slippage override.
    pub async fn configure_slippage(
        &self,
        auth: &AuthContext,
        asset_in: AssetId,
        asset_out: AssetId,
        bps: Option<u32>,
    ) -> Result<(), RouterError> {
        self.mutate(
            "configure_slippage",
            auth,
            &[Role::Admin, Role::RouteManager],
            false,
            false,
            move |state, _now| {
                let key = PairKey::new(asset_in, asset_out);
                match bps {
                    Some(value) => {
                        state.slippage_overrides.insert(key, ensure_slippage(value)?);
                    }
                    None => {
                        state.slippage_overrides.remove(&key);
                    }
                }
                Ok((
                    (),
                    vec![RouterEvent::SlippageConfigured {
                        asset_in,
                        asset_out,
                        bps,
                    }],
                ))
            },
        )
        .await
    }

    /// Set or clear the static fallback conversion rate (10 000 = 1:1).
    pub async fn set_fallback_rate(
        &self,
        auth: &AuthContext,
        asset_in: AssetId,
        asset_out: AssetId,
        rate_bps: Option<u32>,
    ) -> Result<(), RouterError> {
        self.mutate(
            "set_fallback_rate",
            auth,
            &[Role::Admin, Role::RouteManager],
            false,
            false,
            move |state, _now| {
                let key = PairKey::new(asset_in, asset_out);
                match rate_bps {
                    Some(0) => {
                        return Err(RouterError::InvalidRoute("fallback rate must be positive".into()))
                    }
                    Some(rate) => {
                        state.fallback_rates.insert(key, rate);
                    }
                    None => {
                        state.fallback_rates.remove(&key);
                    }
                }
                Ok((
                    (),
                    vec![RouterEvent::FallbackRateConfigured {
                        asset_in,
                        asset_out,
                        rate_bps,
                    }],
                ))
            },
        )
        .await
    }

    pub async fn set_direct_transfer_mode(
        &self,
        auth: &AuthContext,
        enabled: bool,
    ) -> Result<(), RouterError> {
        self.mutate("set_direct_transfer_mode", auth, &[Role::Admin], false, false, move |state, _now| {
            state.switches.set_direct_transfer(enabled);
            Ok(((), vec![RouterEvent::DirectTransferMode { enabled }]))
        })
        .await
    }

    async fn set_global_pause(&self, auth: &AuthContext, paused: bool) -> Result<(), RouterError> {
        let by = auth.caller;
        self.mutate(
            "set_global_pause",
            auth,
            &[Role::Admin, Role::Pauser],
            true,
            false,
            move |state, _now| {
                state.switches.set_paused(paused);
                Ok(((), vec![RouterEvent::GlobalPause { paused, by }]))
            },
        )
        .await
    }

    pub async fn pause(&self, auth: &AuthContext) -> Result<(), RouterError> {
        self.set_global_pause(auth, true).await
    }

    pub async fn unpause(&self, auth: &AuthContext) -> Result<(), RouterError> {
        self.set_global_pause(auth, false).await
    }

    pub async fn grant_role(
        &self,
        auth: &AuthContext,
        role: Role,
        account: Address,
    ) -> Result<(), RouterError> {
        self.mutate("grant_role", auth, &[Role::Admin], true, false, move |state, _now| {
            state.access.grant(role, account);
            Ok(((), vec![RouterEvent::RoleGranted { role, account }]))
        })
        .await
    }

    /// Revoke a role. The last admin cannot be removed.
    pub async fn revoke_role(
        &self,
        auth: &AuthContext,
        role: Role,
        account: Address,
    ) -> Result<(), RouterError> {
        self.mutate("revoke_role", auth, &[Role::Admin], true, false, move |state, _now| {
            if role == Role::Admin
                && state.access().has(Role::Admin, account)
                && state.access().count(Role::Admin) == 1
            {
                return Err(RouterError::Unauthorized(account));
            }
            state.access.revoke(role, account);
            Ok(((), vec![RouterEvent::RoleRevoked { role, account }]))
        })
        .await
    }
}
