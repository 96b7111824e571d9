// Router HTTP API implementation
// This file provides HTTP endpoints for route lookup, quoting, plan
// generation, dry-run validation and multi-hop strategies
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::errors::{ErrorKind, RouterError};
use crate::metrics;
use crate::router::engine::{QuotedExecution, Router, SwapValidation};
use crate::router::orchestrator::SwapStrategy;
use crate::router::quote::Quote;
use crate::router::routes::{RouteDescriptor, VenueKind};
use crate::security::{OperationSelector, VenueRegistration};
use crate::venues::adapter::VenueClient;
use crate::venues::plan::ExecutionPlan;
use alloy_primitives::{Address, U256};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct PairQuery {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub has_route: bool,
    pub route: Option<RouteDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub amount_in: U256,
    #[serde(default)]
    pub min_out: U256,
    pub recipient: Address,
    /// Plan from the offline estimate instead of reading the venue.
    #[serde(default)]
    pub offline: bool,
    /// Previously obtained quote to plan against.
    #[serde(default)]
    pub quote: Option<Quote>,
}

#[derive(Debug, Deserialize)]
pub struct ContinueRequest {
    pub strategy: SwapStrategy,
    pub hop_index: usize,
    pub realized_in: U256,
    pub recipient: Address,
}

#[derive(Debug, Serialize)]
pub struct ProtocolStatus {
    pub kind: VenueKind,
    pub paused: bool,
}

#[derive(Debug, Serialize)]
pub struct SelectorStatus {
    pub selector: OperationSelector,
    pub allowed: bool,
    pub denied: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn status_for(err: &RouterError) -> StatusCode {
    match err {
        RouterError::NoRouteFound { .. } | RouterError::RouteNotConfigured { .. } => {
            StatusCode::NOT_FOUND
        }
        RouterError::NotInitialized | RouterError::Paused => StatusCode::SERVICE_UNAVAILABLE,
        RouterError::Reentrancy => StatusCode::CONFLICT,
        other => match other.kind() {
            ErrorKind::InputValidation => StatusCode::BAD_REQUEST,
            ErrorKind::Configuration => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Security => StatusCode::FORBIDDEN,
            ErrorKind::Execution => StatusCode::BAD_GATEWAY,
            ErrorKind::State => StatusCode::CONFLICT,
        },
    }
}

fn api_error(err: RouterError) -> ApiError {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
        }),
    )
}

/// Create the HTTP router with API endpoints
pub fn create_api_router<C: VenueClient>(router: Arc<Router<C>>) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_text))
        .route("/api/v1/route", get(get_route::<C>))
        .route("/api/v1/quote", post(quote::<C>))
        .route("/api/v1/plan", post(plan::<C>))
        .route("/api/v1/validate", post(validate::<C>))
        .route("/api/v1/strategy", post(strategy::<C>))
        .route("/api/v1/strategy/continue", post(continue_strategy::<C>))
        .route("/api/v1/venues/:venue", get(venue_status::<C>))
        .route("/api/v1/protocols/:kind", get(protocol_status::<C>))
        .route("/api/v1/selectors/:selector", get(selector_status::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(router)
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn metrics_text() -> String {
    metrics::render()
}

async fn get_route<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Query(pair): Query<PairQuery>,
) -> Json<RouteResponse> {
    Json(RouteResponse {
        has_route: router.has_route(pair.asset_in, pair.asset_out).await,
        route: router.get_route(pair.asset_in, pair.asset_out).await,
    })
}

async fn quote<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Json(req): Json<SwapRequest>,
) -> Result<Json<QuotedExecution>, ApiError> {
    router
        .get_quote_and_execution_data(req.asset_in, req.asset_out, req.amount_in, req.recipient)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn plan<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Json(req): Json<SwapRequest>,
) -> Result<Json<ExecutionPlan>, ApiError> {
    let result = match req.quote {
        Some(quote) => {
            router
                .generate_swap_execution_data_with_quote(
                    req.asset_in,
                    req.asset_out,
                    req.amount_in,
                    req.min_out,
                    req.recipient,
                    quote,
                )
                .await
        }
        None if req.offline => {
            router
                .generate_swap_execution_data(
                    req.asset_in,
                    req.asset_out,
                    req.amount_in,
                    req.min_out,
                    req.recipient,
                )
                .await
        }
        None => {
            router
                .get_quoted_swap_execution_data(
                    req.asset_in,
                    req.asset_out,
                    req.amount_in,
                    req.min_out,
                    req.recipient,
                )
                .await
        }
    };
    result.map(Json).map_err(api_error)
}

async fn validate<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Json(req): Json<SwapRequest>,
) -> Json<SwapValidation> {
    Json(
        router
            .validate_swap_execution(
                req.asset_in,
                req.asset_out,
                req.amount_in,
                req.min_out,
                req.recipient,
            )
            .await,
    )
}

async fn strategy<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Json(req): Json<SwapRequest>,
) -> Result<Json<SwapStrategy>, ApiError> {
    router
        .get_complex_swap_strategy(
            req.asset_in,
            req.asset_out,
            req.amount_in,
            req.min_out,
            req.recipient,
        )
        .await
        .map(Json)
        .map_err(api_error)
}

async fn continue_strategy<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Json(req): Json<ContinueRequest>,
) -> Result<Json<ExecutionPlan>, ApiError> {
    router
        .continue_strategy(&req.strategy, req.hop_index, req.realized_in, req.recipient)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn venue_status<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Path(venue): Path<Address>,
) -> Result<Json<VenueRegistration>, ApiError> {
    router
        .get_pool_status(venue)
        .await
        .map(Json)
        .ok_or_else(|| api_error(RouterError::VenueNotRegistered(venue)))
}

async fn protocol_status<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Path(kind): Path<VenueKind>,
) -> Json<ProtocolStatus> {
    Json(ProtocolStatus {
        kind,
        paused: router.get_protocol_status(kind).await,
    })
}

async fn selector_status<C: VenueClient>(
    State(router): State<Arc<Router<C>>>,
    Path(raw): Path<String>,
) -> Result<Json<SelectorStatus>, ApiError> {
    let selector = OperationSelector::parse(&raw).map_err(api_error)?;
    let (allowed, denied) = router.selector_status(selector).await;
    Ok(Json(SelectorStatus {
        selector,
        allowed,
        denied,
    }))
}
