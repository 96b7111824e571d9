// Router module - route resolution and execution planning
// This file wires the route store, resolver, quote service, multi-step
// orchestrator, engine façade and HTTP API together
//
// Numan Thabit 2025 Nov

pub mod api;
pub mod engine;
pub mod orchestrator;
pub mod quote;
pub mod resolver;
pub mod routes;
pub mod store;

pub use engine::{QuotedExecution, Router, RouterSettings, SwapValidation};
pub use orchestrator::{HopPlan, SwapStrategy};
pub use quote::{Quote, QuoteSource};
pub use resolver::{Resolution, ResolvedHop};
pub use routes::{ConverterCall, PairKey, RouteDescriptor, RouteParams, VenueKind, WrapStep};
pub use store::{RouterState, StateSnapshot};
