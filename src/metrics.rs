// Metrics and observability module
// This file handles collection of route resolution, quoting and plan
// generation counters plus venue read latency for the router
//
// Numan Thabit 2025 Nov

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

pub static VENUE_CALL_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "router_venue_call_latency_seconds",
        "latency for read-only venue calls",
        &["method"]
    )
    .unwrap()
});

pub static ROUTE_RESOLUTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_route_resolutions_total",
        "route resolutions by outcome",
        &["outcome"]
    )
    .unwrap()
});

pub static QUOTES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_quotes_total",
        "quotes by source and venue kind",
        &["source", "venue_kind"]
    )
    .unwrap()
});

pub static PLANS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_plans_total",
        "execution plans generated by venue kind",
        &["venue_kind"]
    )
    .unwrap()
});

pub static PLAN_REJECTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "router_plan_rejections_total",
        "plan requests rejected by error kind",
        &["kind"]
    )
    .unwrap()
});

/// Render the default registry in the Prometheus text format.
pub fn render() -> String {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&prometheus::gather(), &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
