// Library root module for ultra-router
// This file defines the public API and module structure for the ultra-router library
// It exports route configuration, quoting and execution planning for swap venues
//
// Numan Thabit 2025 Nov

pub mod assets;
pub mod clock;
pub mod config;
pub mod control;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod quant;
pub mod router;
pub mod security;
pub mod transport;
pub mod venues;
