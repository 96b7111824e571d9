// Observability events
//
// Every router mutation publishes a RouterEvent on a broadcast channel so
// indexers and audit sinks can follow configuration changes. Diagnostic
// events are published before a failing plan request returns its error.
//
// Numan Thabit 2025 Nov

use crate::assets::AssetId;
use crate::router::routes::{RouteDescriptor, VenueKind};
use crate::security::{OperationSelector, Role};
use alloy_primitives::Address;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RouterEvent {
	Initialized { admin: Address },
	RouteConfigured { asset_in: AssetId, asset_out: AssetId, route: RouteDescriptor },
	RouteRemoved { asset_in: AssetId, asset_out: AssetId },
	VenueRegistered { venue: Address, by: Address, at: u64 },
	VenueUnregistered { venue: Address, by: Address },
	VenueWhitelisted { venue: Address, whitelisted: bool },
	VenuePaused { venue: Address, paused: bool },
	ProtocolPaused { kind: VenueKind, paused: bool },
	GlobalPause { paused: bool, by: Address },
	SelectorWhitelisted { selector: OperationSelector, allowed: bool },
	SelectorBlacklisted { selector: OperationSelector, denied: bool },
	SlippageConfigured { asset_in: AssetId, asset_out: AssetId, bps: Option<u32> },
	FallbackRateConfigured { asset_in: AssetId, asset_out: AssetId, rate_bps: Option<u32> },
	DirectTransferMode { enabled: bool },
	RoleGranted { role: Role, account: Address },
	RoleRevoked { role: Role, account: Address },
	QuoteFallback { asset_in: AssetId, asset_out: AssetId, reason: String },
	PlanRejected { asset_in: AssetId, asset_out: AssetId, reason: String },
	ExecutionShortfall { target: Address, minimum: String, actual: String },
}

#[derive(Clone)]
pub struct EventBus {
	tx: broadcast::Sender<RouterEvent>,
}

impl EventBus {
	pub fn new(buffer: usize) -> Self {
		let (tx, _) = broadcast::channel(buffer);
		Self { tx }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
		self.tx.subscribe()
	}

	/// Publish an event; having no subscribers is not an error.
	pub fn emit(&self, event: RouterEvent) {
		debug!(?event, "router event");
		let _ = self.tx.send(event);
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}
