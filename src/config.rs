// Configuration management module
// This file handles loading the process configuration from environment
// variables and an optional config file, plus the YAML bootstrap that seeds
// assets, venues and routes into a fresh router
//
// Numan Thabit 2025 Nov

use crate::assets::{AssetCategory, AssetId, AssetInfo, AssetRegistry};
use crate::router::engine::{Router, RouterSettings};
use crate::router::routes::RouteParams;
use crate::security::{AuthContext, OperationSelector, Role, SecretCommitment};
use crate::venues::adapter::VenueClient;
use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// JSON-RPC endpoint used for quoting reads and code checks
    pub rpc_endpoint: Url,
    /// Per-request HTTP timeout for venue reads
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
    /// Total retry budget for one venue read
    #[serde(default = "default_rpc_retry_ms")]
    pub rpc_retry_ms: u64,
    /// HTTP API bind address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Account seated as admin on first start
    pub admin: Address,
    /// Wrapped form of the native asset
    pub wrapped_native: Address,
    /// Route secret; needed to apply bootstrap routes
    pub route_secret: Option<String>,
    /// Hex blake2b-256 commitment; derived from `route_secret` when absent
    pub route_secret_commitment: Option<String>,
    /// Snapshot file restored on start and written on shutdown
    pub state_path: Option<PathBuf>,
    /// YAML bootstrap applied when no snapshot exists
    pub bootstrap_path: Option<PathBuf>,
    #[serde(default)]
    pub settings: RouterSettings,
}

fn default_rpc_timeout_ms() -> u64 {
    2_000
}

fn default_rpc_retry_ms() -> u64 {
    5_000
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl AppConfig {
    /// Environment variables use the `ROUTER__` prefix, e.g.
    /// `ROUTER__RPC_ENDPOINT` or `ROUTER__SETTINGS__LIVE_BUFFER_BPS`.
    pub fn load() -> Result<Self> {
        let file = std::env::var("ROUTER_CONFIG").unwrap_or_else(|_| "router".to_string());
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix("ROUTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = cfg.try_deserialize()?;
        config
            .settings
            .validate()
            .context("validate ROUTER__SETTINGS")?;
        Ok(config)
    }

    pub fn commitment(&self) -> Result<SecretCommitment> {
        match (&self.route_secret_commitment, &self.route_secret) {
            (Some(hex), _) => {
                SecretCommitment::from_hex(hex).context("parse ROUTER__ROUTE_SECRET_COMMITMENT")
            }
            (None, Some(secret)) => Ok(SecretCommitment::from_secret(secret)),
            (None, None) => {
                bail!("one of ROUTER__ROUTE_SECRET or ROUTER__ROUTE_SECRET_COMMITMENT is required")
            }
        }
    }

    /// Credentials used to apply the bootstrap.
    pub fn admin_auth(&self) -> AuthContext {
        let auth = AuthContext::new(self.admin);
        match &self.route_secret {
            Some(secret) => auth.with_secret(secret.clone()),
            None => auth,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetEntry {
    pub asset: AssetId,
    pub decimals: u8,
    pub category: AssetCategory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeEntry {
    pub category: AssetCategory,
    pub asset: AssetId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub params: RouteParams,
    #[serde(default = "default_live_quote")]
    pub supports_live_quote: bool,
    pub fallback_slippage_bps: Option<u32>,
}

fn default_live_quote() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairSetting {
    pub asset_in: AssetId,
    pub asset_out: AssetId,
    pub bps: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleGrant {
    pub role: Role,
    pub account: Address,
}

/// Initial router contents, applied through the admin surface so every
/// entry goes through the same checks as a live configuration change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Bootstrap {
    pub assets: Vec<AssetEntry>,
    pub bridges: Vec<BridgeEntry>,
    pub venues: Vec<Address>,
    pub routes: Vec<RouteEntry>,
    pub allowed_selectors: Vec<String>,
    pub denied_selectors: Vec<String>,
    pub slippage: Vec<PairSetting>,
    pub fallback_rates: Vec<PairSetting>,
    pub roles: Vec<RoleGrant>,
}

impl Bootstrap {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read bootstrap {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parse bootstrap {}", path.display()))
    }

    pub fn asset_registry(&self, wrapped_native: AssetId) -> AssetRegistry {
        let registry = self
            .assets
            .iter()
            .fold(AssetRegistry::new(wrapped_native), |reg, a| {
                reg.with_asset(
                    a.asset,
                    AssetInfo {
                        decimals: a.decimals,
                        category: a.category,
                    },
                )
            });
        self.bridges
            .iter()
            .fold(registry, |reg, b| reg.with_bridge(b.category, b.asset))
    }

    /// Apply venues, selectors, routes, overrides and roles, in that order.
    pub async fn apply<C: VenueClient>(&self, router: &Router<C>, auth: &AuthContext) -> Result<()> {
        if !self.routes.is_empty() && auth.secret.is_none() {
            bail!("bootstrap routes require ROUTER__ROUTE_SECRET");
        }
        for venue in &self.venues {
            router
                .register_dex(auth, *venue)
                .await
                .with_context(|| format!("register venue {venue}"))?;
        }
        for raw in &self.allowed_selectors {
            let selector = OperationSelector::parse(raw)?;
            router.whitelist_selector(auth, selector, true).await?;
        }
        for raw in &self.denied_selectors {
            let selector = OperationSelector::parse(raw)?;
            router.blacklist_selector(auth, selector, true).await?;
        }
        for r in &self.routes {
            router
                .configure_route(
                    auth,
                    r.asset_in,
                    r.asset_out,
                    r.params.clone(),
                    r.supports_live_quote,
                    r.fallback_slippage_bps,
                )
                .await
                .with_context(|| format!("configure route {} -> {}", r.asset_in, r.asset_out))?;
        }
        for s in &self.slippage {
            router
                .configure_slippage(auth, s.asset_in, s.asset_out, Some(s.bps))
                .await?;
        }
        for s in &self.fallback_rates {
            router
                .set_fallback_rate(auth, s.asset_in, s.asset_out, Some(s.bps))
                .await?;
        }
        for g in &self.roles {
            router.grant_role(auth, g.role, g.account).await?;
        }
        info!(
            venues = self.venues.len(),
            routes = self.routes.len(),
            "bootstrap applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
assets:
  - asset: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
    decimals: 6
    category: stable
bridges:
  - category: stable
    asset: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
venues:
  - "0x1111111111111111111111111111111111111111"
routes:
  - asset_in: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
    asset_out: "0xdAC17F958D2ee523a2206206994597C13D831ec7"
    params:
      kind: stable_swap
      pool: "0x1111111111111111111111111111111111111111"
      i: 1
      j: 2
slippage:
  - asset_in: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
    asset_out: "0xdAC17F958D2ee523a2206206994597C13D831ec7"
    bps: 25
"#;

    #[test]
    fn bootstrap_yaml_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let boot = Bootstrap::load(&path).unwrap();
        assert_eq!(boot.assets.len(), 1);
        assert_eq!(boot.routes.len(), 1);
        assert!(boot.routes[0].supports_live_quote);
        assert!(matches!(
            boot.routes[0].params,
            RouteParams::StableSwap { i: 1, j: 2, underlying: false, .. }
        ));
        assert_eq!(boot.slippage[0].bps, 25);
        assert!(boot.roles.is_empty());

        let usdc = boot.assets[0].asset;
        let reg = boot.asset_registry(AssetId(Address::repeat_byte(0xee)));
        assert_eq!(reg.decimals(usdc), 6);
        assert_eq!(reg.bridge_for(AssetCategory::Stable), Some(usdc));
    }

    #[test]
    fn commitment_prefers_explicit_hex() {
        let secret_only = AppConfig {
            rpc_endpoint: Url::parse("http://localhost:8545").unwrap(),
            rpc_timeout_ms: default_rpc_timeout_ms(),
            rpc_retry_ms: default_rpc_retry_ms(),
            listen_addr: default_listen_addr(),
            admin: Address::repeat_byte(1),
            wrapped_native: Address::repeat_byte(2),
            route_secret: Some("s3cret".into()),
            route_secret_commitment: None,
            state_path: None,
            bootstrap_path: None,
            settings: RouterSettings::default(),
        };
        let derived = secret_only.commitment().unwrap();
        assert_eq!(derived, SecretCommitment::from_secret("s3cret"));

        let mut explicit = secret_only.clone();
        explicit.route_secret_commitment = Some(SecretCommitment::from_secret("other").0.to_string());
        assert_eq!(
            explicit.commitment().unwrap(),
            SecretCommitment::from_secret("other")
        );

        let mut neither = secret_only;
        neither.route_secret = None;
        assert!(neither.commitment().is_err());
    }

    #[test]
    fn settings_reject_full_basis_point_tunables() {
        assert!(RouterSettings::default().validate().is_ok());
        let settings: RouterSettings = serde_yaml::from_str("live_buffer_bps: 10000").unwrap();
        assert!(matches!(
            settings.validate(),
            Err(crate::errors::RouterError::InvalidSlippage(10_000))
        ));
        let settings: RouterSettings =
            serde_yaml::from_str("fallback_haircut_bps: 5001").unwrap();
        assert!(settings.validate().is_err());
    }
}
