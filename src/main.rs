use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use ultra_router::assets::AssetId;
use ultra_router::config::{AppConfig, Bootstrap};
use ultra_router::router::api::create_api_router;
use ultra_router::router::{Router, RouterState};
use ultra_router::transport::JsonRpc;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        tracing::error!(error = ?err, "fatal router error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;

    let bootstrap = match &config.bootstrap_path {
        Some(path) => Bootstrap::load(path)?,
        None => {
            warn!("no bootstrap file configured; starting with an empty route table");
            Bootstrap::default()
        }
    };
    let assets = bootstrap.asset_registry(AssetId(config.wrapped_native));

    let rpc = JsonRpc::new(
        config.rpc_endpoint.as_str(),
        Duration::from_millis(config.rpc_timeout_ms),
    )
    .with_context(|| format!("create JSON-RPC client for {}", config.rpc_endpoint))?
    .with_max_elapsed(Duration::from_millis(config.rpc_retry_ms));

    let mut router = Router::new(Arc::new(rpc.clone()), assets, config.settings.clone());
    let restored = match &config.state_path {
        Some(path) if path.exists() => {
            let state = RouterState::load(path)
                .with_context(|| format!("restore router state from {}", path.display()))?;
            router = router.with_state(state);
            true
        }
        _ => false,
    };
    let router = Arc::new(router);

    if !restored {
        router
            .initialize(config.admin, config.commitment()?)
            .await
            .context("initialize router")?;
        bootstrap
            .apply(&router, &config.admin_auth())
            .await
            .context("apply bootstrap")?;
    }

    let app = App {
        config: Arc::new(config),
        rpc,
        router,
    };
    app.run().await
}

struct App {
    config: Arc<AppConfig>,
    rpc: JsonRpc,
    router: Arc<Router<JsonRpc>>,
}

impl App {
    async fn run(self) -> Result<()> {
        info!(
            admin = %self.config.admin,
            rpc = %self.rpc.endpoint(),
            listen = %self.config.listen_addr,
            "swap router online"
        );

        // audit trail of every router event
        let mut events = self.router.events().subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(line) => info!(target: "router_events", event = %line),
                        Err(err) => warn!(error = %err, "event encode failed"),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let listener = tokio::net::TcpListener::bind(self.config.listen_addr)
            .await
            .with_context(|| format!("bind API server address {}", self.config.listen_addr))?;
        let api_router = create_api_router(self.router.clone());
        info!(address = %self.config.listen_addr, "HTTP API server starting");
        let _api_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, api_router).await {
                warn!(error = %e, "API server error");
            }
        });

        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = self.router.snapshot().await;
                    info!(
                        routes = snapshot.routes.len(),
                        venues = snapshot.venues.len(),
                        paused = snapshot.switches.is_paused(),
                        "router heartbeat"
                    );
                    debug!(
                        allowed_selectors = snapshot.allowed_selectors.len(),
                        denied_selectors = snapshot.denied_selectors.len(),
                        "selector policy"
                    );
                }
                res = tokio::signal::ctrl_c() => {
                    if let Err(err) = res {
                        warn!(error = %err, "ctrl_c listener error");
                    }
                    info!("Shutdown signal received, exiting");
                    break;
                }
            }
        }

        if let Some(path) = &self.config.state_path {
            self.router
                .save_state(path)
                .await
                .with_context(|| format!("save router state to {}", path.display()))?;
        }
        Ok(())
    }
}

fn init_tracing() -> Result<()> {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn,tower_http=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
