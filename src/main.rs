//! Document-sharing edge gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                       GATEWAY                        │
//!   Request       │  ┌────────┐   ┌────────────┐   ┌──────────────────┐  │
//!   ──────────────┼─▶│  http  │──▶│  routing   │──▶│ forward / 404    │──┼──▶ upstreams
//!                 │  │ server │   │ dispatcher │   │ rewrite          │  │   (custom domain,
//!                 │  └───┬────┘   └────────────┘   └──────────────────┘  │    application,
//!                 │      │ /api/teams/…, /api/pricing                    │    public pages)
//!                 │      ▼                                               │
//!                 │  ┌───────────┐  ┌─────────┐                          │
//!                 │  │ documents │  │ billing │──────────────────────────┼──▶ checkout provider
//!                 │  └───────────┘  └─────────┘                          │
//!                 │                                                      │
//!                 │  config (+ watcher) · observability · lifecycle      │
//!                 │  admin listener (bearer auth)                        │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use doc_gateway::admin::setup_admin_router;
use doc_gateway::config::loader::apply_env_overrides;
use doc_gateway::config::validation::validate_config;
use doc_gateway::config::watcher::ConfigWatcher;
use doc_gateway::config::{load_config, ConfigError, GatewayConfig};
use doc_gateway::lifecycle::{signals::shutdown_signal, Shutdown};
use doc_gateway::observability::{logging, metrics};
use doc_gateway::{AppState, GatewayServer};

#[derive(Parser, Debug)]
#[command(name = "doc-gateway", version, about = "Edge gateway for document sharing")]
struct Args {
    /// Path to the TOML configuration file. Watched for changes.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long, env = "GATEWAY_BIND")]
    bind: Option<String>,
}

fn initial_config(args: &Args) -> Result<GatewayConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = GatewayConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            config
        }
    };
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = initial_config(&args)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "doc-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = %config.deployment.mode,
        base_host = %config.deployment.base_host,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must stay alive for reloads to flow.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.with_bind_override(args.bind.clone()).run() {
                Ok(w) => (Some(w), updates),
                Err(e) => {
                    tracing::error!(error = %e, "Config watcher failed to start; hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let state = AppState::from_config(config.clone())?;
    let server = GatewayServer::new(state);
    let shutdown = Shutdown::new();

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
        let admin_router = setup_admin_router(server.state());
        let admin_shutdown = shutdown.wait();
        tokio::spawn(async move {
            let result = axum::serve(admin_listener, admin_router)
                .with_graceful_shutdown(admin_shutdown)
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Admin server failed");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on(shutdown_signal());

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
