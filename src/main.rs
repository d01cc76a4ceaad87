//! Stage-prefix forwarding adapter.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────────┐
//!                      │                      STAGE RELAY                      │
//!   Gateway event      │  ┌──────────┐   ┌────────────┐   ┌──────────────┐     │
//!   or HTTP request ───┼─▶│  http    │──▶│ directives │──▶│    cache     │─hit─┼──▶
//!                      │  │  front   │   │ proxy/port │   │   lookup     │     │
//!                      │  └──────────┘   └────────────┘   └──────┬───────┘     │
//!                      │                                     miss │             │
//!                      │                                          ▼             │
//!                      │  ┌──────────┐   ┌────────────┐   ┌──────────────┐     │   forward   ┌────────┐
//!   Gateway response ◀─┼──│  cache   │◀──│  rewrite   │◀──│   upstream   │◀────┼──  proxy ◀──│ origin │
//!                      │  │  store   │   │ Location,  │   │  forwarder   │     │             └────────┘
//!                      │  └──────────┘   │ paths, b64 │   └──────────────┘     │
//!                      │                 └────────────┘                        │
//!                      └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use stage_relay::adapter::Adapter;
use stage_relay::admin::{run_admin, AdminState};
use stage_relay::config::load_config;
use stage_relay::http::HttpServer;
use stage_relay::lifecycle::{spawn_signal_listener, Shutdown};
use stage_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "stage-relay")]
#[command(about = "Relay gateway requests to an origin through a forward proxy", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "STAGE_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the front's bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    let mut config = loaded.config;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("stage-relay v{} starting", env!("CARGO_PKG_VERSION"));
    for var in &loaded.env_overrides {
        tracing::info!(variable = %var, "Setting taken from environment");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_url = %config.upstream.base_url,
        proxy_url = %config.upstream.proxy_url,
        stage = %config.upstream.stage,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let adapter = Arc::new(Adapter::new(&config));

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(&config, adapter.clone());
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = run_admin(state, listener, admin_shutdown).await {
                tracing::error!(error = %e, "Admin router failed");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::with_adapter(&config, adapter);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
