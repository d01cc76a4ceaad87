//! Admin router: inspect settings and invalidate cache entries.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;

use crate::adapter::Adapter;
use crate::config::RelayConfig;
use crate::lifecycle::ShutdownSignal;

use self::auth::admin_auth_middleware;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub adapter: Arc<Adapter>,
    pub api_key: Arc<str>,
    pub stage: Arc<str>,
}

impl AdminState {
    pub fn new(config: &RelayConfig, adapter: Arc<Adapter>) -> Self {
        Self {
            adapter,
            api_key: Arc::from(config.admin.api_key.as_str()),
            stage: Arc::from(config.upstream.stage.as_str()),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache).delete(delete_cache))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin router until `shutdown` fires.
pub async fn run_admin(
    state: AdminState,
    listener: TcpListener,
    shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %listener.local_addr()?, "Admin router starting");
    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown.wait())
        .await
}
