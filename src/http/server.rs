//! HTTP front setup.
//!
//! # Responsibilities
//! - Create the Axum Router standing in for the event-source runtime
//! - `POST` gateway events as JSON to [`INVOKE_PATH`]
//! - Translate every other request into an event and back
//! - Wire up middleware (request ID, tracing, timeout, panic catching)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapter::Adapter;
use crate::config::RelayConfig;
use crate::gateway::GatewayRequest;
use crate::http::request::{to_gateway_event, MakeRequestUuid};
use crate::http::response::{error_response, into_http_response};
use crate::lifecycle::ShutdownSignal;

/// Invocation endpoint, same path a local function-runtime emulator exposes.
pub const INVOKE_PATH: &str = "/2015-03-31/functions/function/invocations";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<Adapter>,
    pub stage: Arc<str>,
    pub max_body_bytes: usize,
}

/// HTTP front for the adapter.
pub struct HttpServer {
    router: Router,
    adapter: Arc<Adapter>,
}

impl HttpServer {
    /// Create a server with a fresh adapter.
    pub fn new(config: RelayConfig) -> Self {
        let adapter = Arc::new(Adapter::new(&config));
        Self::with_adapter(&config, adapter)
    }

    /// Create a server around an existing adapter, e.g. one shared with the
    /// admin router.
    pub fn with_adapter(config: &RelayConfig, adapter: Arc<Adapter>) -> Self {
        let state = AppState {
            adapter: adapter.clone(),
            stage: Arc::from(config.upstream.stage.as_str()),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(config, state);
        Self { router, adapter }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let routes = Router::new()
            .route(INVOKE_PATH, post(invoke_handler))
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state);
        with_middleware(routes, config)
    }

    /// The router, for serving elsewhere or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn adapter(&self) -> Arc<Adapter> {
        self.adapter.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP front starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP front stopped");
        Ok(())
    }
}

/// Wrap `routes` in the front's middleware stack.
///
/// A panic escaping a handler becomes a 500 instead of a dropped connection.
#[allow(deprecated)]
fn with_middleware(routes: Router, config: &RelayConfig) -> Router {
    routes
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.handler_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Handle a gateway event posted as JSON.
async fn invoke_handler(
    State(state): State<AppState>,
    Json(event): Json<GatewayRequest>,
) -> Response {
    match state.adapter.handle_event(event).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handle a plain HTTP request as if a gateway had sent it.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let event = match to_gateway_event(request, &state.stage, state.max_body_bytes).await {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting request");
            return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response();
        }
    };

    match state.adapter.handle_event(event).await {
        Ok(response) => into_http_response(response),
        Err(e) => error_response(&e),
    }
}
