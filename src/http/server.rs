//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create the Axum router with the demo routes
//! - Wire up middleware (tracing, whole-request timeout)
//! - Hand every request to the dispatcher and await its continuation
//! - Serve the load snapshot at `/status`
//! - Graceful shutdown on signal

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::DispatchConfig;
use crate::dispatch::{DispatchRequest, Dispatcher, Operation};
use crate::http::response;
use crate::observability::metrics;
use crate::transport::{FetchParams, FileReadParams};
use crate::work::keyderive::KeyDeriveParams;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the dispatch service.
pub struct HttpServer {
    router: Router,
    config: DispatchConfig,
}

impl HttpServer {
    /// Create a new HTTP server around an existing dispatcher.
    pub fn new(config: DispatchConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState { dispatcher };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &DispatchConfig, state: AppState) -> Router {
        Router::new()
            .route("/fast", get(fast_handler))
            .route("/cpu/derive", get(derive_handler))
            .route("/io/fetch", get(fetch_handler))
            .route("/io/file", get(file_handler))
            .route("/status", get(status_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }
}

/// Submit one operation and await its terminal result.
async fn dispatch(state: AppState, operation: Operation) -> Response {
    let start = Instant::now();
    let request = DispatchRequest::new(operation);
    let id = request.id;
    let class = request.class();

    let receiver = match state.dispatcher.submit(request) {
        Ok(rx) => rx,
        Err(err) => {
            tracing::warn!(request_id = %id, class = class.as_str(), error = %err, "Request rejected");
            metrics::record_rejected(class.as_str(), err.kind());
            return response::error(id, &err);
        }
    };

    match receiver.await {
        Ok(Ok(body)) => {
            metrics::record_dispatch(class.as_str(), 200, start);
            response::success(id, body)
        }
        Ok(Err(err)) => {
            tracing::warn!(request_id = %id, class = class.as_str(), error = %err, "Request failed");
            metrics::record_dispatch(class.as_str(), response::status_for(&err).as_u16(), start);
            response::error(id, &err)
        }
        // Sender dropped without a result: only possible during teardown.
        Err(_) => {
            tracing::error!(request_id = %id, "Continuation dropped without delivery");
            let err = crate::dispatch::DispatchError::TaskFault("dispatcher unavailable".into());
            response::error(id, &err)
        }
    }
}

async fn fast_handler(State(state): State<AppState>) -> Response {
    dispatch(state, Operation::Fast).await
}

#[derive(Debug, Deserialize)]
struct DeriveQuery {
    password: Option<String>,
    salt: Option<String>,
    iterations: Option<u32>,
    length: Option<usize>,
}

async fn derive_handler(
    State(state): State<AppState>,
    Query(query): Query<DeriveQuery>,
) -> Response {
    let defaults = KeyDeriveParams::default();
    let params = KeyDeriveParams {
        password: query.password.unwrap_or(defaults.password),
        salt: query.salt.unwrap_or(defaults.salt),
        iterations: query.iterations.unwrap_or(defaults.iterations),
        length: query.length.unwrap_or(defaults.length),
    };
    dispatch(state, Operation::DeriveKey(params)).await
}

#[derive(Debug, Deserialize)]
struct FetchQuery {
    url: String,
}

async fn fetch_handler(
    State(state): State<AppState>,
    Query(query): Query<FetchQuery>,
) -> Response {
    dispatch(state, Operation::FetchUrl(FetchParams { url: query.url })).await
}

#[derive(Debug, Deserialize)]
struct FileQuery {
    name: String,
}

async fn file_handler(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Response {
    dispatch(state, Operation::ReadFile(FileReadParams { name: query.name })).await
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.dispatcher.status();
    metrics::record_pool_gauges(status.queued_tasks, status.in_flight_tasks);
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "pool_size": status.pool_size,
        "queue_depth": status.queue_depth,
        "queued_tasks": status.queued_tasks,
        "in_flight_tasks": status.in_flight_tasks,
        "pending_operations": status.pending_operations,
    }))
}
