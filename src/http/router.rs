//! Axum router wiring.

use axum::extract::State;
use axum::http::Uri;
use axum::routing::any;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::{handle_request, MetricsResponse};
use crate::models::MetricsStore;
use crate::{DiskBenchError, Result, METRICS_PATH};

pub fn build_router(store: Arc<MetricsStore>) -> Router {
    Router::new()
        .route(METRICS_PATH, any(respond))
        .fallback(respond)
        .with_state(store)
}

async fn respond(State(store): State<Arc<MetricsStore>>, uri: Uri) -> MetricsResponse {
    handle_request(&store, uri.path())
}

/// Serve the router on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, store: Arc<MetricsStore>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(store))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DiskBenchError::ServerError(format!("HTTP server failed: {}", e)))
}
