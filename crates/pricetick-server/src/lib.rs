//! # pricetick-server
//!
//! HTTP relay in front of a [`PriceSource`]. Every client shares one
//! cache, so any number of pollers costs the upstream at most one request
//! per TTL window.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pricetick_core::{PriceFeed, PriceSource, TickerError};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Path of the quote endpoint.
pub const PRICE_PATH: &str = "/api/price";

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Shared source type served by the relay.
pub type SharedSource = Arc<PriceSource<Box<dyn PriceFeed>>>;

/// Router state.
#[derive(Clone)]
pub struct AppState {
    source: SharedSource,
}

impl AppState {
    #[must_use]
    pub fn new(source: SharedSource) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn source(&self) -> &SharedSource {
        &self.source
    }
}

/// Build the relay router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PRICE_PATH, get(price_handler))
        .route(HEALTH_PATH, get(|| async { "ok" }))
        .with_state(state)
}

async fn price_handler(State(state): State<AppState>) -> Response {
    let source = Arc::clone(&state.source);
    // PriceSource::get blocks on the upstream call.
    match tokio::task::spawn_blocking(move || source.get()).await {
        Ok(Ok(quote)) => Json(quote).into_response(),
        Ok(Err(err)) => {
            warn!(error = %err, "price request failed");
            error_response(format!("Failed to fetch {} price", state.source.symbol()))
        }
        Err(err) => {
            error!(error = %err, "price task aborted");
            error_response("Internal error".to_string())
        }
    }
}

fn error_response(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_listener<S>(
    listener: TcpListener,
    state: AppState,
    shutdown: S,
) -> Result<(), TickerError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, symbol = state.source.symbol(), "relay listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("relay stopped");
    Ok(())
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), TickerError> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for Ctrl+C");
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
