//! axum service that answers every request with a `{code, message, data}`
//! envelope.
//!
//! # Design
//! - Handlers return `Json<Envelope<_>>` for anything the server could
//!   process, using a non-zero code for business failures.
//! - `AppError` maps unservable requests to an HTTP status plus an error
//!   envelope.
//! - `with_error_handling` adds envelope fallbacks for unknown routes and
//!   unsupported methods, a panic catcher, and request tracing. Apply it after all routes are
//!   registered; routes added later are not covered.

pub mod config;
pub mod error;
pub mod payload;
pub mod wallets;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use envelope_core::Envelope;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{AppError, GENERIC_FAILURE_MESSAGE};
pub use payload::Payload;
pub use wallets::{Db, Wallet, DUPLICATE_ADDRESS};

/// Routes without the error layer.
pub fn routes() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/wallets",
            get(wallets::list_wallets).post(wallets::create_wallet),
        )
        .route(
            "/api/wallets/{id}",
            get(wallets::get_wallet)
                .put(wallets::update_wallet)
                .delete(wallets::delete_wallet),
        )
        .with_state(db)
}

pub fn with_error_handling(router: Router, debug: bool) -> Router {
    router
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(
            move |payload: Box<dyn Any + Send + 'static>| error::panic_response(payload, debug),
        ))
        .layer(TraceLayer::new_for_http())
}

pub fn app(config: &ServerConfig) -> Router {
    with_error_handling(routes(), config.debug)
}

pub async fn run(listener: TcpListener, config: &ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

async fn health() -> Json<Envelope<Value>> {
    Json(Envelope::success(json!({"status": "ok"})))
}

async fn route_not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(format!("method {method} not allowed"))
}
