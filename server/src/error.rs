//! Failures that map to an HTTP status plus an error envelope.
//!
//! # Design
//! Business-rule failures (blank fields, duplicates) are answered with HTTP
//! 200 and a non-zero envelope code by the handlers themselves. `AppError`
//! covers the cases where the request cannot be served at all, and panics
//! are handled separately by `with_error_handling`.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use envelope_core::Envelope;
use serde_json::Value;
use thiserror::Error;

/// Message returned for unhandled failures when debug mode is off.
pub const GENERIC_FAILURE_MESSAGE: &str = "internal server error, please retry later";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    UnprocessableEntity(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(%status, error = %self, "request rejected");
        (status, Json(Envelope::<Value>::error(self.to_string()))).into_response()
    }
}

/// Turn a handler panic into a 500 error envelope.
///
/// The panic message reaches the client only in debug mode; it is always
/// logged.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>, debug: bool) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "unhandled failure in handler");

    let message = if debug {
        detail
    } else {
        GENERIC_FAILURE_MESSAGE.to_string()
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::<Value>::error(message)),
    )
        .into_response()
}
