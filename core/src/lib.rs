//! Client toolkit for JSON APIs that answer with a `{code, message, data}`
//! envelope.
//!
//! # Overview
//! `Envelope` is the uniform response shape: `code == 0` means success.
//! `ApiClient` issues GET/POST/PUT/DELETE calls and always hands back an
//! envelope, folding transport failures, non-2xx statuses, and malformed
//! bodies into an error envelope with code `-1`.
//!
//! # Design
//! - Requests are built and responses parsed as plain data (`HttpRequest`,
//!   `HttpResponse`); a `Transport` performs the round-trip. The default
//!   transport is `reqwest`.
//! - `ApiClient` is stateless apart from its configuration, so concurrent
//!   calls are independent.
//! - `ApiError` keeps the reason a call failed for callers that use the
//!   `try_*` methods instead of the collapsing ones.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod http;
pub mod options;
pub mod transport;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use envelope::{Envelope, EnvelopeError, ERROR_CODE, SUCCESS_CODE, UNKNOWN_ERROR_MESSAGE};
pub use error::ApiError;
pub use form::{FormData, FormValue};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use options::RequestOptions;
pub use transport::{ReqwestTransport, Transport};
