//! The `{code, message, data}` response envelope.
//!
//! # Design
//! A single shape signals success or failure for every endpoint: `code == 0`
//! is success, anything else is an error. `message` and `data` are optional
//! on both paths, but the wire form always carries all three keys so that
//! consumers never have to distinguish "missing" from `null`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ApiError;

/// Code carried by every successful envelope.
pub const SUCCESS_CODE: i64 = 0;

/// Generic failure code used by `Envelope::error`.
pub const ERROR_CODE: i64 = -1;

/// Message handed to error callbacks when the envelope carries none.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Uniform response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T = Value> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// A non-zero envelope turned into an `Err` by `Envelope::into_result`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("envelope code {code}: {message}")]
pub struct EnvelopeError {
    pub code: i64,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: ERROR_CODE,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn error_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            code: ERROR_CODE,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn custom(code: i64, message: Option<String>, data: Option<T>) -> Self {
        Self {
            code,
            message,
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Payload of a successful envelope; `None` on the error path.
    pub fn data(&self) -> Option<&T> {
        if self.is_success() {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn into_data(self) -> Option<T> {
        if self.is_success() {
            self.data
        } else {
            None
        }
    }

    /// Message of a failed envelope; `None` on the success path.
    pub fn error_message(&self) -> Option<&str> {
        if self.is_success() {
            None
        } else {
            self.message.as_deref()
        }
    }

    pub fn into_result(self) -> Result<Option<T>, EnvelopeError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(EnvelopeError {
                code: self.code,
                message: failure_message(self.message),
            })
        }
    }

    pub fn map<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> U,
    {
        Envelope {
            code: self.code,
            message: self.message,
            data: self.data.map(f),
        }
    }
}

impl Envelope<Value> {
    /// Success with an empty object as payload.
    pub fn ok() -> Self {
        Self::success(empty_object())
    }

    /// Envelope with an arbitrary code and an empty object as payload.
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self::custom(code, Some(message.into()), Some(empty_object()))
    }

    /// Dispatch to `on_success` with the payload or to `on_error` with a
    /// non-empty message.
    ///
    /// A success without data, or with `null` data, hands `{}` to
    /// `on_success`.
    pub fn handle<S, E>(self, on_success: S, on_error: E)
    where
        S: FnOnce(Value),
        E: FnOnce(String),
    {
        if self.is_success() {
            let data = match self.data {
                None | Some(Value::Null) => empty_object(),
                Some(value) => value,
            };
            on_success(data);
        } else {
            on_error(failure_message(self.message));
        }
    }

    /// Like `handle`, with failures logged instead of passed to a callback.
    pub fn handle_or_log<S>(self, on_success: S)
    where
        S: FnOnce(Value),
    {
        let code = self.code;
        self.handle(on_success, |message| {
            tracing::error!(code, %message, "API error");
        });
    }

    /// Convert the payload of a successful envelope into `U`.
    ///
    /// Error envelopes keep their code and message but drop their data,
    /// since error payloads rarely share the success schema.
    pub fn decode<U: DeserializeOwned>(self) -> Result<Envelope<U>, ApiError> {
        if !self.is_success() {
            return Ok(Envelope::custom(self.code, self.message, None));
        }
        let data = match self.data {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value(value)
                    .map_err(|e| ApiError::Deserialization(e.to_string()))?,
            ),
        };
        Ok(Envelope::custom(self.code, self.message, data))
    }
}

impl<T> From<ApiError> for Envelope<T> {
    fn from(err: ApiError) -> Self {
        Envelope::error(err.to_string())
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn failure_message(message: Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => m,
        _ => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}
