//! Per-call request options.

use std::time::Duration;

/// Overrides applied to a single call.
///
/// Headers set here replace same-named client defaults (names compare
/// case-insensitively), including the JSON content type. Defaults whose
/// names are not overridden are kept: passing any per-call header does not
/// drop the JSON content type, unlike spreading a whole options object over
/// the defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Layer `overrides` on top of `headers`, replacing entries with the same
/// name and appending the rest.
pub(crate) fn merge_headers(headers: &mut Vec<(String, String)>, overrides: &[(String, String)]) {
    for (name, value) in overrides {
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }
}
