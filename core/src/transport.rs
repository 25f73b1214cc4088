//! Executes `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only I/O seam in the crate. `ReqwestTransport` is the
//! production implementation; tests can substitute an in-memory one to
//! exercise `ApiClient` without a socket.

use std::future::Future;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::form::{FormData, FormValue};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// Performs one HTTP round-trip.
///
/// Non-2xx responses are returned as `Ok`; only failures to obtain a
/// response at all are errors.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// Async transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.body(body),
            Some(RequestBody::Form(form)) => builder.multipart(multipart(form)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn multipart(form: FormData) -> Result<Form, ApiError> {
    let mut out = Form::new();
    for (name, value) in form.iter() {
        out = match value {
            FormValue::Text(text) => out.text(name.to_string(), text.clone()),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mut part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = content_type {
                    part = part.mime_str(mime)?;
                }
                out.part(name.to_string(), part)
            }
        };
    }
    Ok(out)
}
