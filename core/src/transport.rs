//! Executes `HttpRequest` values over the network.
//!
//! # Design
//! `Transport` is the only place I/O happens. `ApiClient` is generic over
//! it so tests can count or script exchanges without a socket, while
//! `UreqTransport` does the real blocking round-trip.

use std::time::Duration;

use log::trace;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Sends one request and returns the full response.
///
/// Implementations must map connect/write/header failures to
/// `ApiError::TransportError` and body read failures to
/// `ApiError::ResponseReadError`. Status codes are data, not errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// Blocking HTTPS transport backed by ureq.
///
/// A fresh agent is built for every call, so no connection outlives the
/// request that opened it. Response bodies are read in full with no size
/// limit.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent();
        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => send_without_body(with_headers(agent.get(url), headers), body),
            HttpMethod::Delete => send_without_body(with_headers(agent.delete(url), headers), body),
            HttpMethod::Head => send_without_body(with_headers(agent.head(url), headers), body),
            HttpMethod::Options => {
                send_without_body(with_headers(agent.options(url), headers), body)
            }
            HttpMethod::Post => send_with_body(with_headers(agent.post(url), headers), body),
            HttpMethod::Put => send_with_body(with_headers(agent.put(url), headers), body),
            HttpMethod::Patch => send_with_body(with_headers(agent.patch(url), headers), body),
        };
        let mut response = result.map_err(|e| ApiError::TransportError(Box::new(e)))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::ResponseReadError(Box::new(e)))?;
        // Bytes that are not UTF-8 are replaced, not rejected; such a body
        // is simply not JSON.
        let body = String::from_utf8_lossy(&bytes).into_owned();
        trace!("{} {} -> {} ({} bytes)", request.method, request.url, status, bytes.len());

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// GET, DELETE, HEAD and OPTIONS still send a body when the caller gave one.
fn send_without_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
