//! Tenant-scoped JSON API client.
//!
//! # Design
//! `ApiClient` owns an immutable `ClientConfig`, a `Transport`, and an
//! optional diagnostic sink behind a mutex. Every call runs the same linear
//! pipeline: compose the URL, serialize the input, build the request, send
//! it, read the body, report it to the sink, then decode into the caller's
//! output. The first failure short-circuits. Status codes are never
//! inspected, and by default a body that does not decode leaves the output
//! untouched without raising an error.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::diagnostics::{SharedSink, SinkDebug};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Query parameter attached to every request.
pub const CONTEXT_PARAM: &str = "context";

/// Value of the `context` query parameter; always an empty JSON object.
pub const EMPTY_CONTEXT: &str = "{}";

/// Pass as `input` when a call has no request body.
pub const NO_INPUT: Option<&()> = None;

pub struct ApiClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
    diagnostics: Mutex<Option<SharedSink>>,
}

impl ApiClient<UreqTransport> {
    /// Client for `https://{subdomain}.fulfil.io` with default settings.
    pub fn new(subdomain: &str, api_key: &str) -> Self {
        Self::from_config(ClientConfig::new(subdomain, api_key))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            diagnostics: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Install `sink` (or remove it with `None`) and hand back the previous
    /// one so the caller can restore it later.
    pub fn set_diagnostic_logger(&self, sink: Option<SharedSink>) -> Option<SharedSink> {
        let mut slot = self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, sink)
    }

    fn diagnostic_logger(&self) -> Option<SharedSink> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `https://{subdomain}.{domain}/{path}`, with `path` appended verbatim.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "https://{}.{}/{}",
            self.config.subdomain(),
            self.config.domain(),
            path
        )
    }

    /// Build the outbound request without sending it.
    pub fn build_request<I>(
        &self,
        method: HttpMethod,
        path: &str,
        input: Option<&I>,
    ) -> Result<HttpRequest, ApiError>
    where
        I: Serialize + ?Sized,
    {
        let body = input
            .map(|value| serde_json::to_string(value))
            .transpose()
            .map_err(ApiError::SerializationError)?;

        let mut url = Url::parse(&self.endpoint(path))
            .map_err(|e| ApiError::RequestConstructionError(Box::new(e)))?;
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != CONTEXT_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &retained {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(CONTEXT_PARAM, EMPTY_CONTEXT);
        }

        let user_agent = header_value("User-Agent", self.config.user_agent())?;
        let api_key = header_value("x-api-key", self.config.api_key())?;
        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), user_agent),
            ("x-api-key".to_string(), api_key),
            ("Connection".to_string(), "close".to_string()),
        ];

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Send a request and decode the JSON response into `output`.
    ///
    /// `output` is replaced only if the body decodes. An empty body, a
    /// non-JSON body or a body of the wrong shape leaves it as it was and
    /// still returns `Ok(())`, unless the client was configured with
    /// `ClientConfig::with_strict_decoding`. Any HTTP status counts as a
    /// completed exchange.
    ///
    /// # Errors
    /// `SerializationError` or `RequestConstructionError` before anything is
    /// sent; `TransportError` or `ResponseReadError` from the exchange.
    pub fn execute<I, O>(
        &self,
        method: HttpMethod,
        path: &str,
        input: Option<&I>,
        output: &mut O,
    ) -> Result<(), ApiError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let response = self.exchange(method, path, input)?;
        self.decode_into(&response.body, output)
    }

    /// Same request and pipeline as [`ApiClient::execute`].
    pub fn refresh_context<I, O>(
        &self,
        method: HttpMethod,
        path: &str,
        input: Option<&I>,
        output: &mut O,
    ) -> Result<(), ApiError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.execute(method, path, input, output)
    }

    /// Run the pipeline but return the raw response instead of decoding it.
    pub fn execute_raw<I>(
        &self,
        method: HttpMethod,
        path: &str,
        input: Option<&I>,
    ) -> Result<HttpResponse, ApiError>
    where
        I: Serialize + ?Sized,
    {
        self.exchange(method, path, input)
    }

    fn exchange<I>(
        &self,
        method: HttpMethod,
        path: &str,
        input: Option<&I>,
    ) -> Result<HttpResponse, ApiError>
    where
        I: Serialize + ?Sized,
    {
        // Snapshot once so a concurrent swap cannot split a call across sinks.
        let sink = self.diagnostic_logger();

        let endpoint = self.endpoint(path);
        debug!("request endpoint: {method} {endpoint}");
        if let Some(sink) = &sink {
            sink.log(&format!("Request Endpoint: {endpoint}"));
        }

        let request = self.build_request(method, path, input)?;
        let response = self.transport.send(&request)?;

        debug!("response status: {}", response.status_line());
        trace!("response body: {}", response.body);
        if let Some(sink) = &sink {
            sink.log(&format!(
                "response: status={:?}, body={:?}",
                response.status_line(),
                response.body
            ));
        }

        Ok(response)
    }

    fn decode_into<O: DeserializeOwned>(&self, body: &str, output: &mut O) -> Result<(), ApiError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<O>(body) {
            Ok(decoded) => {
                *output = decoded;
                Ok(())
            }
            Err(e) if self.config.strict_decoding() => Err(ApiError::DeserializationError(e)),
            Err(e) => {
                debug!("response body not decoded, output left unchanged: {e}");
                Ok(())
            }
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<String, ApiError> {
    ureq::http::HeaderValue::from_str(value)
        .map(|_| value.to_string())
        .map_err(|e| ApiError::construction(format!("invalid {name} header value: {e}")))
}

impl<T: fmt::Debug> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .field("diagnostics", &SinkDebug(&*sink))
            .finish()
    }
}
