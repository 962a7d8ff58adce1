//! Synchronous JSON API client for tenant-scoped SaaS endpoints.
//!
//! # Overview
//! `ApiClient` sends JSON requests to `https://{tenant}.fulfil.io/{path}`
//! with a static `x-api-key` header and decodes JSON responses into a
//! caller-owned value. Each call blocks until the exchange finishes.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`);
//!   `build_request` produces the exact request a call would send.
//! - All I/O goes through the `Transport` trait. `UreqTransport` is the
//!   default; tests plug in their own.
//! - HTTP status codes are never turned into errors, and a response body
//!   that does not decode is ignored unless strict decoding is configured.
//! - Diagnostics go to the `log` facade and, optionally, to a swappable
//!   `DiagnosticSink`.
//!
//! ```no_run
//! use fulfil_core::{ApiClient, HttpMethod, Model, NO_INPUT};
//!
//! let client = ApiClient::new("acme", "my-api-key");
//! let mut product = Model::default();
//! client.execute(HttpMethod::Get, "api/v2/model/product/1", NO_INPUT, &mut product)?;
//! # Ok::<(), fulfil_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{ApiClient, CONTEXT_PARAM, EMPTY_CONTEXT, NO_INPUT};
pub use config::{ClientConfig, DEFAULT_DOMAIN, DEFAULT_USER_AGENT};
pub use diagnostics::{DiagnosticSink, LogSink, SharedSink};
pub use error::{ApiError, BoxError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Model, Report};
