//! Per-client configuration.
//!
//! Everything is passed programmatically; nothing is read from the
//! environment. A `ClientConfig` is moved into the client at construction
//! and never changes afterwards.

use std::fmt;
use std::time::Duration;

/// Provider domain every tenant subdomain lives under.
pub const DEFAULT_DOMAIN: &str = "fulfil.io";

/// User-Agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("fulfil-core/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct ClientConfig {
    subdomain: String,
    api_key: String,
    domain: String,
    user_agent: String,
    timeout: Option<Duration>,
    strict_decoding: bool,
}

impl ClientConfig {
    pub fn new(subdomain: &str, api_key: &str) -> Self {
        Self {
            subdomain: subdomain.to_string(),
            api_key: api_key.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            strict_decoding: false,
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Bound every call by `timeout`. Without one a hung server blocks the
    /// caller indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Report undecodable response bodies as `ApiError::DeserializationError`
    /// instead of ignoring them.
    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// The raw key. Only meant for the `x-api-key` header.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn strict_decoding(&self) -> bool {
        self.strict_decoding
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("subdomain", &self.subdomain)
            .field("api_key", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("strict_decoding", &self.strict_decoding)
            .finish()
    }
}
