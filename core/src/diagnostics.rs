//! Injectable sink for per-call diagnostic lines.
//!
//! A client with a sink installed writes one line with the outbound URL
//! before each call and one line with the inbound status and raw body after
//! it. Bodies are not redacted.

use std::fmt;
use std::sync::Arc;

use log::Level;

/// Destination for free-text diagnostic lines.
pub trait DiagnosticSink: Send + Sync {
    fn log(&self, line: &str);
}

/// Handle stored in and returned by `ApiClient::set_diagnostic_logger`.
pub type SharedSink = Arc<dyn DiagnosticSink>;

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        self(line)
    }
}

/// Forwards diagnostic lines to the `log` facade under the
/// `fulfil_core::trace` target.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    level: Level,
}

impl LogSink {
    pub const TARGET: &'static str = "fulfil_core::trace";

    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn shared(level: Level) -> SharedSink {
        Arc::new(Self::new(level))
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl DiagnosticSink for LogSink {
    fn log(&self, line: &str) {
        log::log!(target: Self::TARGET, self.level, "{line}");
    }
}

pub(crate) struct SinkDebug<'a>(pub &'a Option<SharedSink>);

impl fmt::Debug for SinkDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Some(<sink>)"),
            None => f.write_str("None"),
        }
    }
}
