//! Request-scoped structured logging.

use std::fmt;

/// Request-scoped logger for a single script invocation.
///
/// Every event carries the request id and the script id so that the
/// authentication and transaction decisions of one invocation can be
/// correlated.
#[derive(Debug, Clone, Copy)]
pub struct ScriptLog<'a> {
    request_id: &'a str,
    script_id: &'a str,
}

impl<'a> ScriptLog<'a> {
    /// Creates a logger for `script_id` handling `request_id`.
    pub fn new(request_id: &'a str, script_id: &'a str) -> Self {
        Self {
            request_id,
            script_id,
        }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Returns the script ID associated with this logger.
    pub fn script_id(&self) -> &str {
        self.script_id
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, script_id = %self.script_id, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, script_id = %self.script_id, "{}", args);
    }
}
