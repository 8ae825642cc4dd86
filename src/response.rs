//! Response sinks scripts write their output to.

use std::io::Write;

/// Destination for a script's output.
pub trait ScriptResponse {
    /// Sets the HTTP-style status of the response.
    fn set_status(&mut self, status: u16);

    /// Writer for the response body.
    fn writer(&mut self) -> &mut dyn Write;

    /// Discards output written by a failed attempt before it is retried.
    fn reset(&mut self) {}
}

/// In-memory response that collects the body into a buffer.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use webscript_container::{BufferedResponse, ScriptResponse};
///
/// let mut res = BufferedResponse::new();
/// write!(res.writer(), "hello").unwrap();
/// assert_eq!(res.body_str(), "hello");
/// assert_eq!(res.status(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    status: u16,
    body: Vec<u8>,
}

impl BufferedResponse {
    /// Creates an empty `200` response.
    pub fn new() -> Self {
        Self {
            status: 200,
            body: Vec::new(),
        }
    }

    /// Current status.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptResponse for BufferedResponse {
    fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.body
    }

    fn reset(&mut self) {
        self.body.clear();
        self.status = 200;
    }
}
