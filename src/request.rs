use std::sync::Arc;

use crate::script::WebScript;

/// The script a request was routed to, together with the matched path.
#[derive(Clone)]
pub struct ServiceMatch {
    path: String,
    script: Arc<dyn WebScript>,
}

impl ServiceMatch {
    /// Creates a match for `script` at `path`.
    pub fn new(path: impl Into<String>, script: Arc<dyn WebScript>) -> Self {
        Self {
            path: path.into(),
            script,
        }
    }

    /// The matched script.
    pub fn web_script(&self) -> &Arc<dyn WebScript> {
        &self.script
    }
}

impl std::fmt::Debug for ServiceMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMatch")
            .field("path", &self.path)
            .field("script", &self.script.description().id())
            .finish()
    }
}

/// An inbound script invocation as handed over by the router.
///
/// Contains the request identifier, the guest flag and the matched script.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    /// Unique identifier for this request
    pub request_id: String,
    /// Whether the caller asked to run as guest
    pub guest: bool,
    service_match: ServiceMatch,
}

impl ScriptRequest {
    /// Creates a non-guest request.
    pub fn new(request_id: impl Into<String>, service_match: ServiceMatch) -> Self {
        Self {
            request_id: request_id.into(),
            guest: false,
            service_match,
        }
    }

    /// Marks the request as a guest invocation.
    pub fn as_guest(mut self) -> Self {
        self.guest = true;
        self
    }

    /// Returns `true` for guest invocations.
    pub fn is_guest(&self) -> bool {
        self.guest
    }

    /// The routing result for this request.
    pub fn service_match(&self) -> &ServiceMatch {
        &self.service_match
    }
}
