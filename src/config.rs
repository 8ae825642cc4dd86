//! Container configuration.
//!
//! ```toml
//! image_resolver = "fileTypeImage"
//!
//! [transaction]
//! max_retries = 10
//! min_retry_wait_ms = 50
//!
//! [parameters]
//! url_context = "/alfresco"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::transaction::RetryPolicy;

/// Settings for a [`RepositoryContainer`](crate::RepositoryContainer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Retry policy of the bundled transaction helper
    pub transaction: RetryPolicy,
    /// Base parameters handed to every script and template
    pub parameters: BTreeMap<String, String>,
    /// Name of the image resolver exposed to templates
    pub image_resolver: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            transaction: RetryPolicy::default(),
            parameters: BTreeMap::new(),
            image_resolver: "imageresolver".to_string(),
        }
    }
}

impl ContainerConfig {
    /// Parses configuration from a TOML document.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ConfigError::Toml(e).into())
    }
}
