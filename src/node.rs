use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reference to a node in a repository store.
///
/// Rendered as `protocol://identifier/id`, e.g.
/// `workspace://SpacesStore/0e7c1c1b-...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    protocol: String,
    identifier: String,
    id: String,
}

impl NodeRef {
    /// Creates a reference from its three parts.
    pub fn new(
        protocol: impl Into<String>,
        identifier: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            identifier: identifier.into(),
            id: id.into(),
        }
    }

    /// Creates a reference in the default `workspace://SpacesStore` store.
    pub fn in_spaces_store(id: impl Into<String>) -> Self {
        Self::new("workspace", "SpacesStore", id)
    }

    /// Node id within its store.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.protocol, self.identifier, self.id)
    }
}

impl FromStr for NodeRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::WrongType {
            name: s.to_string(),
            expected: "node reference",
        };
        let (protocol, rest) = s.split_once("://").ok_or_else(invalid)?;
        let (identifier, id) = rest.split_once('/').ok_or_else(invalid)?;
        if protocol.is_empty() || identifier.is_empty() || id.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(protocol, identifier, id))
    }
}
