//! Parameters the container exposes to scripts and templates.

use std::collections::BTreeMap;

use crate::node::NodeRef;

/// Key of the repository root node.
pub const KEY_ROOT_HOME: &str = "roothome";
/// Key of the company home folder.
pub const KEY_COMPANY_HOME: &str = "companyhome";
/// Key of the current person node.
pub const KEY_PERSON: &str = "person";
/// Key of the current user's home folder.
pub const KEY_USER_HOME: &str = "userhome";
/// Key of the template image resolver.
pub const KEY_IMAGE_RESOLVER: &str = "imageresolver";

/// A value in a script or template parameter map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Plain text
    Text(String),
    /// A repository node
    Node(NodeRef),
}

impl ParamValue {
    /// The node reference, if this value is a node.
    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            ParamValue::Node(node) => Some(node),
            ParamValue::Text(_) => None,
        }
    }

    /// The text, if this value is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(text) => Some(text),
            ParamValue::Node(_) => None,
        }
    }
}

impl From<NodeRef> for ParamValue {
    fn from(node: NodeRef) -> Self {
        ParamValue::Node(node)
    }
}

impl From<String> for ParamValue {
    fn from(text: String) -> Self {
        ParamValue::Text(text)
    }
}

impl From<&str> for ParamValue {
    fn from(text: &str) -> Self {
        ParamValue::Text(text.to_string())
    }
}

/// Named values made available to a script or template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptParameters {
    values: BTreeMap<String, ParamValue>,
}

impl ScriptParameters {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Returns the node stored under `key`.
    pub fn node(&self, key: &str) -> Option<&NodeRef> {
        self.get(key).and_then(ParamValue::as_node)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
