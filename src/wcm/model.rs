//! Persisted property model of the WCM application.
//!
//! Deployment servers are stored as nodes whose properties are keyed by
//! qualified names in the WCM application model namespace.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Namespace of the WCM application model.
pub const WCMAPP_MODEL_URI: &str = "http://www.alfresco.org/model/wcmappmodel/1.0";

/// A namespace-qualified property name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    namespace: Cow<'static, str>,
    local_name: Cow<'static, str>,
}

impl QName {
    /// Creates a qualified name from static parts.
    pub const fn from_static(namespace: &'static str, local_name: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(namespace),
            local_name: Cow::Borrowed(local_name),
        }
    }

    /// Creates a qualified name from owned parts.
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Cow::Owned(namespace.into()),
            local_name: Cow::Owned(local_name.into()),
        }
    }

    /// Namespace URI.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Local part of the name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local_name)
    }
}

/// Deploy type of the server.
pub const PROP_DEPLOYTYPE: QName = QName::from_static(WCMAPP_MODEL_URI, "deploytype");
/// Server type (`live` or `test`).
pub const PROP_DEPLOYSERVERTYPE: QName = QName::from_static(WCMAPP_MODEL_URI, "deployservertype");
/// Display name.
pub const PROP_DEPLOYSERVERNAME: QName = QName::from_static(WCMAPP_MODEL_URI, "deployservername");
/// Host name.
pub const PROP_DEPLOYSERVERHOST: QName = QName::from_static(WCMAPP_MODEL_URI, "deployserverhost");
/// Port number.
pub const PROP_DEPLOYSERVERPORT: QName = QName::from_static(WCMAPP_MODEL_URI, "deployserverport");
/// Login user name.
pub const PROP_DEPLOYSERVERUSERNAME: QName =
    QName::from_static(WCMAPP_MODEL_URI, "deployserverusername");
/// Login password.
pub const PROP_DEPLOYSERVERPASSWORD: QName =
    QName::from_static(WCMAPP_MODEL_URI, "deployserverpassword");
/// Preview URL.
pub const PROP_DEPLOYSERVERURL: QName = QName::from_static(WCMAPP_MODEL_URI, "deployserverurl");
/// Source path deployed from.
pub const PROP_DEPLOYSOURCEPATH: QName = QName::from_static(WCMAPP_MODEL_URI, "deploysourcepath");
/// Target name on a file system receiver.
pub const PROP_DEPLOYSERVERTARGET: QName =
    QName::from_static(WCMAPP_MODEL_URI, "deployservertarget");
/// Sandbox the server is allocated to.
pub const PROP_DEPLOYSERVERALLOCATEDTO: QName =
    QName::from_static(WCMAPP_MODEL_URI, "deployserverallocatedto");
/// Whether to deploy automatically on workflow approval.
pub const PROP_DEPLOYONAPPROVAL: QName = QName::from_static(WCMAPP_MODEL_URI, "deployonapproval");

/// A persisted property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Text
    Text(String),
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// Property map of a persisted node.
pub type RepoProps = BTreeMap<QName, PropertyValue>;

/// How content reaches the deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployType {
    /// Another repository server
    Alfresco,
    /// A file system receiver
    File,
}

impl DeployType {
    /// The persisted tag.
    pub fn as_str(self) -> &'static str {
        match self {
            DeployType::Alfresco => "alfresco",
            DeployType::File => "file",
        }
    }
}

impl fmt::Display for DeployType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeployType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alfresco" => Ok(DeployType::Alfresco),
            "file" => Ok(DeployType::File),
            _ => Err(ConfigError::WrongType {
                name: s.to_string(),
                expected: "deploy type (alfresco|file)",
            }),
        }
    }
}

/// Role of the deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    /// Serves the published site
    Live,
    /// Used to preview changes
    Test,
}

impl ServerType {
    /// The persisted tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ServerType::Live => "live",
            ServerType::Test => "test",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(ServerType::Live),
            "test" => Ok(ServerType::Test),
            _ => Err(ConfigError::WrongType {
                name: s.to_string(),
                expected: "server type (live|test)",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_displays_in_clark_notation() {
        assert_eq!(
            PROP_DEPLOYTYPE.to_string(),
            "{http://www.alfresco.org/model/wcmappmodel/1.0}deploytype"
        );
    }

    #[test]
    fn static_and_owned_qnames_compare_equal() {
        let owned = QName::new(WCMAPP_MODEL_URI, "deployserverhost");
        assert_eq!(owned, PROP_DEPLOYSERVERHOST);

        let mut props = RepoProps::new();
        props.insert(owned, "example.org".into());
        assert!(props.contains_key(&PROP_DEPLOYSERVERHOST));
    }

    #[test]
    fn tags_parse_and_render() {
        assert_eq!("file".parse::<DeployType>().unwrap(), DeployType::File);
        assert_eq!(DeployType::Alfresco.to_string(), "alfresco");
        assert_eq!("live".parse::<ServerType>().unwrap(), ServerType::Live);
        assert!("staging".parse::<ServerType>().is_err());
        assert!("ftp".parse::<DeployType>().is_err());
    }

    #[test]
    fn property_values_deserialize_untagged() {
        let values: Vec<PropertyValue> = toml::from_str::<toml::Table>(
            r#"
            a = true
            b = 44100
            c = "host"
            "#,
        )
        .unwrap()
        .into_iter()
        .map(|(_, v)| v.try_into().unwrap())
        .collect();
        assert_eq!(
            values,
            vec![
                PropertyValue::Bool(true),
                PropertyValue::Int(44100),
                PropertyValue::Text("host".into()),
            ]
        );
    }
}
