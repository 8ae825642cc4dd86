//! Typed properties of a deployment server.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::secret::Secret;
use crate::wcm::model::{DeployType, PropertyValue, ServerType};

/// Named property: server type.
pub const PROP_TYPE: &str = "type";
/// Named property: display name.
pub const PROP_NAME: &str = "name";
/// Named property: host.
pub const PROP_HOST: &str = "host";
/// Named property: port.
pub const PROP_PORT: &str = "port";
/// Named property: user name.
pub const PROP_USER: &str = "username";
/// Named property: password.
pub const PROP_PASSWORD: &str = "password";
/// Named property: preview URL.
pub const PROP_URL: &str = "url";
/// Named property: source path.
pub const PROP_SOURCE_PATH: &str = "sourcePath";
/// Named property: file system receiver target.
pub const PROP_TARGET_NAME: &str = "targetName";
/// Named property: allocated sandbox.
pub const PROP_ALLOCATED_TO: &str = "allocatedTo";
/// Named property: deploy on approval.
pub const PROP_ON_APPROVAL: &str = "onApproval";

/// Returns `true` if the target name is persisted for `deploy_type`.
///
/// Only file system receivers have named targets.
pub fn persists_target_name(deploy_type: DeployType) -> bool {
    deploy_type == DeployType::File
}

/// Returns `true` if the approval flag is persisted for `server_type`.
///
/// Only live servers are deployed to on approval.
pub fn persists_on_approval(server_type: Option<ServerType>) -> bool {
    server_type == Some(ServerType::Live)
}

/// Returns the value if present and non-empty.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Properties of a deployment server.
///
/// The password is held as a [`Secret`] so it never appears in `Debug`
/// output.
#[derive(Debug, Default)]
pub struct ServerProperties {
    /// Server role
    pub server_type: Option<ServerType>,
    /// Display name
    pub name: Option<String>,
    /// Host name
    pub host: Option<String>,
    /// Port number
    pub port: Option<u16>,
    /// Login user name
    pub username: Option<String>,
    /// Login password
    pub password: Option<Secret<String>>,
    /// Preview URL
    pub url: Option<String>,
    /// Source path deployed from
    pub source_path: Option<String>,
    /// File system receiver target
    pub target_name: Option<String>,
    /// Sandbox the server is allocated to
    pub allocated_to: Option<String>,
    /// Deploy automatically on approval
    pub on_approval: Option<bool>,
}

impl ServerProperties {
    /// Builds properties from the open, name-keyed form used by editors.
    ///
    /// Unknown names are ignored. Empty strings are kept; they are dropped
    /// when projecting to persisted properties. An empty port is treated as
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WrongType`] when a value has the wrong type,
    /// or [`ConfigError::InvalidPort`] for a non-numeric port.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use webscript_container::wcm::{PropertyValue, ServerProperties, ServerType};
    ///
    /// let mut form = BTreeMap::new();
    /// form.insert("type".to_string(), PropertyValue::from("live"));
    /// form.insert("host".to_string(), PropertyValue::from("deploy.example.org"));
    /// form.insert("port".to_string(), PropertyValue::from("44100"));
    ///
    /// let props = ServerProperties::from_named(&form).unwrap();
    /// assert_eq!(props.server_type, Some(ServerType::Live));
    /// assert_eq!(props.port, Some(44100));
    /// ```
    pub fn from_named(named: &BTreeMap<String, PropertyValue>) -> Result<Self, ConfigError> {
        let text = |key: &str| -> Result<Option<String>, ConfigError> {
            match named.get(key) {
                None => Ok(None),
                Some(PropertyValue::Text(s)) => Ok(Some(s.clone())),
                Some(_) => Err(ConfigError::WrongType {
                    name: key.to_string(),
                    expected: "text",
                }),
            }
        };

        let server_type = match non_empty(text(PROP_TYPE)?.as_deref()) {
            Some(tag) => Some(tag.parse::<ServerType>()?),
            None => None,
        };

        let port = match named.get(PROP_PORT) {
            None => None,
            Some(PropertyValue::Text(s)) if s.is_empty() => None,
            Some(PropertyValue::Text(s)) => Some(parse_port(s)?),
            Some(PropertyValue::Int(n)) => Some(port_from_int(*n)?),
            Some(PropertyValue::Bool(_)) => {
                return Err(ConfigError::WrongType {
                    name: PROP_PORT.to_string(),
                    expected: "port number",
                })
            }
        };

        let on_approval = match named.get(PROP_ON_APPROVAL) {
            None => None,
            Some(PropertyValue::Bool(b)) => Some(*b),
            Some(PropertyValue::Text(s)) if s == "true" || s == "false" => Some(s == "true"),
            Some(_) => {
                return Err(ConfigError::WrongType {
                    name: PROP_ON_APPROVAL.to_string(),
                    expected: "boolean",
                })
            }
        };

        Ok(Self {
            server_type,
            name: text(PROP_NAME)?,
            host: text(PROP_HOST)?,
            port,
            username: text(PROP_USER)?,
            password: text(PROP_PASSWORD)?.map(Secret::new),
            url: text(PROP_URL)?,
            source_path: text(PROP_SOURCE_PATH)?,
            target_name: text(PROP_TARGET_NAME)?,
            allocated_to: text(PROP_ALLOCATED_TO)?,
            on_approval,
        })
    }

    /// Renders the properties in their open, name-keyed form.
    ///
    /// The port is rendered as text, as editors expect. Absent properties
    /// are omitted.
    pub fn to_named(&self) -> BTreeMap<String, PropertyValue> {
        let mut named = BTreeMap::new();
        let mut put = |key: &str, value: Option<PropertyValue>| {
            if let Some(value) = value {
                named.insert(key.to_string(), value);
            }
        };

        put(PROP_TYPE, self.server_type.map(|t| t.as_str().into()));
        put(PROP_NAME, self.name.clone().map(Into::into));
        put(PROP_HOST, self.host.clone().map(Into::into));
        put(PROP_PORT, self.port.map(|p| p.to_string().into()));
        put(PROP_USER, self.username.clone().map(Into::into));
        put(
            PROP_PASSWORD,
            self.password.as_ref().map(|p| p.expose_secret().clone().into()),
        );
        put(PROP_URL, self.url.clone().map(Into::into));
        put(PROP_SOURCE_PATH, self.source_path.clone().map(Into::into));
        put(PROP_TARGET_NAME, self.target_name.clone().map(Into::into));
        put(PROP_ALLOCATED_TO, self.allocated_to.clone().map(Into::into));
        put(PROP_ON_APPROVAL, self.on_approval.map(Into::into));
        named
    }
}

pub(crate) fn parse_port(s: &str) -> Result<u16, ConfigError> {
    s.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(s.to_string()))
}

pub(crate) fn port_from_int(n: i64) -> Result<u16, ConfigError> {
    u16::try_from(n).map_err(|_| ConfigError::InvalidPort(n.to_string()))
}
