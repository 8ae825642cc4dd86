//! Script descriptions: identity and transaction requirements.
//!
//! A [`Description`] is produced by the script registry when a request is
//! matched to a script. The container reads it to decide which
//! authentication and transaction policy to apply.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Authentication level a script requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredAuthentication {
    /// Runs anonymously; any installed identity is cleared
    None,
    /// Accepts guest callers
    Guest,
    /// Requires a named, non-guest user
    User,
    /// Requires a user holding admin authority
    Admin,
}

impl RequiredAuthentication {
    /// Returns `true` for levels a bare guest cannot satisfy.
    pub fn excludes_guest(self) -> bool {
        matches!(self, RequiredAuthentication::User | RequiredAuthentication::Admin)
    }
}

impl fmt::Display for RequiredAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredAuthentication::None => write!(f, "none"),
            RequiredAuthentication::Guest => write!(f, "guest"),
            RequiredAuthentication::User => write!(f, "user"),
            RequiredAuthentication::Admin => write!(f, "admin"),
        }
    }
}

/// Transaction level a script requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredTransaction {
    /// No transaction boundary
    None,
    /// Join the active transaction or start one
    Required,
    /// Always start a new transaction
    RequiresNew,
}

impl fmt::Display for RequiredTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredTransaction::None => write!(f, "none"),
            RequiredTransaction::Required => write!(f, "required"),
            RequiredTransaction::RequiresNew => write!(f, "requiresnew"),
        }
    }
}

/// Immutable description of a matched script.
///
/// # Examples
///
/// ```
/// use webscript_container::{Description, RequiredAuthentication, RequiredTransaction};
///
/// let desc = Description::from_toml_str(r#"
///     id = "org/example/folder.get"
///     authentication = "user"
///     transaction = "required"
/// "#).unwrap();
///
/// assert_eq!(desc.required_authentication(), RequiredAuthentication::User);
/// assert_eq!(desc.required_transaction(), RequiredTransaction::Required);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    id: String,
    #[serde(rename = "authentication", default = "default_authentication")]
    required_authentication: RequiredAuthentication,
    #[serde(rename = "transaction", default = "default_transaction")]
    required_transaction: RequiredTransaction,
}

fn default_authentication() -> RequiredAuthentication {
    RequiredAuthentication::None
}

fn default_transaction() -> RequiredTransaction {
    RequiredTransaction::None
}

impl Description {
    /// Creates a description with explicit requirements.
    pub fn new(
        id: impl Into<String>,
        required_authentication: RequiredAuthentication,
        required_transaction: RequiredTransaction,
    ) -> Self {
        Self {
            id: id.into(),
            required_authentication,
            required_transaction,
        }
    }

    /// Parses a description document.
    ///
    /// Missing `authentication` and `transaction` keys default to `none`.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ConfigError::Toml(e).into())
    }

    /// Script identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Required authentication level.
    pub fn required_authentication(&self) -> RequiredAuthentication {
        self.required_authentication
    }

    /// Required transaction level.
    pub fn required_transaction(&self) -> RequiredTransaction {
        self.required_transaction
    }
}
