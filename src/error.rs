use std::fmt;

/// HTTP status reported for authentication failures.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Errors that can occur while executing a web script or mapping configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller does not hold the identity level the script requires.
    #[error("Unauthorized: {0}")]
    Unauthorized(Violation),

    /// I/O failure raised while the script wrote its response.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The transaction executor gave up or could not run the work.
    #[error("Transaction failed: {0}")]
    Transaction(#[from] TransactionError),

    /// The script reported a failure of its own.
    #[error("Script failed: {0}")]
    Script(String),

    /// Configuration could not be read or mapped.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the HTTP-style status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized(v) => Some(v.status()),
            _ => None,
        }
    }

    /// Returns `true` if the transaction executor may retry this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transaction(TransactionError::Conflict(_)))
    }
}

impl From<Violation> for Error {
    fn from(v: Violation) -> Self {
        Error::Unauthorized(v)
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An authentication violation naming the script that refused the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The kind of violation that occurred
    pub kind: ViolationKind,
    /// Identifier of the script that was refused
    pub script_id: String,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl Violation {
    /// Creates the violation raised when a guest calls a script that
    /// requires user or admin authentication.
    pub fn guest_denied(script_id: impl Into<String>) -> Self {
        let script_id = script_id.into();
        let message = format!(
            "Web Script {} requires user authentication; however, a guest has attempted access.",
            script_id
        );
        Self {
            kind: ViolationKind::GuestDenied,
            script_id,
            message,
        }
    }

    /// Creates the violation raised when a non-admin calls an admin script.
    pub fn admin_required(script_id: impl Into<String>) -> Self {
        let script_id = script_id.into();
        let message = format!(
            "Web Script {} requires admin authentication; \
             however, a non-admin has attempted access.",
            script_id
        );
        Self {
            kind: ViolationKind::AdminRequired,
            script_id,
            message,
        }
    }

    /// HTTP status for this violation.
    pub fn status(&self) -> u16 {
        STATUS_UNAUTHORIZED
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.status(), self.message)
    }
}

impl std::error::Error for Violation {}

/// The kind of authentication violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A guest called a script requiring user or admin authentication
    GuestDenied,
    /// A non-admin called a script requiring admin authentication
    AdminRequired,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::GuestDenied => write!(f, "Guest denied"),
            ViolationKind::AdminRequired => write!(f, "Admin required"),
        }
    }
}

/// Failures surfaced by a transaction executor.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Optimistic concurrency conflict; the work may be retried.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// All attempts failed with retryable errors.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The error raised by the final attempt
        last: String,
    },
}

/// Failures raised while loading or mapping configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML input could not be parsed.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A container collaborator was not supplied to the builder.
    #[error("missing container dependency: {0}")]
    MissingDependency(&'static str),

    /// A persisted property is absent.
    #[error("missing property: {0}")]
    MissingProperty(String),

    /// A persisted or named property holds a value of the wrong type.
    #[error("property {name} has wrong type, expected {expected}")]
    WrongType {
        /// The offending property
        name: String,
        /// The type that was expected
        expected: &'static str,
    },

    /// The port property is not a valid number.
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}
