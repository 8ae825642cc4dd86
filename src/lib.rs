//! Execution gate for repository web scripts.
//!
//! This crate decides, for every script invocation, which identity the script
//! runs under and which transaction wraps it:
//! - **Authentication**: anonymous scripts run with the identity cleared;
//!   guests are refused user/admin scripts; admin scripts require admin
//!   authority
//! - **Identity restoration**: authenticated invocations always leave the
//!   caller's identity exactly as they found it
//! - **Transactions**: scripts run without a transaction, in a joined or new
//!   transaction, or in a forced new read-write transaction
//!
//! It also carries the WCM deployment server configuration record in
//! [`wcm`].
//!
//! # Core Types
//!
//! - [`RepositoryContainer`]: executes scripts under their required policy
//! - [`IdentityContext`]: the request-scoped current principal
//! - [`Description`]: a script's authentication and transaction requirements
//! - [`TransactionExecutor`]: the retrying transaction capability
//! - [`wcm::DeploymentServerConfig`]: a deployment target definition
//!
//! # Examples
//!
//! ```
//! use webscript_container::{IdentityContext, RequiredAuthentication};
//!
//! let mut identity = IdentityContext::authenticated("alice");
//! {
//!     let mut scoped = identity.scoped();
//!     scoped.set_current("system");
//! }
//! assert_eq!(identity.current(), Some("alice"));
//! assert!(RequiredAuthentication::Admin.excludes_guest());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod container;
mod description;
mod error;
mod identity;
mod logging;
mod node;
mod params;
mod request;
mod response;
mod script;
mod secret;
mod services;
mod transaction;
pub mod wcm;

pub use config::ContainerConfig;
pub use container::{ContainerBuilder, RepositoryContainer, ServerModel};
pub use description::{Description, RequiredAuthentication, RequiredTransaction};
pub use error::{
    ConfigError, Error, Result, TransactionError, Violation, ViolationKind, STATUS_UNAUTHORIZED,
};
pub use identity::{IdentityContext, IdentityGuard};
pub use logging::ScriptLog;
pub use node::NodeRef;
pub use params::{
    ParamValue, ScriptParameters, KEY_COMPANY_HOME, KEY_IMAGE_RESOLVER, KEY_PERSON,
    KEY_ROOT_HOME, KEY_USER_HOME,
};
pub use request::{ScriptRequest, ServiceMatch};
pub use response::{BufferedResponse, ScriptResponse};
pub use script::{FnWebScript, WebScript};
pub use secret::Secret;
pub use services::{
    AccessStatus, Authenticator, AuthorityService, DescriptorService, Permission,
    PermissionService, Repository, ServerDescriptor, TransactionExecutor, TransactionWork,
};
pub use transaction::{RetryPolicy, RetryingTransactionHelper};
