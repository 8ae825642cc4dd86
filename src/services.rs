//! Collaborator interfaces consumed by the container.
//!
//! The container does not authenticate, resolve authorities, evaluate
//! permissions or manage transactions itself. Each of those concerns is
//! injected as a narrow trait object so deployments (and tests) can supply
//! their own implementations.

use std::fmt;

use crate::description::RequiredAuthentication;
use crate::error::Result;
use crate::identity::IdentityContext;
use crate::node::NodeRef;

/// Performs the credential check for an invocation.
pub trait Authenticator {
    /// Authenticates the caller for `required`, installing the resulting
    /// principal into `identity`.
    ///
    /// Returns `false` when authentication failed; the authenticator is
    /// expected to have written its challenge to the response already.
    fn authenticate(
        &self,
        required: RequiredAuthentication,
        is_guest: bool,
        identity: &mut IdentityContext,
    ) -> bool;
}

/// Resolves authorities held by the current principal.
pub trait AuthorityService: Send + Sync {
    /// Returns `true` if the current principal holds admin authority.
    fn has_admin_authority(&self, identity: &IdentityContext) -> bool;
}

/// A permission that can be checked on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Read access
    Read,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "Read"),
        }
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    /// Access granted
    Allowed,
    /// Access refused
    Denied,
    /// No decision could be made
    Undetermined,
}

/// Evaluates permissions on repository nodes.
pub trait PermissionService: Send + Sync {
    /// Checks `permission` on `node` for the current principal.
    fn has_permission(
        &self,
        node: &NodeRef,
        permission: Permission,
        identity: &IdentityContext,
    ) -> AccessStatus;
}

/// Locates the well-known nodes exposed to scripts.
pub trait Repository: Send + Sync {
    /// Root of the store.
    fn root_home(&self) -> Option<NodeRef>;

    /// The company home folder.
    fn company_home(&self) -> Option<NodeRef>;

    /// Person node of the current principal.
    fn person(&self, identity: &IdentityContext) -> Option<NodeRef>;

    /// Home folder of `person`.
    fn user_home(&self, person: &NodeRef) -> Option<NodeRef>;
}

/// Describes the server the container runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    /// Product name
    pub name: String,
    /// Product edition
    pub edition: String,
    /// Version label
    pub version: String,
    /// Repository schema number
    pub schema: u32,
}

/// Supplies the server descriptor.
pub trait DescriptorService: Send + Sync {
    /// Descriptor of the running server.
    fn server_descriptor(&self) -> ServerDescriptor;
}

/// Unit of work run inside a transaction.
///
/// The closure may be called more than once when the executor retries.
pub type TransactionWork<'a> = dyn FnMut() -> Result<()> + 'a;

/// Runs work inside retrying transactions.
///
/// The retry policy (attempt count, backoff, conflict detection) is entirely
/// the executor's concern.
pub trait TransactionExecutor: Send + Sync {
    /// Runs `work` in the active transaction, or starts one if none is
    /// active, using the default retry policy.
    fn do_in_transaction(&self, work: &mut TransactionWork<'_>) -> Result<()>;

    /// Runs `work` with explicit transaction parameters.
    fn do_in_transaction_with(
        &self,
        work: &mut TransactionWork<'_>,
        read_only: bool,
        requires_new: bool,
    ) -> Result<()>;

    /// Identifier of the active transaction, if any.
    fn current_transaction_id(&self) -> Option<String>;
}
