//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use webscript_container::{
    AccessStatus, Authenticator, AuthorityService, ContainerBuilder, Description,
    DescriptorService, Error, FnWebScript, IdentityContext, NodeRef, Permission,
    PermissionService, Repository, RepositoryContainer, RequiredAuthentication,
    RequiredTransaction, Result, ScriptRequest, ServerDescriptor, ServiceMatch,
    TransactionExecutor, TransactionWork,
};

/// Transaction executor that records which call shape was used.
#[derive(Default)]
pub struct RecordingExecutor {
    pub joined: AtomicUsize,
    pub forced: Mutex<Vec<(bool, bool)>>,
    active: AtomicBool,
}

impl RecordingExecutor {
    pub fn joined_calls(&self) -> usize {
        self.joined.load(Ordering::SeqCst)
    }

    pub fn forced_calls(&self) -> Vec<(bool, bool)> {
        self.forced.lock().unwrap().clone()
    }

    /// Runs `f` as if inside a transaction.
    pub fn run_for_test(&self, f: impl FnOnce()) {
        self.active.store(true, Ordering::SeqCst);
        f();
        self.active.store(false, Ordering::SeqCst);
    }

    fn run(&self, work: &mut TransactionWork<'_>) -> Result<()> {
        self.active.store(true, Ordering::SeqCst);
        let result = work();
        self.active.store(false, Ordering::SeqCst);
        result
    }
}

impl TransactionExecutor for RecordingExecutor {
    fn do_in_transaction(&self, work: &mut TransactionWork<'_>) -> Result<()> {
        self.joined.fetch_add(1, Ordering::SeqCst);
        self.run(work)
    }

    fn do_in_transaction_with(
        &self,
        work: &mut TransactionWork<'_>,
        read_only: bool,
        requires_new: bool,
    ) -> Result<()> {
        self.forced.lock().unwrap().push((read_only, requires_new));
        self.run(work)
    }

    fn current_transaction_id(&self) -> Option<String> {
        self.active
            .load(Ordering::SeqCst)
            .then(|| "txn-test".to_string())
    }
}

/// Grants admin authority to a fixed set of users.
pub struct Admins(pub HashSet<String>);

impl Admins {
    pub fn of(users: &[&str]) -> Self {
        Self(users.iter().map(|u| u.to_string()).collect())
    }
}

impl AuthorityService for Admins {
    fn has_admin_authority(&self, identity: &IdentityContext) -> bool {
        identity.current().is_some_and(|u| self.0.contains(u))
    }
}

/// Permission service with a fixed set of readable node ids.
#[derive(Default)]
pub struct Readable(pub Mutex<HashSet<String>>);

impl Readable {
    pub fn of(ids: &[&str]) -> Self {
        Self(Mutex::new(ids.iter().map(|id| id.to_string()).collect()))
    }
}

impl PermissionService for Readable {
    fn has_permission(
        &self,
        node: &NodeRef,
        permission: Permission,
        _identity: &IdentityContext,
    ) -> AccessStatus {
        if permission == Permission::Read && self.0.lock().unwrap().contains(node.id()) {
            AccessStatus::Allowed
        } else {
            AccessStatus::Denied
        }
    }
}

/// Repository with optional well-known nodes; person nodes are derived
/// from the current user name.
#[derive(Clone)]
pub struct Nodes {
    pub root_home: Option<NodeRef>,
    pub company_home: Option<NodeRef>,
}

impl Nodes {
    pub fn standard() -> Self {
        Self {
            root_home: Some(NodeRef::in_spaces_store("root")),
            company_home: Some(NodeRef::in_spaces_store("company")),
        }
    }
}

impl Repository for Nodes {
    fn root_home(&self) -> Option<NodeRef> {
        self.root_home.clone()
    }

    fn company_home(&self) -> Option<NodeRef> {
        self.company_home.clone()
    }

    fn person(&self, identity: &IdentityContext) -> Option<NodeRef> {
        identity
            .current()
            .map(|user| NodeRef::in_spaces_store(format!("person-{}", user)))
    }

    fn user_home(&self, person: &NodeRef) -> Option<NodeRef> {
        Some(NodeRef::in_spaces_store(format!("home-{}", person.id())))
    }
}

pub struct Descriptor;

impl DescriptorService for Descriptor {
    fn server_descriptor(&self) -> ServerDescriptor {
        ServerDescriptor {
            name: "Repository".to_string(),
            edition: "Community".to_string(),
            version: "2.1.0".to_string(),
            schema: 64,
        }
    }
}

/// Authenticator that logs in a fixed user, or refuses.
pub struct FixedAuthenticator {
    pub user: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl FixedAuthenticator {
    pub fn logs_in(user: &'static str) -> Self {
        Self {
            user: Some(user),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn refuses() -> Self {
        Self {
            user: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Authenticator for FixedAuthenticator {
    fn authenticate(
        &self,
        _required: RequiredAuthentication,
        _is_guest: bool,
        identity: &mut IdentityContext,
    ) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.user {
            Some(user) => {
                identity.set_current(user);
                true
            }
            None => false,
        }
    }
}

/// A container wired to recording collaborators.
pub struct Harness {
    pub container: RepositoryContainer,
    pub executor: Arc<RecordingExecutor>,
    pub permissions: Arc<Readable>,
}

impl Harness {
    pub fn new(admins: &[&str]) -> Self {
        Self::with_nodes(admins, Nodes::standard())
    }

    pub fn with_nodes(admins: &[&str], nodes: Nodes) -> Self {
        let executor = Arc::new(RecordingExecutor::default());
        let permissions = Arc::new(Readable::of(&["root", "company"]));
        let container = ContainerBuilder::new()
            .repository(Arc::new(nodes))
            .authority_service(Arc::new(Admins::of(admins)))
            .permission_service(permissions.clone())
            .descriptor_service(Arc::new(Descriptor))
            .transaction_executor(executor.clone())
            .build()
            .expect("all collaborators supplied");
        Self {
            container,
            executor,
            permissions,
        }
    }
}

/// Shared record of what a test script observed.
#[derive(Default)]
pub struct Observed {
    pub calls: AtomicUsize,
    pub identity: Mutex<Option<Option<String>>>,
}

impl Observed {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn identity_seen(&self) -> Option<Option<String>> {
        self.identity.lock().unwrap().clone()
    }
}

/// What the test script does once invoked.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Succeed,
    FailIo,
    FailScript,
}

/// Builds a request for a script that records its invocation.
pub fn request(
    id: &str,
    auth: RequiredAuthentication,
    txn: RequiredTransaction,
    outcome: Outcome,
) -> (ScriptRequest, Arc<Observed>) {
    let observed = Arc::new(Observed::default());
    let seen = observed.clone();
    let script = FnWebScript::new(Description::new(id, auth, txn), move |_req, res, identity| {
        seen.calls.fetch_add(1, Ordering::SeqCst);
        *seen.identity.lock().unwrap() = Some(identity.current().map(str::to_string));
        match outcome {
            Outcome::Succeed => {
                write!(res.writer(), "ok")?;
                Ok(())
            }
            Outcome::FailIo => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "client disconnected",
            ))),
            Outcome::FailScript => Err(Error::Script("script failed".to_string())),
        }
    });
    let req = ScriptRequest::new(
        format!("req-{}", id),
        ServiceMatch::new(format!("/{}", id), Arc::new(script)),
    );
    (req, observed)
}
