use std::sync::Arc;

use crate::config::ContainerConfig;
use crate::description::{RequiredAuthentication, RequiredTransaction};
use crate::error::{ConfigError, Result, Violation};
use crate::identity::IdentityContext;
use crate::logging::ScriptLog;
use crate::node::NodeRef;
use crate::params::{
    ScriptParameters, KEY_COMPANY_HOME, KEY_IMAGE_RESOLVER, KEY_PERSON, KEY_ROOT_HOME,
    KEY_USER_HOME,
};
use crate::request::ScriptRequest;
use crate::response::ScriptResponse;
use crate::script::WebScript;
use crate::services::{
    AccessStatus, Authenticator, AuthorityService, DescriptorService, Permission,
    PermissionService, Repository, ServerDescriptor, TransactionExecutor,
};
use crate::transaction::RetryingTransactionHelper;

/// Description of the container as exposed to scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerModel {
    /// Name of the hosting container
    pub container_name: &'static str,
    /// Descriptor of the underlying server
    pub server: ServerDescriptor,
}

impl ServerModel {
    /// Container name reported by [`RepositoryContainer`].
    pub const CONTAINER_NAME: &'static str = "Repository";
}

/// Executes web scripts under their required authentication and
/// transaction policy.
///
/// `RepositoryContainer` is built with [`ContainerBuilder`]. It owns no
/// request state: the caller passes the request, the response sink and the
/// identity context into [`execute_script`](Self::execute_script).
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use std::sync::Arc;
/// use webscript_container::*;
///
/// struct Nodes;
/// impl Repository for Nodes {
///     fn root_home(&self) -> Option<NodeRef> { None }
///     fn company_home(&self) -> Option<NodeRef> { None }
///     fn person(&self, _: &IdentityContext) -> Option<NodeRef> { None }
///     fn user_home(&self, _: &NodeRef) -> Option<NodeRef> { None }
/// }
/// struct NoAdmins;
/// impl AuthorityService for NoAdmins {
///     fn has_admin_authority(&self, _: &IdentityContext) -> bool { false }
/// }
/// struct AllowAll;
/// impl PermissionService for AllowAll {
///     fn has_permission(&self, _: &NodeRef, _: Permission, _: &IdentityContext) -> AccessStatus {
///         AccessStatus::Allowed
///     }
/// }
/// struct Descriptor;
/// impl DescriptorService for Descriptor {
///     fn server_descriptor(&self) -> ServerDescriptor {
///         ServerDescriptor {
///             name: "Repository".into(),
///             edition: "Community".into(),
///             version: "2.1.0".into(),
///             schema: 64,
///         }
///     }
/// }
///
/// let container = ContainerBuilder::new()
///     .repository(Arc::new(Nodes))
///     .authority_service(Arc::new(NoAdmins))
///     .permission_service(Arc::new(AllowAll))
///     .descriptor_service(Arc::new(Descriptor))
///     .build()
///     .unwrap();
///
/// let script = FnWebScript::new(
///     Description::new("ping.get", RequiredAuthentication::None, RequiredTransaction::Required),
///     |_req, res, _identity| {
///         write!(res.writer(), "pong")?;
///         Ok(())
///     },
/// );
/// let req = ScriptRequest::new("req-1", ServiceMatch::new("/ping", Arc::new(script)));
/// let mut res = BufferedResponse::new();
/// let mut identity = IdentityContext::authenticated("alice");
///
/// container.execute_script(&req, &mut res, &mut identity, None).unwrap();
/// assert_eq!(res.body_str(), "pong");
/// assert!(identity.current().is_none());
/// ```
pub struct RepositoryContainer {
    repository: Arc<dyn Repository>,
    authority_service: Arc<dyn AuthorityService>,
    permission_service: Arc<dyn PermissionService>,
    descriptor_service: Arc<dyn DescriptorService>,
    transaction_executor: Arc<dyn TransactionExecutor>,
    config: ContainerConfig,
}

impl RepositoryContainer {
    /// Executes the script matched by `req`.
    ///
    /// Scripts requiring no authentication run with the identity cleared.
    /// Guests are refused scripts requiring user or admin authentication.
    /// Otherwise the authenticator (if any) is consulted, admin authority is
    /// verified where required, and the script runs. For authenticated
    /// scripts the identity context is restored to its value on entry on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthorized`](crate::Error::Unauthorized) when a guest
    ///   calls a user/admin script or a non-admin calls an admin script
    /// - errors raised by the script or the transaction executor, unchanged
    pub fn execute_script(
        &self,
        req: &ScriptRequest,
        res: &mut dyn ScriptResponse,
        identity: &mut IdentityContext,
        auth: Option<&dyn Authenticator>,
    ) -> Result<()> {
        let script = req.service_match().web_script();
        let desc = script.description();
        let required = desc.required_authentication();
        let is_guest = req.is_guest();
        let log = ScriptLog::new(&req.request_id, desc.id());

        if required == RequiredAuthentication::None {
            identity.clear();
            return self.transactioned_execute(script.as_ref(), req, res, identity);
        }

        if required.excludes_guest() && is_guest {
            log.warn(format_args!("Guest refused; authentication required: {}", required));
            return Err(Violation::guest_denied(desc.id()).into());
        }

        let mut identity = identity.scoped();
        log.debug(format_args!(
            "Current authentication: {}",
            match identity.prior() {
                Some(user) => format!("authenticated as {}", user),
                None => "unauthenticated".to_string(),
            }
        ));
        log.debug(format_args!("Authentication required: {}", required));
        log.debug(format_args!("Guest login: {}", is_guest));

        let authenticated = match auth {
            Some(auth) => auth.authenticate(required, is_guest, &mut identity),
            None => true,
        };
        if !authenticated {
            log.debug(format_args!("Authenticator declined the request"));
            return Ok(());
        }

        if required == RequiredAuthentication::Admin
            && !self.authority_service.has_admin_authority(&identity)
        {
            log.warn(format_args!(
                "Non-admin {} refused",
                identity.current().unwrap_or("unauthenticated")
            ));
            return Err(Violation::admin_required(desc.id()).into());
        }

        self.transactioned_execute(script.as_ref(), req, res, &identity)
    }

    /// Runs `script` within the transaction level its description requires.
    ///
    /// `none` calls the script directly, `required` joins or starts a
    /// transaction with the default policy, and any other level forces a new
    /// read-write transaction. The response is reset before a retried attempt.
    pub fn transactioned_execute(
        &self,
        script: &dyn WebScript,
        req: &ScriptRequest,
        res: &mut dyn ScriptResponse,
        identity: &IdentityContext,
    ) -> Result<()> {
        let desc = script.description();
        let level = desc.required_transaction();
        if level == RequiredTransaction::None {
            return script.execute(req, res, identity);
        }

        let log = ScriptLog::new(&req.request_id, desc.id());
        let mut attempt = 0u32;
        let mut work = || -> Result<()> {
            if attempt > 0 {
                res.reset();
            }
            attempt += 1;
            log.debug(format_args!("Begin transaction: {}", level));
            script.execute(req, &mut *res, identity)?;
            log.debug(format_args!("End transaction: {}", level));
            Ok(())
        };

        match level {
            RequiredTransaction::Required => self.transaction_executor.do_in_transaction(&mut work),
            _ => self
                .transaction_executor
                .do_in_transaction_with(&mut work, false, true),
        }
    }

    /// Parameters handed to scripts.
    ///
    /// Repository nodes are included only while a transaction is active.
    pub fn script_parameters(&self, identity: &IdentityContext) -> ScriptParameters {
        let mut params = self.base_parameters();
        self.add_repo_parameters(&mut params, identity);
        params
    }

    /// Parameters handed to templates: the script parameters plus the
    /// image resolver.
    pub fn template_parameters(&self, identity: &IdentityContext) -> ScriptParameters {
        let mut params = self.base_parameters();
        params.insert(KEY_IMAGE_RESOLVER, self.config.image_resolver.as_str());
        self.add_repo_parameters(&mut params, identity);
        params
    }

    /// Describes the server this container runs in.
    pub fn description(&self) -> ServerModel {
        ServerModel {
            container_name: ServerModel::CONTAINER_NAME,
            server: self.descriptor_service.server_descriptor(),
        }
    }

    /// The configuration the container was built with.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    fn base_parameters(&self) -> ScriptParameters {
        let mut params = ScriptParameters::new();
        for (key, value) in &self.config.parameters {
            params.insert(key.as_str(), value.as_str());
        }
        params
    }

    fn add_repo_parameters(&self, params: &mut ScriptParameters, identity: &IdentityContext) {
        if self.transaction_executor.current_transaction_id().is_none() {
            return;
        }

        let readable = |node: &NodeRef| {
            self.permission_service
                .has_permission(node, Permission::Read, identity)
                == AccessStatus::Allowed
        };

        if let Some(root_home) = self.repository.root_home() {
            if readable(&root_home) {
                params.insert(KEY_ROOT_HOME, root_home);
            }
        }

        let company_home = self.repository.company_home();
        if let Some(company_home) = &company_home {
            if readable(company_home) {
                params.insert(KEY_COMPANY_HOME, company_home.clone());
            }
        }

        if let Some(person) = self.repository.person(identity) {
            // Gated on company home readability, not on the person node.
            if company_home.as_ref().is_some_and(|home| readable(home)) {
                let user_home = self.repository.user_home(&person);
                params.insert(KEY_PERSON, person);
                if let Some(user_home) = user_home {
                    params.insert(KEY_USER_HOME, user_home);
                }
            }
        }
    }
}

/// Assembles a [`RepositoryContainer`] from its collaborators.
///
/// When no transaction executor is supplied, a
/// [`RetryingTransactionHelper`] using the configured retry policy is
/// created.
#[derive(Default)]
pub struct ContainerBuilder {
    repository: Option<Arc<dyn Repository>>,
    authority_service: Option<Arc<dyn AuthorityService>>,
    permission_service: Option<Arc<dyn PermissionService>>,
    descriptor_service: Option<Arc<dyn DescriptorService>>,
    transaction_executor: Option<Arc<dyn TransactionExecutor>>,
    config: ContainerConfig,
}

impl ContainerBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node locator.
    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Sets the authority service used for admin checks.
    pub fn authority_service(mut self, service: Arc<dyn AuthorityService>) -> Self {
        self.authority_service = Some(service);
        self
    }

    /// Sets the permission service used for parameter visibility.
    pub fn permission_service(mut self, service: Arc<dyn PermissionService>) -> Self {
        self.permission_service = Some(service);
        self
    }

    /// Sets the server descriptor source.
    pub fn descriptor_service(mut self, service: Arc<dyn DescriptorService>) -> Self {
        self.descriptor_service = Some(service);
        self
    }

    /// Sets the transaction executor.
    pub fn transaction_executor(mut self, executor: Arc<dyn TransactionExecutor>) -> Self {
        self.transaction_executor = Some(executor);
        self
    }

    /// Sets the container configuration.
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the container.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDependency`] naming the first
    /// collaborator that was not supplied.
    pub fn build(self) -> Result<RepositoryContainer> {
        let transaction_executor: Arc<dyn TransactionExecutor> = match self.transaction_executor {
            Some(executor) => executor,
            None => Arc::new(RetryingTransactionHelper::new(
                self.config.transaction.clone(),
            )),
        };
        Ok(RepositoryContainer {
            repository: self
                .repository
                .ok_or(ConfigError::MissingDependency("repository"))?,
            authority_service: self
                .authority_service
                .ok_or(ConfigError::MissingDependency("authority_service"))?,
            permission_service: self
                .permission_service
                .ok_or(ConfigError::MissingDependency("permission_service"))?,
            descriptor_service: self
                .descriptor_service
                .ok_or(ConfigError::MissingDependency("descriptor_service"))?,
            transaction_executor,
            config: self.config,
        })
    }
}
