use std::fmt;

use uuid::Uuid;

use crate::error::{ConfigError, Result};
use crate::node::NodeRef;
use crate::secret::Secret;
use crate::wcm::model::{
    DeployType, PropertyValue, QName, RepoProps, ServerType, PROP_DEPLOYONAPPROVAL,
    PROP_DEPLOYSERVERALLOCATEDTO, PROP_DEPLOYSERVERHOST, PROP_DEPLOYSERVERNAME,
    PROP_DEPLOYSERVERPASSWORD, PROP_DEPLOYSERVERPORT, PROP_DEPLOYSERVERTARGET,
    PROP_DEPLOYSERVERTYPE, PROP_DEPLOYSERVERURL, PROP_DEPLOYSERVERUSERNAME,
    PROP_DEPLOYSOURCEPATH, PROP_DEPLOYTYPE,
};
use crate::wcm::properties::{
    non_empty, persists_on_approval, persists_target_name, port_from_int, ServerProperties,
};

/// Configuration of one deployment target.
///
/// The id is generated when the record is created and never changes, also
/// when the record is hydrated from a persisted node.
///
/// # Examples
///
/// ```
/// use webscript_container::wcm::{
///     DeployType, DeploymentServerConfig, ServerProperties, PROP_DEPLOYSERVERTARGET,
/// };
///
/// let mut config = DeploymentServerConfig::new(DeployType::File);
/// config.set_properties(ServerProperties {
///     host: Some("fsr.example.org".into()),
///     target_name: Some("siteA".into()),
///     ..Default::default()
/// });
///
/// let repo_props = config.repo_props();
/// assert!(repo_props.contains_key(&PROP_DEPLOYSERVERTARGET));
/// ```
#[derive(Debug)]
pub struct DeploymentServerConfig {
    id: Uuid,
    server_ref: Option<NodeRef>,
    deploy_type: DeployType,
    props: ServerProperties,
}

impl DeploymentServerConfig {
    /// Creates a fresh configuration with no properties.
    pub fn new(deploy_type: DeployType) -> Self {
        Self {
            id: Uuid::new_v4(),
            server_ref: None,
            deploy_type,
            props: ServerProperties::default(),
        }
    }

    /// Hydrates a configuration from the properties of a persisted node.
    ///
    /// # Errors
    ///
    /// Fails when the deploy type is missing or unknown, or when a known
    /// property holds a value of the wrong type.
    pub fn from_repo_props(server_ref: NodeRef, repo_props: &RepoProps) -> Result<Self> {
        let deploy_type = read_text(repo_props, &PROP_DEPLOYTYPE)?
            .ok_or_else(|| ConfigError::MissingProperty(PROP_DEPLOYTYPE.to_string()))?
            .parse::<DeployType>()?;

        let mut config = Self {
            id: Uuid::new_v4(),
            server_ref: Some(server_ref),
            deploy_type,
            props: ServerProperties::default(),
        };
        config.populate_from_repo_props(repo_props)?;
        Ok(config)
    }

    /// Generated identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Persisted node backing this configuration, if any.
    pub fn server_ref(&self) -> Option<&NodeRef> {
        self.server_ref.as_ref()
    }

    /// Deploy type.
    pub fn deploy_type(&self) -> DeployType {
        self.deploy_type
    }

    /// Current properties.
    pub fn properties(&self) -> &ServerProperties {
        &self.props
    }

    /// Replaces all properties.
    pub fn set_properties(&mut self, props: ServerProperties) {
        self.props = props;
    }

    /// Projects the properties onto the persisted property model.
    ///
    /// Absent and empty text properties are omitted. The target name is
    /// written only for file system receivers; the approval flag only for
    /// live servers.
    pub fn repo_props(&self) -> RepoProps {
        let mut repo_props = RepoProps::new();
        repo_props.insert(PROP_DEPLOYTYPE, self.deploy_type.as_str().into());
        if let Some(server_type) = self.props.server_type {
            repo_props.insert(PROP_DEPLOYSERVERTYPE, server_type.as_str().into());
        }

        let mut put_text = |key: QName, value: Option<&str>| {
            if let Some(value) = non_empty(value) {
                repo_props.insert(key, value.into());
            }
        };
        put_text(PROP_DEPLOYSERVERHOST, self.props.host.as_deref());
        put_text(PROP_DEPLOYSERVERNAME, self.props.name.as_deref());
        put_text(PROP_DEPLOYSERVERUSERNAME, self.props.username.as_deref());
        put_text(
            PROP_DEPLOYSERVERPASSWORD,
            self.props.password.as_ref().map(|p| p.expose_secret().as_str()),
        );
        put_text(PROP_DEPLOYSERVERURL, self.props.url.as_deref());
        put_text(PROP_DEPLOYSOURCEPATH, self.props.source_path.as_deref());
        put_text(PROP_DEPLOYSERVERALLOCATEDTO, self.props.allocated_to.as_deref());
        if persists_target_name(self.deploy_type) {
            put_text(PROP_DEPLOYSERVERTARGET, self.props.target_name.as_deref());
        }

        if let Some(port) = self.props.port {
            repo_props.insert(PROP_DEPLOYSERVERPORT, i64::from(port).into());
        }
        if persists_on_approval(self.props.server_type) {
            if let Some(on_approval) = self.props.on_approval {
                repo_props.insert(PROP_DEPLOYONAPPROVAL, on_approval.into());
            }
        }

        repo_props
    }

    /// Replaces the properties with those read from `repo_props`.
    ///
    /// The target name is read only for file system receivers. For live
    /// servers a missing approval flag reads as `false`. An empty server
    /// type reads as absent. On error the current properties are left
    /// untouched.
    pub fn populate_from_repo_props(&mut self, repo_props: &RepoProps) -> Result<()> {
        let server_type_tag = read_text(repo_props, &PROP_DEPLOYSERVERTYPE)?;
        let server_type = match non_empty(server_type_tag.as_deref()) {
            Some(tag) => Some(tag.parse::<ServerType>()?),
            None => None,
        };

        let port = match repo_props.get(&PROP_DEPLOYSERVERPORT) {
            None => None,
            Some(PropertyValue::Int(n)) => Some(port_from_int(*n)?),
            Some(_) => return Err(wrong_type(&PROP_DEPLOYSERVERPORT, "integer").into()),
        };

        let target_name = if persists_target_name(self.deploy_type) {
            read_text(repo_props, &PROP_DEPLOYSERVERTARGET)?
        } else {
            None
        };

        let on_approval = if persists_on_approval(server_type) {
            match repo_props.get(&PROP_DEPLOYONAPPROVAL) {
                None => Some(false),
                Some(PropertyValue::Bool(b)) => Some(*b),
                Some(_) => return Err(wrong_type(&PROP_DEPLOYONAPPROVAL, "boolean").into()),
            }
        } else {
            None
        };

        self.props = ServerProperties {
            server_type,
            name: read_text(repo_props, &PROP_DEPLOYSERVERNAME)?,
            host: read_text(repo_props, &PROP_DEPLOYSERVERHOST)?,
            port,
            username: read_text(repo_props, &PROP_DEPLOYSERVERUSERNAME)?,
            password: read_text(repo_props, &PROP_DEPLOYSERVERPASSWORD)?.map(Secret::new),
            url: read_text(repo_props, &PROP_DEPLOYSERVERURL)?,
            source_path: read_text(repo_props, &PROP_DEPLOYSOURCEPATH)?,
            target_name,
            allocated_to: read_text(repo_props, &PROP_DEPLOYSERVERALLOCATEDTO)?,
            on_approval,
        };
        tracing::debug!(
            id = %self.id,
            deploy_type = %self.deploy_type,
            "Populated deployment server"
        );
        Ok(())
    }
}

impl fmt::Display for DeploymentServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeploymentServerConfig (id={} serverRef=", self.id)?;
        match &self.server_ref {
            Some(node) => write!(f, "{}", node)?,
            None => f.write_str("null")?,
        }
        write!(f, " deployType={} props={:?})", self.deploy_type, self.props)
    }
}

fn read_text(
    repo_props: &RepoProps,
    key: &QName,
) -> std::result::Result<Option<String>, ConfigError> {
    match repo_props.get(key) {
        None => Ok(None),
        Some(PropertyValue::Text(s)) => Ok(Some(s.clone())),
        Some(_) => Err(wrong_type(key, "text")),
    }
}

fn wrong_type(key: &QName, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        name: key.to_string(),
        expected,
    }
}
