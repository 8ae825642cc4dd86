//! WCM deployment server configuration.
//!
//! This module provides:
//! - `DeploymentServerConfig`: one deployment target, with its generated id
//!   and optional backing node
//! - `ServerProperties`: the typed property record of a target
//! - Two-way mapping between the record and the persisted property model
//!   (`RepoProps` keyed by `QName`)
//!
//! Two inclusion rules govern the mapping: the target name only exists for
//! file system receivers, and the approval flag only for live servers.

mod deployment;
mod model;
mod properties;

pub use deployment::DeploymentServerConfig;
pub use model::{
    DeployType, PropertyValue, QName, RepoProps, ServerType, PROP_DEPLOYONAPPROVAL,
    PROP_DEPLOYSERVERALLOCATEDTO, PROP_DEPLOYSERVERHOST, PROP_DEPLOYSERVERNAME,
    PROP_DEPLOYSERVERPASSWORD, PROP_DEPLOYSERVERPORT, PROP_DEPLOYSERVERTARGET,
    PROP_DEPLOYSERVERTYPE, PROP_DEPLOYSERVERURL, PROP_DEPLOYSERVERUSERNAME, PROP_DEPLOYSOURCEPATH,
    PROP_DEPLOYTYPE, WCMAPP_MODEL_URI,
};
pub use properties::{
    persists_on_approval, persists_target_name, ServerProperties, PROP_ALLOCATED_TO, PROP_HOST,
    PROP_NAME, PROP_ON_APPROVAL, PROP_PASSWORD, PROP_PORT, PROP_SOURCE_PATH, PROP_TARGET_NAME,
    PROP_TYPE, PROP_URL, PROP_USER,
};
