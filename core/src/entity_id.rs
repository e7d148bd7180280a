//! Entity identifier prefixes and synchronous format validation.
//!
//! Every Octopus Deploy entity kind has exactly one valid id prefix
//! (`Deployments-42`, `ServerTasks-1138`, ...). Validation is pure and runs
//! before any network call, so structurally invalid input never costs a
//! round trip.

use crate::error::{OctopusError, Result};

/// Entity kinds with server-assigned prefixed identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Deployment,
    Task,
    Project,
    Environment,
    Tenant,
    Release,
    Machine,
    Certificate,
    Account,
    DeploymentProcess,
}

impl EntityKind {
    /// The id prefix the server assigns to this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Deployment => "Deployments-",
            Self::Task => "ServerTasks-",
            Self::Project => "Projects-",
            Self::Environment => "Environments-",
            Self::Tenant => "Tenants-",
            Self::Release => "Releases-",
            Self::Machine => "Machines-",
            Self::Certificate => "Certificates-",
            Self::Account => "Accounts-",
            Self::DeploymentProcess => "DeploymentProcesses-",
        }
    }

    /// Lowercase label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::Task => "task",
            Self::Project => "project",
            Self::Environment => "environment",
            Self::Tenant => "tenant",
            Self::Release => "release",
            Self::Machine => "machine",
            Self::Certificate => "certificate",
            Self::Account => "account",
            Self::DeploymentProcess => "deployment process",
        }
    }

    /// Capitalized label for sentence starts.
    pub fn title(self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::Task => "Task",
            Self::Project => "Project",
            Self::Environment => "Environment",
            Self::Tenant => "Tenant",
            Self::Release => "Release",
            Self::Machine => "Machine",
            Self::Certificate => "Certificate",
            Self::Account => "Account",
            Self::DeploymentProcess => "Deployment process",
        }
    }

    /// The discovery tool error messages point callers at.
    pub fn list_tool(self) -> &'static str {
        match self {
            Self::Deployment => "list_deployments",
            Self::Task => "list_tasks",
            Self::Project => "list_projects",
            Self::Environment => "list_environments",
            Self::Tenant => "list_tenants",
            Self::Release => "list_releases",
            Self::Machine => "list_deployment_targets",
            Self::Certificate => "list_certificates",
            Self::Account => "list_accounts",
            Self::DeploymentProcess => "list_projects",
        }
    }
}

/// Validate an entity id against its kind's required prefix.
///
/// Absent id fails with `IdRequired`; present-but-wrong-prefix fails with
/// `InvalidIdFormat`. On success the borrowed id is passed back through.
pub fn validate_entity_id(id: Option<&str>, kind: EntityKind) -> Result<&str> {
    let id = id
        .filter(|value| !value.is_empty())
        .ok_or(OctopusError::IdRequired { entity: kind })?;
    if !id.starts_with(kind.id_prefix()) {
        return Err(OctopusError::InvalidIdFormat {
            entity: kind,
            id: id.to_string(),
        });
    }
    Ok(id)
}
