//! Collaborator seams for remote entity access.
//!
//! The resolution chains depend on these traits rather than on the HTTP
//! client directly, so tests substitute in-memory doubles and the transport
//! stays swappable. Space-scoped repositories are keyed by space *name*,
//! matching the platform SDK convention.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Deployment, Release, ResourceCollection, Space, TaskDetails};

/// The space directory: lookup by id, discovery by partial name.
#[async_trait]
pub trait SpaceDirectory: Send + Sync {
    async fn get_space(&self, space_id: &str) -> Result<Space>;

    async fn list_spaces(
        &self,
        partial_name: Option<&str>,
        skip: Option<u32>,
        take: Option<u32>,
    ) -> Result<ResourceCollection<Space>>;
}

/// Deployment records, fetched by id within a space.
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    async fn get_deployment(&self, space_name: &str, deployment_id: &str) -> Result<Deployment>;
}

/// Releases, fetched by id within a space. Errors here are values a caller
/// may choose to tolerate; the trait makes no failure fatal by itself.
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    async fn get_release(&self, space_name: &str, release_id: &str) -> Result<Release>;
}

/// Server tasks, fetched with full details (logs and state) by id.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get_task_details(&self, space_name: &str, task_id: &str) -> Result<TaskDetails>;
}
