//! Entity resolution chains: from an opaque portal URL to a fully-resolved
//! deployment or task context.
//!
//! Each chain is a sequential pipeline: parse, require a space id, resolve
//! the space name through the TTL cache, extract and validate the entity
//! id, fetch, compose. Shape and format failures never reach the network;
//! remote failures surface with contextual help, except the release-version
//! enrichment inside deployment resolution, which is cosmetic and therefore
//! logged and swallowed.

use std::sync::Arc;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;

use crate::client::OctopusClient;
use crate::config::OctopusConfig;
use crate::entity_id::{EntityKind, validate_entity_id};
use crate::error::{OctopusError, Result};
use crate::model::{Deployment, ResourceCollection, Space, TaskDetails};
use crate::repositories::{
    DeploymentRepository, ReleaseRepository, SpaceDirectory, TaskRepository,
};
use crate::space_resolver::SpaceNameResolver;
use crate::url_parser::{
    ResourceType, extract_deployment_id, extract_task_id, parse_portal_url,
};

const DEPLOYMENT_SOUGHT: &[EntityKind] = &[EntityKind::Deployment];
const TASK_OR_DEPLOYMENT_SOUGHT: &[EntityKind] = &[EntityKind::Task, EntityKind::Deployment];

const DEPLOYMENT_NOT_FOUND_HELP: &str =
    "The deployment may have been deleted or you may not have permission to view it.";

const TASK_NOT_FOUND_HELP: &str = "Common causes:\n\
1. If you extracted this task ID from a deployment URL, note that deployment URLs do not \
contain task IDs. Use get_deployment_from_url or get_task_from_url to resolve the correct \
task ID automatically.\n\
2. The task may exist in a different space.\n\
3. The task may have been deleted or archived.\n\
4. You may not have permission to view this task.";

/// Reshaped deployment fields plus the enrichments the chain adds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    pub space_id: String,
    pub id: String,
    pub name: String,
    pub release_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_version: Option<String>,
    pub environment_id: String,
    pub tenant_id: Option<String>,
    pub project_id: String,
    pub channel_id: Option<String>,
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    pub task_id: Option<String>,
    pub deployment_process_id: Option<String>,
    pub comments: Option<String>,
    pub form_values: Option<serde_json::Value>,
    pub queue_time: Option<chrono::DateTime<chrono::Utc>>,
    pub queue_time_expiry: Option<chrono::DateTime<chrono::Utc>>,
    pub use_guided_failure: bool,
    pub specific_machine_ids: Vec<String>,
    pub excluded_machine_ids: Vec<String>,
    pub skip_actions: Vec<String>,
    pub force_package_download: bool,
    pub force_package_redeployment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl DeploymentSummary {
    fn compose(
        deployment: Deployment,
        release_version: Option<String>,
        public_url: Option<String>,
    ) -> Self {
        Self {
            space_id: deployment.space_id,
            id: deployment.id,
            name: deployment.name,
            release_id: deployment.release_id,
            release_version,
            environment_id: deployment.environment_id,
            tenant_id: deployment.tenant_id,
            project_id: deployment.project_id,
            channel_id: deployment.channel_id,
            created: deployment.created,
            task_id: deployment.task_id,
            deployment_process_id: deployment.deployment_process_id,
            comments: deployment.comments,
            form_values: deployment.form_values,
            queue_time: deployment.queue_time,
            queue_time_expiry: deployment.queue_time_expiry,
            use_guided_failure: deployment.use_guided_failure,
            specific_machine_ids: deployment.specific_machine_ids,
            excluded_machine_ids: deployment.excluded_machine_ids,
            skip_actions: deployment.skip_actions,
            force_package_download: deployment.force_package_download,
            force_package_redeployment: deployment.force_package_redeployment,
            public_url,
        }
    }
}

/// Echo of what the parser extracted, for traceability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlInfo {
    pub original_url: String,
    pub extracted_space_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_deployment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_task_id: Option<String>,
    pub resource_type: ResourceType,
}

/// Pre-filled pointer at the follow-up lookup. The deployment id alone
/// cannot retrieve execution logs; the task id here is what downstream
/// callers actually need.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSteps {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_task_id: Option<String>,
    pub suggested_tool: String,
    pub suggested_params: SuggestedParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedParams {
    pub space_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// Result of resolving a deployment URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentFromUrl {
    pub deployment: DeploymentSummary,
    pub resolved_space_name: String,
    pub resolved_deployment_id: String,
    pub task_id_for_logs: Option<String>,
    pub url_info: UrlInfo,
    pub next_steps: NextSteps,
}

/// Result of resolving a task URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFromUrl {
    pub task: TaskDetails,
    pub resolved_space_name: String,
    pub resolved_task_id: String,
    pub url_info: UrlInfo,
}

/// Where a task id can come from when resolving a task URL.
enum TaskLookup {
    /// The URL carries a literal task id.
    Task(String),
    /// The URL carries a deployment id whose record references the task.
    Deployment(String),
}

fn direct_task_lookup(url: &str) -> Option<TaskLookup> {
    extract_task_id(url).map(TaskLookup::Task)
}

fn deployment_url_lookup(url: &str) -> Option<TaskLookup> {
    extract_deployment_id(url).map(TaskLookup::Deployment)
}

/// Ordered and short-circuiting: task URLs are the common case, the
/// deployment-URL fallback is strictly secondary.
const TASK_LOOKUP_STRATEGIES: &[fn(&str) -> Option<TaskLookup>] =
    &[direct_task_lookup, deployment_url_lookup];

static TEMPLATE_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid template pattern"));

/// Expand `{placeholder}` tokens in a URL template. Unknown placeholders
/// are left intact.
pub fn expand_url_template(template: &str, params: &[(&str, &str)]) -> String {
    TEMPLATE_PARAM_RE
        .replace_all(template, |caps: &regex_lite::Captures<'_>| {
            let key = &caps[1];
            params
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_else(|| format!("{{{key}}}"))
        })
        .into_owned()
}

/// Resolves portal URLs to fully-composed entity contexts.
///
/// Owns the collaborator seams and the space-name cache; one instance per
/// server process.
pub struct UrlResolver {
    spaces: Arc<dyn SpaceDirectory>,
    deployments: Arc<dyn DeploymentRepository>,
    releases: Arc<dyn ReleaseRepository>,
    tasks: Arc<dyn TaskRepository>,
    space_names: SpaceNameResolver,
    instance_url: String,
}

impl UrlResolver {
    pub fn new(
        spaces: Arc<dyn SpaceDirectory>,
        deployments: Arc<dyn DeploymentRepository>,
        releases: Arc<dyn ReleaseRepository>,
        tasks: Arc<dyn TaskRepository>,
        space_names: SpaceNameResolver,
        instance_url: impl Into<String>,
    ) -> Self {
        let instance_url = instance_url.into().trim_end_matches('/').to_string();
        Self {
            spaces,
            deployments,
            releases,
            tasks,
            space_names,
            instance_url,
        }
    }

    /// Wire every collaborator seam to one API client.
    pub fn for_client(client: Arc<OctopusClient>, config: &OctopusConfig) -> Self {
        Self::new(
            client.clone() as Arc<dyn SpaceDirectory>,
            client.clone() as Arc<dyn DeploymentRepository>,
            client.clone() as Arc<dyn ReleaseRepository>,
            client as Arc<dyn TaskRepository>,
            SpaceNameResolver::new(),
            config.instance_url(),
        )
    }

    /// Drop all cached space names (test isolation, credential rotation).
    pub fn clear_space_cache(&self) {
        self.space_names.clear();
    }

    /// Resolve a deployment URL into a composed deployment context.
    pub async fn deployment_from_url(&self, url: &str) -> Result<DeploymentFromUrl> {
        let parsed = parse_portal_url(url)?;
        let space_id = parsed.space_id.clone().ok_or(OctopusError::MissingSpaceId)?;
        let space_name = self
            .space_names
            .resolve(self.spaces.as_ref(), &space_id)
            .await?;

        let deployment_id =
            extract_deployment_id(url).ok_or(OctopusError::MissingResourceId {
                sought: DEPLOYMENT_SOUGHT,
                found: parsed.resource_type,
            })?;
        validate_entity_id(Some(&deployment_id), EntityKind::Deployment)?;

        let deployment = self
            .deployments
            .get_deployment(&space_name, &deployment_id)
            .await
            .map_err(|err| err.with_help(DEPLOYMENT_NOT_FOUND_HELP))?;

        // Cosmetic enrichment: failure here never fails the operation.
        let release_version = match &deployment.release_id {
            Some(release_id) => match self.releases.get_release(&space_name, release_id).await {
                Ok(release) => Some(release.version),
                Err(err) => {
                    tracing::warn!(
                        release_id = release_id.as_str(),
                        error = %err,
                        "release lookup failed; composing result without release version"
                    );
                    None
                }
            },
            None => None,
        };

        let public_url = release_version.as_deref().map(|version| {
            expand_url_template(
                &format!(
                    "{}/app#/{{spaceId}}/projects/{{projectId}}/deployments/releases/{{releaseVersion}}/deployments/{{deploymentId}}",
                    self.instance_url
                ),
                &[
                    ("spaceId", deployment.space_id.as_str()),
                    ("projectId", deployment.project_id.as_str()),
                    ("releaseVersion", version),
                    ("deploymentId", deployment.id.as_str()),
                ],
            )
        });

        let task_id_for_logs = deployment.task_id.clone();
        let url_info = UrlInfo {
            original_url: url.to_string(),
            extracted_space_id: space_id,
            extracted_deployment_id: Some(deployment_id.clone()),
            extracted_task_id: None,
            resource_type: parsed.resource_type,
        };
        let next_steps = NextSteps {
            description: "To view task logs and execution details for this deployment"
                .to_string(),
            use_task_id: task_id_for_logs.clone(),
            suggested_tool: "get_task_details".to_string(),
            suggested_params: SuggestedParams {
                space_name: space_name.clone(),
                task_id: task_id_for_logs.clone(),
            },
        };

        Ok(DeploymentFromUrl {
            deployment: DeploymentSummary::compose(deployment, release_version, public_url),
            resolved_space_name: space_name,
            resolved_deployment_id: deployment_id,
            task_id_for_logs,
            url_info,
            next_steps,
        })
    }

    /// Resolve a task URL (or a deployment URL, via fallback) into full
    /// task details.
    pub async fn task_from_url(&self, url: &str) -> Result<TaskFromUrl> {
        let parsed = parse_portal_url(url)?;
        let space_id = parsed.space_id.clone().ok_or(OctopusError::MissingSpaceId)?;
        let space_name = self
            .space_names
            .resolve(self.spaces.as_ref(), &space_id)
            .await?;

        let lookup = TASK_LOOKUP_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(url));

        let (task_id, extracted_task_id, extracted_deployment_id) = match lookup {
            Some(TaskLookup::Task(task_id)) => (task_id.clone(), Some(task_id), None),
            Some(TaskLookup::Deployment(deployment_id)) => {
                let deployment = self
                    .deployments
                    .get_deployment(&space_name, &deployment_id)
                    .await
                    .map_err(|err| err.with_help(DEPLOYMENT_NOT_FOUND_HELP))?;
                let task_id = deployment.task_id.ok_or_else(|| {
                    OctopusError::TaskMissingFromDeployment {
                        deployment_id: deployment_id.clone(),
                        space_name: space_name.clone(),
                    }
                })?;
                (task_id, None, Some(deployment_id))
            }
            None => {
                return Err(OctopusError::MissingResourceId {
                    sought: TASK_OR_DEPLOYMENT_SOUGHT,
                    found: parsed.resource_type,
                });
            }
        };

        validate_entity_id(Some(&task_id), EntityKind::Task)?;

        let task = self
            .tasks
            .get_task_details(&space_name, &task_id)
            .await
            .map_err(|err| err.with_help(TASK_NOT_FOUND_HELP))?;

        Ok(TaskFromUrl {
            task,
            url_info: UrlInfo {
                original_url: url.to_string(),
                extracted_space_id: space_id,
                extracted_deployment_id,
                extracted_task_id,
                resource_type: parsed.resource_type,
            },
            resolved_space_name: space_name,
            resolved_task_id: task_id,
        })
    }

    /// Fetch full task details by space name and task id — the operation
    /// `next_steps` points at.
    pub async fn task_details(&self, space_name: &str, task_id: &str) -> Result<TaskDetails> {
        let task_id = validate_entity_id(Some(task_id), EntityKind::Task)?;
        self.tasks
            .get_task_details(space_name, task_id)
            .await
            .map_err(|err| err.with_help(TASK_NOT_FOUND_HELP))
    }

    /// List spaces, optionally filtered by partial name.
    pub async fn list_spaces(
        &self,
        partial_name: Option<&str>,
        skip: Option<u32>,
        take: Option<u32>,
    ) -> Result<ResourceCollection<Space>> {
        self.spaces.list_spaces(partial_name, skip, take).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ServerTask, TaskState};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DEPLOYMENT_URL: &str = "https://samples.octopus.app/app#/Spaces-1/projects/my-app/deployments/releases/1.2.3/deployments/Deployments-123";
    const TASK_URL: &str = "https://samples.octopus.app/app#/Spaces-1/tasks/ServerTasks-456";
    const PROJECT_URL: &str = "https://samples.octopus.app/app#/Spaces-1/projects/test";

    fn sample_deployment() -> Deployment {
        Deployment {
            id: "Deployments-123".to_string(),
            name: "Deploy to Production".to_string(),
            space_id: "Spaces-1".to_string(),
            release_id: Some("Releases-456".to_string()),
            environment_id: "Environments-2".to_string(),
            tenant_id: None,
            project_id: "Projects-9".to_string(),
            channel_id: Some("Channels-1".to_string()),
            created: None,
            task_id: Some("ServerTasks-789".to_string()),
            deployment_process_id: Some("deploymentprocess-Projects-9".to_string()),
            comments: None,
            form_values: None,
            queue_time: None,
            queue_time_expiry: None,
            use_guided_failure: false,
            specific_machine_ids: Vec::new(),
            excluded_machine_ids: Vec::new(),
            skip_actions: Vec::new(),
            force_package_download: false,
            force_package_redeployment: false,
        }
    }

    fn sample_task_details(task_id: &str) -> TaskDetails {
        TaskDetails {
            task: ServerTask {
                id: task_id.to_string(),
                name: "Deploy".to_string(),
                description: None,
                state: TaskState::Success,
                space_id: Some("Spaces-1".to_string()),
                completed: None,
                queue_time: None,
                start_time: None,
                last_updated_time: None,
                completed_time: None,
                error_message: None,
                duration: None,
                has_been_picked_up_by_processor: true,
                is_completed: true,
                finished_successfully: true,
                has_pending_interruptions: false,
            },
            progress: None,
            physical_log_size: None,
            activity_logs: Vec::new(),
        }
    }

    struct StaticSpaces {
        calls: AtomicUsize,
    }

    impl StaticSpaces {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SpaceDirectory for StaticSpaces {
        async fn get_space(&self, space_id: &str) -> Result<Space> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Space {
                id: space_id.to_string(),
                name: "Default".to_string(),
                description: None,
                is_default: true,
                task_queue_stopped: false,
            })
        }

        async fn list_spaces(
            &self,
            _partial_name: Option<&str>,
            _skip: Option<u32>,
            _take: Option<u32>,
        ) -> Result<ResourceCollection<Space>> {
            Ok(ResourceCollection {
                item_type: Some("Space".to_string()),
                total_results: Some(1),
                items_per_page: Some(30),
                items: vec![Space {
                    id: "Spaces-1".to_string(),
                    name: "Default".to_string(),
                    description: None,
                    is_default: true,
                    task_queue_stopped: false,
                }],
            })
        }
    }

    struct StubDeployments {
        response: Option<Deployment>,
        calls: AtomicUsize,
    }

    impl StubDeployments {
        fn returning(deployment: Deployment) -> Arc<Self> {
            Arc::new(Self {
                response: Some(deployment),
                calls: AtomicUsize::new(0),
            })
        }

        fn not_found() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DeploymentRepository for StubDeployments {
        async fn get_deployment(
            &self,
            space_name: &str,
            deployment_id: &str,
        ) -> Result<Deployment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .ok_or_else(|| OctopusError::NotFound {
                    entity: EntityKind::Deployment,
                    id: deployment_id.to_string(),
                    space_name: space_name.to_string(),
                    help: None,
                })
        }
    }

    struct StubReleases {
        version: Option<String>,
        calls: AtomicUsize,
    }

    impl StubReleases {
        fn returning(version: &str) -> Arc<Self> {
            Arc::new(Self {
                version: Some(version.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                version: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReleaseRepository for StubReleases {
        async fn get_release(&self, _space_name: &str, release_id: &str) -> Result<crate::model::Release> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.version {
                Some(version) => Ok(crate::model::Release {
                    id: release_id.to_string(),
                    version: version.clone(),
                    space_id: None,
                    project_id: None,
                    channel_id: None,
                    release_notes: None,
                }),
                None => Err(OctopusError::UpstreamStatus {
                    status: 500,
                    detail: "release endpoint unavailable".to_string(),
                }),
            }
        }
    }

    struct StubTasks {
        calls: AtomicUsize,
    }

    impl StubTasks {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TaskRepository for StubTasks {
        async fn get_task_details(&self, _space_name: &str, task_id: &str) -> Result<TaskDetails> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_task_details(task_id))
        }
    }

    struct Harness {
        spaces: Arc<StaticSpaces>,
        deployments: Arc<StubDeployments>,
        releases: Arc<StubReleases>,
        tasks: Arc<StubTasks>,
        resolver: UrlResolver,
    }

    fn harness_with(
        deployments: Arc<StubDeployments>,
        releases: Arc<StubReleases>,
    ) -> Harness {
        let spaces = StaticSpaces::new();
        let tasks = StubTasks::new();
        let resolver = UrlResolver::new(
            spaces.clone(),
            deployments.clone(),
            releases.clone(),
            tasks.clone(),
            SpaceNameResolver::new(),
            "https://samples.octopus.app",
        );
        Harness {
            spaces,
            deployments,
            releases,
            tasks,
            resolver,
        }
    }

    fn harness() -> Harness {
        harness_with(
            StubDeployments::returning(sample_deployment()),
            StubReleases::returning("1.2.3"),
        )
    }

    #[tokio::test]
    async fn deployment_url_resolves_to_composed_context() {
        let harness = harness();
        let result = harness.resolver.deployment_from_url(DEPLOYMENT_URL).await.unwrap();

        assert_eq!(result.resolved_space_name, "Default");
        assert_eq!(result.resolved_deployment_id, "Deployments-123");
        assert_eq!(result.task_id_for_logs.as_deref(), Some("ServerTasks-789"));
        assert_eq!(result.deployment.release_version.as_deref(), Some("1.2.3"));
        assert_eq!(
            result.deployment.public_url.as_deref(),
            Some(
                "https://samples.octopus.app/app#/Spaces-1/projects/Projects-9/deployments/releases/1.2.3/deployments/Deployments-123"
            )
        );

        assert_eq!(result.url_info.original_url, DEPLOYMENT_URL);
        assert_eq!(result.url_info.extracted_space_id, "Spaces-1");
        assert_eq!(
            result.url_info.extracted_deployment_id.as_deref(),
            Some("Deployments-123")
        );
        assert_eq!(result.url_info.resource_type, ResourceType::Deployment);

        assert_eq!(result.next_steps.suggested_tool, "get_task_details");
        assert_eq!(result.next_steps.suggested_params.space_name, "Default");
        assert_eq!(
            result.next_steps.suggested_params.task_id.as_deref(),
            Some("ServerTasks-789")
        );
    }

    #[tokio::test]
    async fn deployment_url_without_deployment_id_fails_before_fetch() {
        let harness = harness();
        let err = harness.resolver.deployment_from_url(PROJECT_URL).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Could not extract deployment ID"));
        assert!(message.contains("The provided URL appears to be: project"));
        assert_eq!(harness.deployments.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_url_fails_without_any_remote_call() {
        let harness = harness();
        let err = harness.resolver.deployment_from_url("not-a-valid-url").await.unwrap_err();
        assert!(matches!(err, OctopusError::MalformedUrl { .. }));
        assert_eq!(harness.spaces.calls.load(Ordering::SeqCst), 0);
        assert_eq!(harness.deployments.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn url_without_space_id_fails_fast() {
        let harness = harness();
        let err = harness
            .resolver
            .deployment_from_url("https://samples.octopus.app/app#/deployments/Deployments-1")
            .await
            .unwrap_err();
        assert!(matches!(err, OctopusError::MissingSpaceId));
        assert_eq!(harness.spaces.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_release_lookup_degrades_gracefully() {
        let harness = harness_with(
            StubDeployments::returning(sample_deployment()),
            StubReleases::failing(),
        );
        let result = harness.resolver.deployment_from_url(DEPLOYMENT_URL).await.unwrap();

        assert_eq!(harness.releases.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.deployment.release_version, None);
        assert_eq!(result.deployment.public_url, None);
        assert_eq!(result.resolved_deployment_id, "Deployments-123");
    }

    #[tokio::test]
    async fn deployment_without_release_id_skips_release_lookup() {
        let mut deployment = sample_deployment();
        deployment.release_id = None;
        let harness = harness_with(
            StubDeployments::returning(deployment),
            StubReleases::returning("1.2.3"),
        );
        let result = harness.resolver.deployment_from_url(DEPLOYMENT_URL).await.unwrap();

        assert_eq!(harness.releases.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.deployment.release_version, None);
        assert_eq!(result.deployment.public_url, None);
    }

    #[tokio::test]
    async fn missing_deployment_carries_contextual_help() {
        let harness = harness_with(StubDeployments::not_found(), StubReleases::returning("1"));
        let err = harness.resolver.deployment_from_url(DEPLOYMENT_URL).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Deployment 'Deployments-123' not found in space 'Default'"));
        assert!(message.contains("may have been deleted"));
    }

    #[tokio::test]
    async fn direct_task_url_never_touches_the_deployment_repository() {
        let harness = harness();
        let result = harness.resolver.task_from_url(TASK_URL).await.unwrap();

        assert_eq!(result.resolved_task_id, "ServerTasks-456");
        assert_eq!(result.resolved_space_name, "Default");
        assert_eq!(result.url_info.extracted_task_id.as_deref(), Some("ServerTasks-456"));
        assert_eq!(result.url_info.extracted_deployment_id, None);
        assert_eq!(result.url_info.resource_type, ResourceType::Task);
        assert_eq!(harness.deployments.calls.load(Ordering::SeqCst), 0);
        assert_eq!(harness.tasks.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deployment_url_falls_back_to_the_deployment_task_id() {
        let harness = harness();
        let result = harness.resolver.task_from_url(DEPLOYMENT_URL).await.unwrap();

        assert_eq!(result.resolved_task_id, "ServerTasks-789");
        assert_eq!(
            result.url_info.extracted_deployment_id.as_deref(),
            Some("Deployments-123")
        );
        assert_eq!(result.url_info.extracted_task_id, None);
        assert_eq!(harness.deployments.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deployment_without_task_id_is_a_distinct_error() {
        let mut deployment = sample_deployment();
        deployment.task_id = None;
        let harness = harness_with(
            StubDeployments::returning(deployment),
            StubReleases::returning("1.2.3"),
        );
        let err = harness.resolver.task_from_url(DEPLOYMENT_URL).await.unwrap_err();

        assert!(matches!(err, OctopusError::TaskMissingFromDeployment { .. }));
        assert_eq!(harness.tasks.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn url_with_neither_task_nor_deployment_id_names_both_kinds() {
        let harness = harness();
        let err = harness.resolver.task_from_url(PROJECT_URL).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Could not extract task ID or deployment ID"));
        assert_eq!(harness.tasks.calls.load(Ordering::SeqCst), 0);
        assert_eq!(harness.deployments.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn space_name_is_cached_across_chain_invocations() {
        let harness = harness();
        harness.resolver.deployment_from_url(DEPLOYMENT_URL).await.unwrap();
        harness.resolver.task_from_url(TASK_URL).await.unwrap();
        assert_eq!(harness.spaces.calls.load(Ordering::SeqCst), 1);

        harness.resolver.clear_space_cache();
        harness.resolver.task_from_url(TASK_URL).await.unwrap();
        assert_eq!(harness.spaces.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn task_details_validates_format_before_any_fetch() {
        let harness = harness();
        let err = harness
            .resolver
            .task_details("Default", "Deployments-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OctopusError::InvalidIdFormat { entity: EntityKind::Task, .. }
        ));
        assert_eq!(harness.tasks.calls.load(Ordering::SeqCst), 0);

        let details = harness.resolver.task_details("Default", "ServerTasks-9").await.unwrap();
        assert_eq!(details.task.id, "ServerTasks-9");
    }

    #[test]
    fn template_expansion_leaves_unknown_placeholders() {
        let expanded = expand_url_template(
            "https://host/app#/{spaceId}/x/{mystery}",
            &[("spaceId", "Spaces-1")],
        );
        assert_eq!(expanded, "https://host/app#/Spaces-1/x/{mystery}");
    }
}
