//! Reqwest-backed client for the Octopus Deploy REST API.
//!
//! Implements the repository traits the resolution chains consume. All
//! transport and status classification happens here, at the collaborator
//! boundary — downstream code branches on error kind, never on message
//! text. No retries at any layer; a transient failure surfaces immediately.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::{OctopusConfig, USER_AGENT_APP};
use crate::entity_id::EntityKind;
use crate::error::{OctopusError, Result};
use crate::model::{Deployment, Release, ResourceCollection, Space, TaskDetails};
use crate::repositories::{
    DeploymentRepository, ReleaseRepository, SpaceDirectory, TaskRepository,
};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// What a request was looking for, for 404 classification.
enum Lookup {
    Entity {
        kind: EntityKind,
        id: String,
        space_name: String,
    },
    Space {
        name: String,
    },
    Collection,
}

/// Error body shape the API returns alongside non-success statuses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Authenticated client for one Octopus Deploy instance.
pub struct OctopusClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OctopusClient {
    pub fn new(config: &OctopusConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("{USER_AGENT_APP}/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| OctopusError::Config(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: config.instance_url(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        lookup: Lookup,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "octopus api request");

        let mut request = self.http.get(url.as_str()).header(API_KEY_HEADER, &self.api_key);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|err| OctopusError::Connectivity {
            detail: err.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| OctopusError::UnexpectedResponse {
                    detail: err.to_string(),
                });
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, &body, lookup))
    }

    /// Resolve a space display name to its id via the directory endpoint.
    ///
    /// The API scopes most routes by space *id* while callers address spaces
    /// by name; the partial-name query narrows the candidate set and the
    /// exact (case-sensitive) match picks the winner.
    async fn space_id_for_name(&self, space_name: &str) -> Result<String> {
        let spaces: ResourceCollection<Space> = self
            .get_json(
                "/api/spaces",
                &[
                    ("partialName", space_name.to_string()),
                    ("take", "100".to_string()),
                ],
                Lookup::Collection,
            )
            .await?;
        spaces
            .items
            .into_iter()
            .find(|space| space.name == space_name)
            .map(|space| space.id)
            .ok_or_else(|| OctopusError::SpaceNotFound {
                name: space_name.to_string(),
            })
    }
}

fn classify_status(status: StatusCode, body: &str, lookup: Lookup) -> OctopusError {
    let detail = error_detail(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => OctopusError::Auth { detail },
        StatusCode::NOT_FOUND => match lookup {
            Lookup::Entity {
                kind,
                id,
                space_name,
            } => OctopusError::NotFound {
                entity: kind,
                id,
                space_name,
                help: None,
            },
            Lookup::Space { name } => OctopusError::SpaceNotFound { name },
            Lookup::Collection => OctopusError::UpstreamStatus {
                status: status.as_u16(),
                detail,
            },
        },
        _ => OctopusError::UpstreamStatus {
            status: status.as_u16(),
            detail,
        },
    }
}

fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = parsed.error_message {
            if parsed.errors.is_empty() {
                return message;
            }
            return format!("{message} ({})", parsed.errors.join("; "));
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl SpaceDirectory for OctopusClient {
    async fn get_space(&self, space_id: &str) -> Result<Space> {
        self.get_json(
            &format!("/api/spaces/{space_id}"),
            &[],
            Lookup::Space {
                name: space_id.to_string(),
            },
        )
        .await
    }

    async fn list_spaces(
        &self,
        partial_name: Option<&str>,
        skip: Option<u32>,
        take: Option<u32>,
    ) -> Result<ResourceCollection<Space>> {
        let mut query = Vec::new();
        if let Some(partial) = partial_name {
            query.push(("partialName", partial.to_string()));
        }
        if let Some(skip) = skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(take) = take {
            query.push(("take", take.to_string()));
        }
        self.get_json("/api/spaces", &query, Lookup::Collection).await
    }
}

#[async_trait]
impl DeploymentRepository for OctopusClient {
    async fn get_deployment(&self, space_name: &str, deployment_id: &str) -> Result<Deployment> {
        let space_id = self.space_id_for_name(space_name).await?;
        self.get_json(
            &format!("/api/{space_id}/deployments/{deployment_id}"),
            &[],
            Lookup::Entity {
                kind: EntityKind::Deployment,
                id: deployment_id.to_string(),
                space_name: space_name.to_string(),
            },
        )
        .await
    }
}

#[async_trait]
impl ReleaseRepository for OctopusClient {
    async fn get_release(&self, space_name: &str, release_id: &str) -> Result<Release> {
        let space_id = self.space_id_for_name(space_name).await?;
        self.get_json(
            &format!("/api/{space_id}/releases/{release_id}"),
            &[],
            Lookup::Entity {
                kind: EntityKind::Release,
                id: release_id.to_string(),
                space_name: space_name.to_string(),
            },
        )
        .await
    }
}

#[async_trait]
impl TaskRepository for OctopusClient {
    async fn get_task_details(&self, space_name: &str, task_id: &str) -> Result<TaskDetails> {
        let space_id = self.space_id_for_name(space_name).await?;
        self.get_json(
            &format!("/api/{space_id}/tasks/{task_id}/details"),
            &[],
            Lookup::Entity {
                kind: EntityKind::Task,
                id: task_id.to_string(),
                space_name: space_name.to_string(),
            },
        )
        .await
    }
}
