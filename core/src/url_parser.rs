//! Octopus Deploy portal URL parsing.
//!
//! The web portal hash-routes everything: a deployment lives at a URL like
//! `https://host/app#/Spaces-1/projects/my-app/deployments/releases/1.2.3/deployments/Deployments-42`.
//! Parsing is pure string work with no I/O: the route keywords are matched
//! against the fragment segments, while identifier tokens are extracted from
//! the whole URL string because recognized portal shapes have placed the
//! space token on either side of the `#` depending on the server release.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use url::{Origin, Url};

use crate::error::{OctopusError, Result};

/// Resource classification inferred from a portal URL's route keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Deployment,
    Release,
    Project,
    Tenant,
    Task,
    Unknown,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Deployment => "deployment",
            Self::Release => "release",
            Self::Project => "project",
            Self::Tenant => "tenant",
            Self::Task => "task",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Structured parts recovered from a portal URL.
///
/// `resource_type` is driven by route keywords alone: a recognized keyword
/// sets it even when the identifier beside it fails to extract, in which
/// case `resource_id` stays `None`. `space_id`, when present, matches
/// `Spaces-\d+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub server_url: String,
    pub space_id: Option<String>,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    pub project_slug: Option<String>,
    pub release_version: Option<String>,
}

static SPACE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(Spaces-\d+)").expect("valid space id pattern"));
static DEPLOYMENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/deployments/(Deployments-\d+)").expect("valid deployment id pattern"));
static TASK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/tasks/(ServerTasks-\d+)").expect("valid task id pattern"));
static TENANT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/tenants/(Tenants-\d+)").expect("valid tenant id pattern"));
static PROJECT_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/projects/([^/]+)").expect("valid project slug pattern"));
static RELEASE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/releases/([^/]+)").expect("valid release version pattern"));

fn capture_first(re: &Regex, url: &str) -> Option<String> {
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract a `Spaces-<n>` token from anywhere in the URL string.
///
/// Deliberately not restricted to the hash fragment: older portal releases
/// put the space token in the path proper, newer ones in the fragment.
pub fn extract_space_id(url: &str) -> Option<String> {
    capture_first(&SPACE_ID_RE, url)
}

/// Extract a literal `Deployments-<n>` token from a `/deployments/` segment.
pub fn extract_deployment_id(url: &str) -> Option<String> {
    capture_first(&DEPLOYMENT_ID_RE, url)
}

/// Extract a literal `ServerTasks-<n>` token from a `/tasks/` segment.
pub fn extract_task_id(url: &str) -> Option<String> {
    capture_first(&TASK_ID_RE, url)
}

/// Extract a literal `Tenants-<n>` token from a `/tenants/` segment.
pub fn extract_tenant_id(url: &str) -> Option<String> {
    capture_first(&TENANT_ID_RE, url)
}

/// Extract the slug following a `/projects/` segment.
pub fn extract_project_slug(url: &str) -> Option<String> {
    capture_first(&PROJECT_SLUG_RE, url)
}

/// Extract the version token following a `/releases/` segment.
pub fn extract_release_version(url: &str) -> Option<String> {
    capture_first(&RELEASE_VERSION_RE, url)
}

/// Parse a portal URL into its structured parts.
///
/// Fails with `MalformedUrl` when the string cannot be parsed as a URL with
/// a host. Everything downstream of that is best-effort recognition of the
/// fixed set of portal route shapes; unrecognized routes come back with
/// `ResourceType::Unknown` rather than an error.
pub fn parse_portal_url(url: &str) -> Result<ParsedUrl> {
    let parsed = Url::parse(url).map_err(|err| OctopusError::MalformedUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;

    let server_url = match parsed.origin() {
        Origin::Tuple(..) => parsed.origin().ascii_serialization(),
        Origin::Opaque(_) => {
            return Err(OctopusError::MalformedUrl {
                url: url.to_string(),
                reason: "URL has no host".to_string(),
            });
        }
    };

    // Hash-routed path segments; the portal prefixes its fragment with `#/`.
    let segments: Vec<&str> = parsed
        .fragment()
        .unwrap_or("")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let space_id = extract_space_id(url);

    let mut resource_type = ResourceType::Unknown;
    let mut resource_id = None;
    let mut project_slug = None;
    let mut release_version = None;

    // Fixed keyword priority: deployments > tasks > projects > tenants.
    if segments.contains(&"deployments") {
        resource_type = ResourceType::Deployment;
        // A deployment URL's path contains both a release version and a
        // deployment id; the literal deployment id wins the tie.
        if let Some(deployment_id) = extract_deployment_id(url) {
            resource_id = Some(deployment_id);
        } else if let Some(version) = extract_release_version(url) {
            resource_type = ResourceType::Release;
            resource_id = Some(version.clone());
            release_version = Some(version);
        }
    } else if segments.contains(&"tasks") {
        resource_type = ResourceType::Task;
        resource_id = extract_task_id(url);
    } else if segments.contains(&"projects") {
        resource_type = ResourceType::Project;
        project_slug = extract_project_slug(url);
    } else if segments.contains(&"tenants") {
        resource_type = ResourceType::Tenant;
        resource_id = extract_tenant_id(url);
    }

    Ok(ParsedUrl {
        server_url,
        space_id,
        resource_type,
        resource_id,
        project_slug,
        release_version,
    })
}
