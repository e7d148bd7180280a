//! Error taxonomy for URL resolution and Octopus Deploy API access.
//!
//! Shape and format errors (`MalformedUrl`, `MissingSpaceId`,
//! `MissingResourceId`, `IdRequired`, `InvalidIdFormat`) are raised before
//! any network call. Remote errors carry structured context instead of raw
//! transport text so callers can branch on kind rather than string-match on
//! messages; classification happens once, at the client boundary.

use thiserror::Error;

use crate::entity_id::EntityKind;
use crate::url_parser::ResourceType;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OctopusError>;

#[derive(Debug, Error)]
pub enum OctopusError {
    /// The input string could not be parsed as a URL at all.
    #[error("Failed to parse Octopus URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// A recognized URL carried no `Spaces-<n>` token anywhere.
    #[error(
        "Could not extract space ID from URL. URL must contain a space identifier like 'Spaces-1234'"
    )]
    MissingSpaceId,

    /// The URL parsed but did not contain the identifier the operation needs.
    /// `sought` lists every entity kind whose extraction was attempted, in
    /// order; `found` is the resource type inferred from the URL shape.
    #[error("{}", missing_resource_message(.sought, .found))]
    MissingResourceId {
        sought: &'static [EntityKind],
        found: ResourceType,
    },

    /// An identifier was absent where one is required.
    #[error(
        "{} ID is required. Use {} to find {} IDs.",
        .entity.title(), .entity.list_tool(), .entity.label()
    )]
    IdRequired { entity: EntityKind },

    /// An identifier was present but lacks the prefix its entity kind requires.
    #[error(
        "Invalid {} ID format '{id}'. {} IDs should start with '{}' followed by numbers. Use {} to find valid {} IDs.",
        .entity.label(), .entity.title(), .entity.id_prefix(), .entity.list_tool(), .entity.label()
    )]
    InvalidIdFormat { entity: EntityKind, id: String },

    /// A deployment resolved from a URL carries no server task reference.
    /// Distinct from `MissingResourceId`: the URL shape was valid and the
    /// deployment exists, but its record is incomplete.
    #[error(
        "Deployment '{deployment_id}' in space '{space_name}' does not reference a server task. \
         The deployment record is incomplete; its task may not have been queued yet."
    )]
    TaskMissingFromDeployment {
        deployment_id: String,
        space_name: String,
    },

    /// The remote said the entity does not exist (HTTP 404).
    #[error("{}", not_found_message(.entity, .id, .space_name, .help))]
    NotFound {
        entity: EntityKind,
        id: String,
        space_name: String,
        help: Option<String>,
    },

    /// No space with the given name or id exists on the instance.
    #[error(
        "Space '{name}' not found. Use list_spaces to see available spaces. \
         Space names are case-sensitive."
    )]
    SpaceNotFound { name: String },

    /// The instance rejected our credentials (HTTP 401/403).
    #[error(
        "Authentication failed. Ensure OCTOPUS_API_KEY environment variable is set with a valid \
         API key. You can generate an API key from your Octopus Deploy user profile. ({detail})"
    )]
    Auth { detail: String },

    /// The instance could not be reached at the transport layer.
    #[error(
        "Cannot connect to Octopus Deploy instance. Check that OCTOPUS_SERVER_URL environment \
         variable is set correctly (e.g., 'https://your-instance.octopus.app') and that the \
         instance is accessible. ({detail})"
    )]
    Connectivity { detail: String },

    /// The instance answered with a non-success status not covered above.
    #[error("Octopus Deploy API returned HTTP {status}: {detail}")]
    UpstreamStatus { status: u16, detail: String },

    /// A success response carried a body we could not decode.
    #[error("Unexpected response from Octopus Deploy API: {detail}")]
    UnexpectedResponse { detail: String },

    /// Invalid or missing client configuration.
    #[error("{0}")]
    Config(String),
}

impl OctopusError {
    /// Attach contextual help text to a `NotFound` error. Other variants are
    /// returned unchanged; help is only meaningful where a lookup target
    /// exists to talk about.
    pub fn with_help(self, help: impl Into<String>) -> Self {
        match self {
            Self::NotFound {
                entity,
                id,
                space_name,
                ..
            } => Self::NotFound {
                entity,
                id,
                space_name,
                help: Some(help.into()),
            },
            other => other,
        }
    }
}

fn missing_resource_message(sought: &[EntityKind], found: &ResourceType) -> String {
    let ids = sought
        .iter()
        .map(|kind| format!("{} ID", kind.label()))
        .collect::<Vec<_>>()
        .join(" or ");
    let identifiers = sought
        .iter()
        .map(|kind| format!("a {} identifier ({}XXXXX)", kind.label(), kind.id_prefix()))
        .collect::<Vec<_>>()
        .join(" or ");
    format!(
        "Could not extract {ids} from URL. URL must contain {identifiers}. \
         The provided URL appears to be: {found}"
    )
}

fn not_found_message(
    entity: &EntityKind,
    id: &str,
    space_name: &str,
    help: &Option<String>,
) -> String {
    let guidance = match help {
        Some(text) => text.clone(),
        None => format!(
            "Verify the {} ID is correct using {}.",
            entity.label(),
            entity.list_tool()
        ),
    };
    format!(
        "{} '{id}' not found in space '{space_name}'. {guidance}",
        entity.title()
    )
}
