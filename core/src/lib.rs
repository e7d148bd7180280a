//! Core library for the Octopus Deploy MCP server.
//!
//! Turns opaque portal URLs into fully-resolved entity contexts: parse the
//! URL, recover the structured identifiers it encodes, resolve the space id
//! to a display name through a TTL cache, and walk the fallback chain of
//! remote lookups needed to compose a consistent result. Also carries the
//! API client and configuration the server binary wires together.

// Library code must not write to stdout: in the server binary, stdout is
// the MCP transport. Diagnostics go through tracing (stderr).
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod client;
pub mod config;
pub mod entity_id;
pub mod error;
pub mod model;
pub mod repositories;
pub mod resolution;
pub mod space_resolver;
pub mod url_parser;

pub use client::OctopusClient;
pub use config::OctopusConfig;
pub use entity_id::EntityKind;
pub use error::{OctopusError, Result};
pub use resolution::UrlResolver;
pub use space_resolver::SpaceNameResolver;
pub use url_parser::{ParsedUrl, ResourceType, parse_portal_url};
