//! Client configuration from the environment.
//!
//! The server talks to exactly one Octopus Deploy instance, identified by
//! `OCTOPUS_SERVER_URL` and authenticated with `OCTOPUS_API_KEY`. Both are
//! required; there is no config file layer.

use std::env;

use url::Url;

use crate::error::{OctopusError, Result};

/// Environment variable naming the instance base URL.
pub const SERVER_URL_ENV: &str = "OCTOPUS_SERVER_URL";
/// Environment variable carrying the API key.
pub const API_KEY_ENV: &str = "OCTOPUS_API_KEY";
/// Application name reported in the User-Agent header.
pub const USER_AGENT_APP: &str = "octopus-mcp-server";

/// Connection settings for one Octopus Deploy instance.
#[derive(Debug, Clone)]
pub struct OctopusConfig {
    pub server_url: Url,
    pub api_key: String,
}

impl OctopusConfig {
    /// Build a configuration from explicit values, validating the base URL.
    pub fn new(server_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let server_url = Url::parse(server_url).map_err(|err| {
            OctopusError::Config(format!("Invalid {SERVER_URL_ENV} '{server_url}': {err}"))
        })?;
        if server_url.host_str().is_none() {
            return Err(OctopusError::Config(format!(
                "Invalid {SERVER_URL_ENV} '{server_url}': URL has no host"
            )));
        }
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(OctopusError::Config(format!("{API_KEY_ENV} must not be empty")));
        }
        Ok(Self {
            server_url,
            api_key,
        })
    }

    /// Load configuration from `OCTOPUS_SERVER_URL` and `OCTOPUS_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let server_url = env::var(SERVER_URL_ENV).ok().filter(|value| !value.is_empty());
        let api_key = env::var(API_KEY_ENV).ok().filter(|value| !value.is_empty());
        match (server_url, api_key) {
            (Some(server_url), Some(api_key)) => Self::new(&server_url, api_key),
            _ => Err(OctopusError::Config(format!(
                "Environment variables {SERVER_URL_ENV} and {API_KEY_ENV} must be set."
            ))),
        }
    }

    /// Instance base URL without a trailing slash, for route composition.
    pub fn instance_url(&self) -> String {
        self.server_url.as_str().trim_end_matches('/').to_string()
    }
}
