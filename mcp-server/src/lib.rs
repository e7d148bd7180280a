//! stdio MCP server exposing Octopus Deploy URL-resolution tools.

mod server;

pub use server::OctopusMcpServer;
