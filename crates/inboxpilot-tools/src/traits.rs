//! Core tool-surface trait and supporting types.
//!
//! A tool surface is a set of named operations an orchestrating agent may
//! invoke with JSON parameters.  The orchestrator discovers operations via
//! [`ToolSurface::tools`] and executes them via [`ToolSurface::execute_tool`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A tool exposed by a surface that the agent can invoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Machine-readable tool name (e.g. `email_summarize`).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema describing the tool's input parameters.
    pub parameters: serde_json::Value,
}

/// The health status of a tool surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// All collaborators are configured and usable.
    Healthy,
    /// Some operations work but a collaborator is missing.
    Degraded,
    /// No operation can succeed.
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Authentication requirements for a tool surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequirement {
    /// The credential provider name (e.g. `google`).
    pub provider: String,
    /// The scopes or permissions required.
    pub scopes: Vec<String>,
}

/// The universal tool-surface interface.
///
/// `execute_tool` answers with a result envelope for every operational
/// outcome; an `Err` means the call itself was malformed (unknown tool,
/// bad parameter shape), never that the operation failed.
#[async_trait]
pub trait ToolSurface: Send + Sync {
    /// Return the unique identifier for this surface instance.
    fn id(&self) -> &str;

    /// Return the list of tools this surface exposes.
    fn tools(&self) -> Vec<ToolDefinition>;

    /// Execute a named tool with the given JSON parameters.
    async fn execute_tool(&self, name: &str, params: serde_json::Value)
    -> Result<serde_json::Value>;

    /// Check whether the surface's collaborators are available.
    async fn health_check(&self) -> HealthStatus;

    /// Return the authentication requirements for this surface, if any.
    fn required_auth(&self) -> Option<AuthRequirement>;
}
