use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Specification of a tool available to the research agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

/// A tool invocation chosen by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_id: String,
    pub input: String,
}

/// A named text-in/text-out capability.
///
/// Failures are returned as-is; callers decide whether they are recoverable.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn call(&self, input: &str) -> Result<String, ToolError>;
}

/// Unreliable outbound web search.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, ToolError>;
}
