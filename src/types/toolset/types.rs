use super::tool_object::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolSetCreationError {
    #[error("error validating schema: {0}")]
    Validation(ValidationError),
    #[error("two or more tools are named '{0}'")]
    NameConflict(String),
}

#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("tool not in toolset: {0}")]
    NotFound(String),
    #[error("invalid arguments (possible hallucination): {0}")]
    Deserialization(serde_json::Error),
    #[error("{0}")]
    Execution(anyhow::Error),
    #[error("tool panicked: {0}")]
    Panicked(String),
}
