mod tool_object;
mod toolset;
mod types;

pub use toolset::SyncToolSet;
pub use types::ToolCallError;
