mod tool;
mod toolset;
mod transcript;

pub use tool::{NoContext, Tool};
pub use toolset::{SyncToolSet, ToolCallError};
pub use transcript::{ToolRequest, Transcript, Turn};
