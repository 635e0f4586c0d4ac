use super::tool_object::{SyncToolObject, ToolTraitObject};
use super::types::*;
use crate::types::Tool;

use async_openai::types::ChatCompletionTool;
use schemars::JsonSchema;
use serde::de::Deserialize;
use std::collections::hash_map::HashMap;
use std::panic::{self, AssertUnwindSafe};

/// The tool catalog: built once at startup, read-only afterwards.
pub struct SyncToolSet<C> {
    tools: HashMap<String, SyncToolObject<C>>,
}

impl<C> Default for SyncToolSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SyncToolSet<C> {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    // the shipped catalog is empty, so only tests register tools
    #[allow(dead_code)]
    pub fn add_tool<T>(mut self) -> Result<Self, ToolSetCreationError>
    where
        T: JsonSchema + Tool<Context = C> + for<'de> Deserialize<'de> + 'static + Send + Sync,
    {
        let tool_object =
            SyncToolObject::try_from_tool::<T>().map_err(ToolSetCreationError::Validation)?;
        if self.tools.contains_key(&tool_object.name) {
            Err(ToolSetCreationError::NameConflict(tool_object.name.clone()))
        } else {
            self.tools.insert(tool_object.name.clone(), tool_object);
            Ok(self)
        }
    }

    /// Look up the named tool and parse `json` into it, without running it.
    pub fn prepare_call(
        &self,
        tool_name: &str,
        json: &str,
    ) -> Result<PreparedCall<C>, ToolCallError> {
        self.tools
            .get(tool_name)
            .ok_or_else(|| ToolCallError::NotFound(tool_name.to_owned()))
            .and_then(|tool| {
                tool.try_deserialize(json)
                    .map_err(ToolCallError::Deserialization)
            })
            .map(|tool| PreparedCall { tool })
    }

    /// Schemas advertised to the model, ordered by tool name.
    pub fn openai_chatcompletion_toolset(&self) -> Vec<ChatCompletionTool> {
        let mut objects: Vec<_> = self.tools.values().collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        objects.into_iter().map(ChatCompletionTool::from).collect()
    }
}

/// A tool whose arguments parsed successfully, ready to run.
pub struct PreparedCall<C> {
    tool: ToolTraitObject<C>,
}

impl<C> PreparedCall<C> {
    /// Run the tool. Panics inside it are caught and reported as
    /// [`ToolCallError::Panicked`].
    pub fn run(self, context: C) -> Result<String, ToolCallError> {
        let tool = self.tool;
        match panic::catch_unwind(AssertUnwindSafe(|| tool.apply(context))) {
            Ok(result) => result.map_err(ToolCallError::Execution),
            Err(payload) => {
                let detail = if let Some(s) = payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_string()
                };
                Err(ToolCallError::Panicked(detail))
            }
        }
    }
}
