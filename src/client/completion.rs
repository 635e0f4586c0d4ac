use crate::config::Config;
use crate::types::{ToolRequest, Transcript};

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionResponseMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("completion response had no choices")]
    EmptyResponse,
}

/// One model turn: optional text plus any tool calls, in the order the model
/// emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: Option<String>,
    pub tool_requests: Vec<ToolRequest>,
}

impl From<ChatCompletionResponseMessage> for Reply {
    fn from(message: ChatCompletionResponseMessage) -> Self {
        Reply {
            content: message.content,
            tool_requests: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(ToolRequest::from)
                .collect(),
        }
    }
}

#[async_trait]
pub trait CompletionService {
    async fn complete(
        &self,
        transcript: &Transcript,
        tools: &[ChatCompletionTool],
    ) -> Result<Reply, CompletionError>;
}

pub struct OpenAiCompletion {
    inner: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(config: &Config) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base) = &config.api_base {
            openai_config = openai_config.with_api_base(base);
        }
        OpenAiCompletion {
            inner: Client::with_config(openai_config),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(
        &self,
        transcript: &Transcript,
        tools: &[ChatCompletionTool],
    ) -> Result<Reply, CompletionError> {
        let request = build_request(&self.model, transcript, tools)?;
        let response = self.inner.chat().create(request).await?;
        tracing::debug!(id = %response.id, usage = ?response.usage, "completion received");
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| Reply::from(choice.message))
            .ok_or(CompletionError::EmptyResponse)
    }
}

/// The tool fields are only set when there is something to advertise.
pub fn build_request(
    model: &str,
    transcript: &Transcript,
    tools: &[ChatCompletionTool],
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(model).messages(transcript.to_messages()).n(1);
    if !tools.is_empty() {
        args.tools(tools.to_vec())
            .tool_choice(ChatCompletionToolChoiceOption::Auto);
    }
    args.build()
}
