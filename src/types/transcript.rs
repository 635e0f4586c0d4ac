use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
    ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
    ChatCompletionToolType, FunctionCall,
};

/// A tool call emitted by the model. `arguments` is the raw JSON payload,
/// parsed only once the call reaches the tool catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    User(String),
    Assistant {
        content: Option<String>,
        tool_requests: Vec<ToolRequest>,
    },
    ToolResult {
        tool_call_id: String,
        content: String,
    },
}

/// Append-only conversation log, sent in full on every request.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn to_messages(&self) -> Vec<ChatCompletionRequestMessage> {
        self.turns.iter().map(ChatCompletionRequestMessage::from).collect()
    }
}

impl From<&ToolRequest> for ChatCompletionMessageToolCall {
    fn from(request: &ToolRequest) -> Self {
        ChatCompletionMessageToolCall {
            id: request.id.clone(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: request.name.clone(),
                arguments: request.arguments.clone(),
            },
        }
    }
}

impl From<ChatCompletionMessageToolCall> for ToolRequest {
    fn from(call: ChatCompletionMessageToolCall) -> Self {
        ToolRequest {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        }
    }
}

impl From<&Turn> for ChatCompletionRequestMessage {
    fn from(turn: &Turn) -> Self {
        match turn {
            Turn::User(text) => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(text.clone()),
                    name: None,
                })
            }
            Turn::Assistant {
                content,
                tool_requests,
            } => ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: content
                    .clone()
                    .map(ChatCompletionRequestAssistantMessageContent::Text),
                tool_calls: if tool_requests.is_empty() {
                    None
                } else {
                    Some(tool_requests.iter().map(Into::into).collect())
                },
                ..Default::default()
            }),
            Turn::ToolResult {
                tool_call_id,
                content,
            } => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                content: ChatCompletionRequestToolMessageContent::Text(content.clone()),
                tool_call_id: tool_call_id.clone(),
            }),
        }
    }
}
