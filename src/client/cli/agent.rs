use super::io::{InputSource, print_assistant, print_banner, print_tool_call};

use crate::client::completion::CompletionService;
use crate::types::{NoContext, SyncToolSet, ToolCallError, ToolRequest, Transcript, Turn};

use anyhow::{Context, Result};
use async_openai::types::ChatCompletionTool;
use std::io::Write;

/// Tool result sent back to the model when it asks for a tool we don't have.
pub const TOOL_NOT_FOUND: &str = "Tool not found";

enum State {
    AwaitingUserInput,
    AwaitingModelReply,
    ProcessingToolCalls(Vec<ToolRequest>),
    Done,
}

/// The conversation loop: reads user turns, queries the model, and runs
/// requested tools until the input source is exhausted.
pub struct Agent<S, I> {
    completion: S,
    input: I,
    toolset: SyncToolSet<NoContext>,
    transcript: Transcript,
    output: Box<dyn Write>,
}

impl<S, I> Agent<S, I>
where
    S: CompletionService,
    I: InputSource,
{
    pub fn new(completion: S, input: I, toolset: SyncToolSet<NoContext>) -> Self {
        Agent {
            completion,
            input,
            toolset,
            transcript: Transcript::new(),
            output: Box::new(std::io::stdout()),
        }
    }

    /// Send replies and tool traces somewhere other than stdout.
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Drive the conversation until end of input. A failed completion
    /// request ends the session with an error.
    pub async fn run(&mut self) -> Result<()> {
        print_banner(&mut self.output)?;
        let tools = self.toolset.openai_chatcompletion_toolset();

        let mut state = State::AwaitingUserInput;
        loop {
            state = match state {
                State::AwaitingUserInput => match self.input.next_line().await {
                    Some(line) => {
                        self.transcript.push(Turn::User(line));
                        State::AwaitingModelReply
                    }
                    None => State::Done,
                },
                State::AwaitingModelReply => self.chat_response(&tools).await?,
                State::ProcessingToolCalls(requests) => {
                    for request in &requests {
                        let content = self.execute_tool(request)?;
                        self.transcript.push(Turn::ToolResult {
                            tool_call_id: request.id.clone(),
                            content,
                        });
                    }
                    State::AwaitingModelReply
                }
                State::Done => {
                    if self.transcript.is_empty() {
                        tracing::debug!("input closed before the first message");
                    }
                    tracing::debug!("end of input");
                    return Ok(());
                }
            };
        }
    }

    async fn chat_response(&mut self, tools: &[ChatCompletionTool]) -> Result<State> {
        tracing::debug!(
            turns = self.transcript.len(),
            tools = tools.len(),
            "requesting completion"
        );
        let reply = self
            .completion
            .complete(&self.transcript, tools)
            .await
            .context("bad request")?;
        tracing::debug!(
            has_content = reply.content.is_some(),
            tool_requests = reply.tool_requests.len(),
            "reply received"
        );

        let next = if reply.tool_requests.is_empty() {
            if let Some(content) = reply.content.as_deref().filter(|c| !c.is_empty()) {
                print_assistant(&mut self.output, content)?;
            }
            State::AwaitingUserInput
        } else {
            State::ProcessingToolCalls(reply.tool_requests.clone())
        };

        self.transcript.push(Turn::Assistant {
            content: reply.content,
            tool_requests: reply.tool_requests,
        });
        Ok(next)
    }

    /// Run one tool request. Failures become the tool's result text so the
    /// model can see them; they never end the loop. The trace line is only
    /// shown once the arguments have parsed.
    fn execute_tool(&mut self, request: &ToolRequest) -> Result<String> {
        tracing::info!(
            tool = %request.name,
            arguments = %request.arguments,
            "invoking tool"
        );

        let result = match self.toolset.prepare_call(&request.name, &request.arguments) {
            Ok(call) => {
                print_tool_call(&mut self.output, &request.name, &request.arguments)?;
                call.run(NoContext())
            }
            Err(err) => Err(err),
        };

        Ok(match result {
            Ok(result) => result,
            Err(ToolCallError::NotFound(name)) => {
                tracing::warn!(tool = %name, "model requested unknown tool");
                TOOL_NOT_FOUND.to_string()
            }
            Err(err) => {
                tracing::warn!(tool = %request.name, error = %err, "tool call failed");
                format!("Error executing tool: {err}")
            }
        })
    }
}
