use async_trait::async_trait;
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

const BLUE: &str = "\x1B[94m";
const YELLOW: &str = "\x1B[93m";
const GREEN: &str = "\x1B[92m";
const RESET: &str = "\x1B[0m";

/// Where user utterances come from. `None` signals end of input.
#[async_trait]
pub trait InputSource {
    async fn next_line(&mut self) -> Option<String>;
}

/// Line-oriented input with a prompt. Ctrl-C while waiting ends the input.
pub struct LineInput<R> {
    reader: R,
}

pub type StdinInput = LineInput<BufReader<Stdin>>;

impl StdinInput {
    pub fn new() -> Self {
        LineInput::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn from_reader(reader: R) -> Self {
        LineInput { reader }
    }

    async fn read_user_input<F>(&mut self, interrupt: F) -> std::io::Result<Option<String>>
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let mut output = tokio::io::stdout();
        output
            .write_all(format!("{BLUE}You{RESET}: ").as_bytes())
            .await?;
        output.flush().await?;

        let mut buffer = String::new();
        tokio::select! {
            read = self.reader.read_line(&mut buffer) => {
                if read? == 0 {
                    return Ok(None);
                }
            }
            // a failed signal registration disables this branch
            Ok(()) = interrupt => {
                output.write_all(b"\n").await?;
                return Ok(None);
            }
        }
        Ok(Some(strip_line_ending(buffer)))
    }
}

#[async_trait]
impl<R> InputSource for LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_line(&mut self) -> Option<String> {
        self.read_user_input(tokio::signal::ctrl_c())
            .await
            .inspect_err(|err| tracing::warn!(%err, "input unreadable, ending session"))
            .ok()
            .flatten()
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

pub fn print_banner(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Chat with GPT (use 'ctrl-c' to quit)")
}

pub fn print_assistant(out: &mut dyn Write, content: &str) -> std::io::Result<()> {
    writeln!(out, "{YELLOW}GPT{RESET}: {content}")
}

pub fn print_tool_call(out: &mut dyn Write, name: &str, arguments: &str) -> std::io::Result<()> {
    writeln!(out, "{GREEN}tool{RESET}: {name}({arguments})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn strips_only_the_trailing_newline() {
        assert_eq!(strip_line_ending("hi\n".into()), "hi");
        assert_eq!(strip_line_ending("hi\r\n".into()), "hi");
        assert_eq!(strip_line_ending("  hi  \n".into()), "  hi  ");
        assert_eq!(strip_line_ending("\n".into()), "");
        assert_eq!(strip_line_ending("no newline".into()), "no newline");
    }

    #[tokio::test]
    async fn yields_lines_then_end_of_input() {
        let mut input = LineInput::from_reader(&b"hi\n\nlast"[..]);
        assert_eq!(input.next_line().await.as_deref(), Some("hi"));
        assert_eq!(input.next_line().await.as_deref(), Some(""));
        assert_eq!(input.next_line().await.as_deref(), Some("last"));
        assert_eq!(input.next_line().await, None);
    }

    #[tokio::test]
    async fn empty_input_is_end_of_input() {
        let mut input = LineInput::from_reader(&b""[..]);
        assert_eq!(input.next_line().await, None);
    }

    #[tokio::test]
    async fn read_error_is_end_of_input() {
        let mut input = LineInput::from_reader(&b"\xff\xfe\n"[..]);
        assert_eq!(input.next_line().await, None);
    }

    #[tokio::test]
    async fn interrupt_ends_a_pending_read() {
        let (reader, _writer) = tokio::io::duplex(64);
        let mut input = LineInput::from_reader(BufReader::new(reader));

        let line = input.read_user_input(async { Ok(()) }).await.unwrap();

        assert_eq!(line, None);
    }

    #[tokio::test]
    async fn failed_interrupt_registration_keeps_reading() {
        let (reader, mut writer) = tokio::io::duplex(64);
        writer.write_all(b"still here\n").await.unwrap();
        let mut input = LineInput::from_reader(BufReader::new(reader));

        let interrupt = async { Err(std::io::Error::other("no signal driver")) };
        let line = input.read_user_input(interrupt).await.unwrap();

        assert_eq!(line.as_deref(), Some("still here"));
    }

    #[tokio::test]
    async fn reads_without_interrupt() {
        let mut input = LineInput::from_reader(&b"hello\r\n"[..]);
        let line = input.read_user_input(pending()).await.unwrap();
        assert_eq!(line.as_deref(), Some("hello"));
    }

    #[test]
    fn tool_trace_names_call_and_arguments() {
        let mut out = Vec::new();
        print_tool_call(&mut out, "echo", r#"{"text":"hi"}"#).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1B[92mtool\x1B[0m: echo({\"text\":\"hi\"})\n"
        );
    }
}
