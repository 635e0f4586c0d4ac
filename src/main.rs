mod client;
mod config;
mod telemetry;
mod types;

use client::cli::{Agent, StdinInput};
use client::completion::OpenAiCompletion;
use config::Config;
use types::{SyncToolSet, Turn};

use anyhow::Result;
use std::future::Future;

fn main() {
    telemetry::init_telemetry();
    let result = block_on_detached(run()).and_then(|result| result);
    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

/// Run `future` to completion on a fresh runtime, then shut the runtime down
/// without waiting on blocking work. A stdin read abandoned by Ctrl-C sits on
/// the blocking pool and would otherwise keep the process alive until Enter.
fn block_on_detached<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    tracing::info!(model = %config.model, "starting chat");

    // no tools are registered yet
    let toolset = SyncToolSet::new();

    let completion = OpenAiCompletion::new(&config);
    let mut agent = Agent::new(completion, StdinInput::new(), toolset);
    let result = agent.run().await;

    let transcript = agent.transcript();
    let tool_results = transcript
        .turns()
        .iter()
        .filter(|turn| matches!(turn, Turn::ToolResult { .. }))
        .count();
    tracing::info!(turns = transcript.len(), tool_results, "session ended");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[test]
    fn returns_without_waiting_for_stuck_blocking_reads() {
        let (release, stuck) = mpsc::channel::<()>();
        let started = Instant::now();

        let output = block_on_detached(async move {
            // stands in for a stdin read nobody will ever complete
            drop(tokio::task::spawn_blocking(move || stuck.recv()));
            tokio::task::yield_now().await;
            "done"
        })
        .unwrap();

        assert_eq!(output, "done");
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(release);
    }
}
