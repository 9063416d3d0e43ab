use std::{io::ErrorKind, process::Stdio};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{
    daemon::{error::SummarizeError, storage::entities::SampleWindow},
    utils::shell::shell_command,
};

/// Turns a full window of samples into a short description of the work done. In practice this
/// is a call to an LLM; it may be slow and it may fail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, window: &SampleWindow) -> Result<String, SummarizeError>;
}

/// Pipes the window into a shell command as a JSON array of samples and reads the summary
/// from its stdout. The command is where the LLM client lives.
pub struct CommandSummarizer {
    command: String,
}

impl CommandSummarizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Summarizer for CommandSummarizer {
    async fn summarize(&self, window: &SampleWindow) -> Result<String, SummarizeError> {
        let payload = serde_json::to_vec(window)?;

        let mut child = shell_command(&self.command)
            .stdin(Stdio::piped())
            .spawn()?;

        // Stdin is dropped once written, closing the pipe so the command sees end of input.
        let stdin = child.stdin.take();
        let write = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(&payload).await {
                // The command may answer without reading all of its input.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("Summarize command closed stdin early");
                    Ok(())
                }
                result => result,
            }
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;
        written?;
        if !output.status.success() {
            return Err(SummarizeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let summary = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Summarized {} samples into {summary:?}", window.len());
        if summary.is_empty() {
            return Err(SummarizeError::Empty);
        }
        Ok(summary)
    }
}
