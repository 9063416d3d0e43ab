use async_trait::async_trait;
use tracing::debug;

use crate::{daemon::error::CaptureError, utils::shell::shell_command};

/// Intended to serve as a contract for anything able to describe what the user is doing right
/// now. Called once per sampler tick.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityCapture: Send + Sync {
    async fn capture(&self) -> Result<String, CaptureError>;
}

/// Runs a user supplied shell command and takes its trimmed stdout as the description. Any tool
/// works here, from `xdotool getactivewindow getwindowname` to a screenshot piped through OCR.
pub struct CommandCapture {
    command: String,
}

impl CommandCapture {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl ActivityCapture for CommandCapture {
    async fn capture(&self) -> Result<String, CaptureError> {
        let output = shell_command(&self.command).output().await?;

        if !output.status.success() {
            return Err(CaptureError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let description = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Captured {description:?}");
        if description.is_empty() {
            return Err(CaptureError::Empty);
        }
        Ok(description)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::daemon::error::CaptureError;

    use super::{ActivityCapture, CommandCapture};

    #[tokio::test]
    async fn test_stdout_becomes_description() {
        let capture = CommandCapture::new("echo '  Excel - Acme Q3 ledger.xlsx  '");
        assert_eq!(capture.capture().await.unwrap(), "Excel - Acme Q3 ledger.xlsx");
    }

    #[tokio::test]
    async fn test_failing_command_is_an_error() {
        let capture = CommandCapture::new("echo 'no display' >&2; exit 3");
        match capture.capture().await {
            Err(CaptureError::Failed { stderr, .. }) => assert_eq!(stderr, "no display"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_output_is_an_error() {
        let capture = CommandCapture::new("printf '   \\n'");
        assert!(matches!(capture.capture().await, Err(CaptureError::Empty)));
    }
}
