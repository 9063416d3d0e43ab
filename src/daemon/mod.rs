use std::path::PathBuf;

use anyhow::Result;
use args::DaemonArgs;
use collection::{
    capture::{ActivityCapture, CommandCapture},
    sampler::{ActivitySampler, SamplerConfig},
};
use processing::summarize::{CommandSummarizer, Summarizer};
use storage::summary_storage::{SummarySink, SummaryStorageImpl};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::utils::clock::{Clock, DefaultClock};

pub mod args;
pub mod collection;
pub mod error;
pub mod processing;
pub mod shutdown;
pub mod storage;

pub const SUMMARY_DIR: &str = "summaries";

/// Represents the starting point for the daemon. Samples until the process is asked to stop.
pub async fn start_daemon(dir: PathBuf, args: DaemonArgs) -> Result<()> {
    let storage = SummaryStorageImpl::new(dir.join(SUMMARY_DIR))?;

    let sampler = create_sampler(
        args.sampler_config(),
        CommandCapture::new(args.capture_command),
        CommandSummarizer::new(args.summarize_command),
        storage,
        DefaultClock,
    );

    let shutdown_token = CancellationToken::new();

    let (shutdown_result, _) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        run_sampler(&sampler, shutdown_token.clone()),
    );

    if let Err(shutdown_result) = shutdown_result {
        error!("Shutdown detection got an error {:?}", shutdown_result);
    }

    Ok(())
}

fn create_sampler(
    config: SamplerConfig,
    capture: impl ActivityCapture + 'static,
    summarizer: impl Summarizer + 'static,
    sink: impl SummarySink + 'static,
    clock: impl Clock,
) -> ActivitySampler {
    ActivitySampler::new(
        config,
        Box::new(capture),
        Box::new(summarizer),
        Box::new(sink),
        Box::new(clock),
    )
}

/// Keeps the sampler running until `shutdown` is cancelled.
async fn run_sampler(sampler: &ActivitySampler, shutdown: CancellationToken) {
    sampler.start();
    shutdown.cancelled().await;
    sampler.stop();
    let status = sampler.status();
    info!(
        "Sampler stopped, last message: {}",
        status.last_message.as_deref().unwrap_or("none")
    );
}

#[cfg(test)]
mod daemon_tests {
    use std::time::Duration;

    use anyhow::Result;
    use chrono::Utc;
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{
            collection::capture::MockActivityCapture,
            create_sampler,
            processing::summarize::MockSummarizer,
            run_sampler,
            storage::summary_storage::SummaryStorageImpl,
        },
        utils::{clock::DefaultClock, logging::TEST_LOGGING},
    };

    use super::collection::sampler::SamplerConfig;

    fn test_items() -> Vec<String> {
        vec![
            "Excel - Acme ledger.xlsx".into(),
            "Outlook - RE: Acme engagement".into(),
            "Word - Globex memo.docx".into(),
        ]
    }

    /// Smoke test wiring the sampler to real summary storage. Time is paused, so the five
    /// seconds pass instantly.
    #[tokio::test(start_paused = true)]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let mut capture = MockActivityCapture::new();
        let mut items = test_items().into_iter().cycle();
        capture
            .expect_capture()
            .returning(move || Ok(items.next().unwrap()))
            .times(4);

        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|window| {
                Ok(window
                    .samples()
                    .iter()
                    .map(|s| s.description.as_str())
                    .collect::<Vec<_>>()
                    .join("; "))
            })
            .times(2);

        let dir = tempdir()?;
        let storage = SummaryStorageImpl::new(dir.path().to_path_buf())?;

        let sampler = create_sampler(
            SamplerConfig {
                period: Duration::from_secs(1),
                threshold: 2,
            },
            capture,
            summarizer,
            storage,
            DefaultClock,
        );

        let shutdown_token = CancellationToken::new();
        tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(4500)).await;
                shutdown_token.cancel()
            },
            run_sampler(&sampler, shutdown_token.clone()),
        );

        assert!(!sampler.status().running);

        let storage = SummaryStorageImpl::new(dir.path().to_path_buf())?;
        let summaries = storage.get_data_for(Utc::now().date_naive()).await?;
        assert_eq!(summaries.len(), 2);
        assert_eq!(
            summaries[0].text,
            "Excel - Acme ledger.xlsx; Outlook - RE: Acme engagement"
        );
        assert_eq!(summaries[1].sample_count, 2);

        Ok(())
    }
}
