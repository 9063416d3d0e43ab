use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::utils::time::date_to_record_name;

use super::entities::WindowSummary;

/// Destination for summaries produced by the sampler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummarySink: Send + Sync {
    async fn store(&self, summary: WindowSummary) -> Result<()>;
}

/// Stores summaries as JSON lines, one file per UTC day of the window start.
pub struct SummaryStorageImpl {
    summary_dir: PathBuf,
}

impl SummaryStorageImpl {
    pub fn new(summary_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&summary_dir)?;

        Ok(Self { summary_dir })
    }

    /// Retrieves summaries stored for a certain day, in the order they were written.
    pub async fn get_data_for(&self, date: NaiveDate) -> Result<Vec<WindowSummary>> {
        let path = self.summary_dir.join(date_to_record_name(date));
        match Self::extract(&path).await {
            Ok(summaries) => Ok(summaries),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e)?,
        }
    }

    async fn extract(path: &Path) -> Result<Vec<WindowSummary>, std::io::Error> {
        debug!("Extracting {path:?}");
        let file = File::open(path).await?;
        file.lock_shared()?;
        let mut lines = BufReader::new(file).lines();
        let mut summaries = vec![];
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WindowSummary>(&line) {
                Ok(v) => summaries.push(v),
                Err(e) => {
                    // A write cut short by a shutdown leaves a partial line behind.
                    warn!("During parsing in path {path:?} found illegal json string {line}: {e}")
                }
            }
        }

        lines.into_inner().into_inner().unlock_async().await?;

        Ok(summaries)
    }
}

#[async_trait]
impl SummarySink for SummaryStorageImpl {
    async fn store(&self, summary: WindowSummary) -> Result<()> {
        let path = self
            .summary_dir
            .join(date_to_record_name(summary.start.date_naive()));

        let mut line = serde_json::to_vec(&summary)?;
        line.push(b'\n');

        let mut file = File::options()
            .append(true)
            .create(true)
            .open(path)
            .await?;

        file.lock_exclusive()?;
        let result = async {
            file.write_all(&line).await?;
            file.flush().await?;
            Ok::<_, anyhow::Error>(())
        }
        .await;
        file.unlock_async().await?;
        result
    }
}
