use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};

use crate::daemon::{storage::summary_storage::SummaryStorageImpl, SUMMARY_DIR};

use super::format_duration;

/// Prints every summary stored for `date`, one per line: local start time, local end time,
/// billed duration and the summary text.
pub async fn process_summaries_command(app_dir: &Path, date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let storage = SummaryStorageImpl::new(app_dir.join(SUMMARY_DIR))?;

    let summaries = storage.get_data_for(date).await?;
    if summaries.is_empty() {
        println!("No summaries for {date}");
        return Ok(());
    }

    for summary in summaries {
        println!(
            "{}\t{}\t{}\t{}",
            summary.start.with_timezone(&Local).format("%H:%M"),
            summary.end.with_timezone(&Local).format("%H:%M"),
            format_duration(summary.duration),
            summary.text.replace('\n', " ")
        );
    }
    Ok(())
}
