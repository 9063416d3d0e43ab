use std::path::Path;

use anyhow::{anyhow, bail, Result};
use chrono::Duration;
use tracing::debug;

use crate::{
    names::store::NameTableFile,
    wip::{group_entries, load_entries},
};

use super::{format_duration, names::NAMES_FILE};

/// Groups the entries in `entries_path` by canonical client and project and prints the totals.
pub async fn process_report_command(app_dir: &Path, entries_path: &Path) -> Result<()> {
    let names = NameTableFile::new(app_dir.join(NAMES_FILE)).load().await?;
    let entries = load_entries(entries_path).await?;
    debug!("Loaded {} entries", entries.len());

    let groups = group_entries(entries, &names);
    let total: f64 = groups.iter().map(|g| g.minutes).sum();

    for group in groups.iter() {
        println!(
            "{}\t{}\t{}\t{}",
            format_duration(minutes_to_duration(group.minutes)?),
            group.entries,
            group.client,
            group.project
        );
    }
    println!();
    println!("{}\ttotal", format_duration(minutes_to_duration(total)?));
    Ok(())
}

fn minutes_to_duration(minutes: f64) -> Result<Duration> {
    if !minutes.is_finite() {
        bail!("Cannot report {minutes} minutes");
    }
    // `as` saturates, so anything past i64 seconds fails the range check below.
    Duration::try_seconds((minutes * 60.).round() as i64)
        .ok_or_else(|| anyhow!("{minutes} minutes is out of range"))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::minutes_to_duration;

    #[test]
    fn test_minutes_are_rounded_to_seconds() {
        assert_eq!(minutes_to_duration(90.5).unwrap(), Duration::seconds(5430));
    }

    #[test]
    fn test_unrepresentable_minutes_are_an_error() {
        assert!(minutes_to_duration(1e17).is_err());
        assert!(minutes_to_duration(f64::INFINITY).is_err());
        assert!(minutes_to_duration(f64::NAN).is_err());
    }
}
