//! Work-in-progress entries and their aggregation into billing lines.

use std::{collections::HashMap, path::Path};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::names::{NameKind, NameNormalizer};

/// Billable time attributed to a client and project before it ends up on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WipEntry {
    pub client: String,
    pub project: String,
    #[serde(default)]
    pub description: String,
    pub minutes: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WipGroup {
    pub client: String,
    pub project: String,
    pub minutes: f64,
    pub entries: usize,
}

impl WipGroup {
    fn new(client: String, project: String) -> Self {
        Self {
            client,
            project,
            minutes: 0.,
            entries: 0,
        }
    }
}

/// Upper bound for a single entry, roughly nineteen centuries.
pub const MAX_ENTRY_MINUTES: f64 = 1e9;

/// Reads a JSON array of entries. Entries with negative or absurdly large minutes are rejected.
pub async fn load_entries(path: &Path) -> Result<Vec<WipEntry>> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read entries from {path:?}"))?;
    let entries: Vec<WipEntry> = serde_json::from_slice(&content)
        .with_context(|| format!("Malformed entries in {path:?}"))?;

    for (index, entry) in entries.iter().enumerate() {
        if !(entry.minutes.is_finite() && (0. ..=MAX_ENTRY_MINUTES).contains(&entry.minutes)) {
            bail!(
                "Entry {index} in {path:?} ({} / {}) has invalid minutes {}",
                entry.client,
                entry.project,
                entry.minutes
            );
        }
    }
    Ok(entries)
}

/// Returns one group per canonical client and project, biggest first.
pub fn group_entries(entries: Vec<WipEntry>, names: &NameNormalizer) -> Vec<WipGroup> {
    let mut map = HashMap::<(String, String), WipGroup>::new();

    for entry in entries {
        let client = names.resolve(NameKind::Clients, &entry.client);
        let project = names.resolve(NameKind::Projects, &entry.project);
        let group = map
            .entry((client.clone(), project.clone()))
            .or_insert_with(|| WipGroup::new(client, project));
        group.minutes += entry.minutes;
        group.entries += 1;
    }

    let mut groups = map.into_values().collect::<Vec<_>>();
    groups.sort_by(|a, b| {
        b.minutes
            .total_cmp(&a.minutes)
            .then_with(|| a.client.cmp(&b.client))
            .then_with(|| a.project.cmp(&b.project))
    });
    groups
}
