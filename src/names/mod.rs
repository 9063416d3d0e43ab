//! Reconciles spellings of client and project names.
//!
//! Every registration maps a lower-cased original spelling to a canonical one. Lookups try an
//! exact (case-insensitive) match first and then fall back to a cheap fuzzy comparison so that
//! "EisnerAmper", "Eisner Amper" and "Eisner & Amper" collapse into one billing line.
//!
//! The fuzzy pass walks registrations in the order they were made and returns the first hit,
//! not the closest one. Registering a broad name early can therefore shadow a more specific
//! later one.

pub mod store;

use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Shorter-to-longer length ratio a fuzzy candidate has to exceed.
const MIN_LENGTH_SIMILARITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    Clients,
    Projects,
}

impl Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameKind::Clients => write!(f, "clients"),
            NameKind::Projects => write!(f, "projects"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    /// Lower-cased spelling the mapping was registered under.
    pub original: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameNormalizer {
    #[serde(default)]
    clients: Vec<NameEntry>,
    #[serde(default)]
    projects: Vec<NameEntry>,
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `original` (case-insensitively) to `canonical`. Re-registering a spelling replaces
    /// its canonical name but keeps its place in the lookup order.
    pub fn register(&mut self, kind: NameKind, original: &str, canonical: &str) {
        let key = original.to_lowercase();
        let entries = self.entries_mut(kind);
        match entries.iter_mut().find(|entry| entry.original == key) {
            Some(entry) => entry.canonical = canonical.to_string(),
            None => entries.push(NameEntry {
                original: key,
                canonical: canonical.to_string(),
            }),
        }
    }

    /// Returns the canonical spelling for `original`, or `original` itself when nothing close
    /// enough was registered.
    pub fn resolve(&self, kind: NameKind, original: &str) -> String {
        let key = original.to_lowercase();
        let entries = self.entries(kind);

        if let Some(entry) = entries.iter().find(|entry| entry.original == key) {
            return entry.canonical.clone();
        }

        match entries
            .iter()
            .find(|entry| is_fuzzy_match(&key, &entry.original))
        {
            Some(entry) => {
                trace!("Fuzzy matched {original:?} to {:?}", entry.original);
                entry.canonical.clone()
            }
            None => original.to_string(),
        }
    }

    pub fn entries(&self, kind: NameKind) -> &[NameEntry] {
        match kind {
            NameKind::Clients => &self.clients,
            NameKind::Projects => &self.projects,
        }
    }

    fn entries_mut(&mut self, kind: NameKind) -> &mut Vec<NameEntry> {
        match kind {
            NameKind::Clients => &mut self.clients,
            NameKind::Projects => &mut self.projects,
        }
    }
}

/// Ratio of the shorter length to the longer one, in characters. 1 means equal lengths.
fn length_similarity(a: &str, b: &str) -> f64 {
    let a = a.chars().count();
    let b = b.chars().count();
    let longer = a.max(b);
    if longer == 0 {
        return 1.;
    }
    a.min(b) as f64 / longer as f64
}

fn strip_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '&' && !c.is_whitespace())
        .collect()
}

fn is_fuzzy_match(key: &str, candidate: &str) -> bool {
    if length_similarity(key, candidate) <= MIN_LENGTH_SIMILARITY {
        return false;
    }
    if key.contains(candidate) || candidate.contains(key) {
        return true;
    }
    let key = strip_separators(key);
    let candidate = strip_separators(candidate);
    key.contains(&candidate) || candidate.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::{length_similarity, NameKind, NameNormalizer};

    #[test]
    fn test_exact_match_ignores_case() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Clients, "Acme Inc", "Acme");
        assert_eq!(names.resolve(NameKind::Clients, "ACME INC"), "Acme");
    }

    #[test]
    fn test_exact_match_wins_over_earlier_fuzzy_candidate() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Clients, "Acme Inc.", "Acme Fuzzy");
        names.register(NameKind::Clients, "Acme Inc", "Acme");
        assert_eq!(names.resolve(NameKind::Clients, "ACME INC"), "Acme");
    }

    #[test]
    fn test_fuzzy_match_through_separators() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Clients, "Eisner Amper", "Eisner & Amper LLP");
        assert_eq!(
            names.resolve(NameKind::Clients, "EisnerAmper"),
            "Eisner & Amper LLP"
        );
        assert_eq!(
            names.resolve(NameKind::Clients, "Eisner & Amper"),
            "Eisner & Amper LLP"
        );
    }

    #[test]
    fn test_unknown_name_passes_through() {
        let names = NameNormalizer::new();
        assert_eq!(
            names.resolve(NameKind::Projects, "Totally Unrelated Name"),
            "Totally Unrelated Name"
        );

        let mut names = NameNormalizer::new();
        names.register(NameKind::Projects, "Audit 2024", "Annual Audit");
        assert_eq!(
            names.resolve(NameKind::Projects, "Totally Unrelated Name"),
            "Totally Unrelated Name"
        );
    }

    #[test]
    fn test_length_ratio_of_exactly_threshold_does_not_match() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Clients, "abcd", "ABCD Corp");
        assert_eq!(length_similarity("abcde", "abcd"), 0.8);
        assert_eq!(names.resolve(NameKind::Clients, "abcde"), "abcde");

        names.register(NameKind::Clients, "abcdefghi", "Letters Ltd");
        assert_eq!(names.resolve(NameKind::Clients, "abcdefghij"), "Letters Ltd");
    }

    #[test]
    fn test_first_registered_fuzzy_match_wins() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Projects, "tax return", "Tax Return");
        names.register(NameKind::Projects, "tax returns", "Tax Returns");
        assert_eq!(names.resolve(NameKind::Projects, "Tax Returns!"), "Tax Return");
    }

    #[test]
    fn test_kinds_are_separate() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Clients, "Acme", "Acme Corp");
        assert_eq!(names.resolve(NameKind::Projects, "acme"), "acme");
    }

    #[test]
    fn test_reregistering_overwrites_in_place() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Clients, "Acme", "Acme Corp");
        names.register(NameKind::Clients, "Globex", "Globex");
        names.register(NameKind::Clients, "ACME", "Acme Corporation");

        let entries = names.entries(NameKind::Clients);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].original, "acme");
        assert_eq!(entries[0].canonical, "Acme Corporation");
        assert_eq!(names.resolve(NameKind::Clients, "acme"), "Acme Corporation");
    }

    #[test]
    fn test_empty_strings_are_valid_keys() {
        let mut names = NameNormalizer::new();
        names.register(NameKind::Clients, "", "Unassigned");
        assert_eq!(names.resolve(NameKind::Clients, ""), "Unassigned");
        assert_eq!(names.resolve(NameKind::Clients, "x"), "x");
    }
}
