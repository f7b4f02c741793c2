use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Extension (lowercase, leading dot) to number of files, in first-seen order.
pub type ExtensionTally = IndexMap<String, usize>;

/// Display language to number of files. Insertion order is the label order
/// of both the JSON report and the chart.
pub type LanguageTally = IndexMap<String, usize>;

/// One entry of `gh repo list --json name,sshUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub name: String,
    #[serde(rename = "sshUrl")]
    pub clone_url: String,
}

impl RepoRef {
    pub fn new(name: impl Into<String>, clone_url: impl Into<String>) -> Self {
        RepoRef {
            name: name.into(),
            clone_url: clone_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClonedRepo {
    pub name: String,
    pub path: PathBuf,
    /// Abbreviated HEAD commit, when the directory opens as a git repository.
    pub head: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    CurrentRepo,
    Excluded,
    CloneFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::CurrentRepo => f.write_str("current repository"),
            SkipReason::Excluded => f.write_str("excluded"),
            SkipReason::CloneFailed(_) => f.write_str("clone failed"),
        }
    }
}

/// What happened to one listed repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Cloned(ClonedRepo),
    Skipped { name: String, reason: SkipReason },
}

impl FetchOutcome {
    pub fn name(&self) -> &str {
        match self {
            FetchOutcome::Cloned(repo) => &repo.name,
            FetchOutcome::Skipped { name, .. } => name,
        }
    }
}

/// Result of listing, cloning and counting, before anything is emitted.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<FetchOutcome>,
    pub extensions: ExtensionTally,
    pub languages: LanguageTally,
}

impl RunReport {
    pub fn cloned(&self) -> impl Iterator<Item = &ClonedRepo> {
        self.outcomes.iter().filter_map(|o| match o {
            FetchOutcome::Cloned(repo) => Some(repo),
            FetchOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Skipped { .. }))
            .count()
    }

    pub fn total_files(&self) -> usize {
        self.languages.values().sum()
    }
}
