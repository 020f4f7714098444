use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An original file and the name it should be given in the same directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    pub original_path: PathBuf,
    pub proposed_name: String,
}

impl RenamePair {
    pub fn new(original_path: impl Into<PathBuf>, proposed_name: impl Into<String>) -> Self {
        Self {
            original_path: original_path.into(),
            proposed_name: proposed_name.into(),
        }
    }

    /// Name of the original file, as shown to the user
    pub fn original_name(&self) -> String {
        self.original_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// The proposed name resolved as a sibling of the original
    pub fn destination_path(&self) -> PathBuf {
        self.original_path
            .parent()
            .map(|p| p.join(&self.proposed_name))
            .unwrap_or_else(|| PathBuf::from(&self.proposed_name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Conflict,
    Error,
}

/// What happened to one pair of an executed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub original: String,
    pub proposed: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl RenameOutcome {
    pub fn success(original: String, proposed: String) -> Self {
        Self {
            original,
            proposed,
            status: OutcomeStatus::Success,
            error_detail: None,
        }
    }

    pub fn conflict(original: String, proposed: String, detail: impl Into<String>) -> Self {
        Self {
            original,
            proposed,
            status: OutcomeStatus::Conflict,
            error_detail: Some(detail.into()),
        }
    }

    pub fn error(original: String, proposed: String, detail: impl Into<String>) -> Self {
        Self {
            original,
            proposed,
            status: OutcomeStatus::Error,
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Receives each outcome as soon as the executor produces it
pub trait ApplyObserver {
    fn on_outcome(&mut self, index: usize, total: usize, outcome: &RenameOutcome);
}

impl ApplyObserver for () {
    fn on_outcome(&mut self, _index: usize, _total: usize, _outcome: &RenameOutcome) {}
}

/// Counts of outcomes by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeSummary {
    pub succeeded: usize,
    pub conflicts: usize,
    pub errors: usize,
}

impl OutcomeSummary {
    pub fn from_outcomes(outcomes: &[RenameOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                match outcome.status {
                    OutcomeStatus::Success => summary.succeeded += 1,
                    OutcomeStatus::Conflict => summary.conflicts += 1,
                    OutcomeStatus::Error => summary.errors += 1,
                }
                summary
            })
    }

    pub fn failed(&self) -> usize {
        self.conflicts + self.errors
    }
}
