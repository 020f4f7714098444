use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::executor::RenameOutcome;

pub const HISTORY_VERSION: &str = "1.0";
pub const HISTORY_FILE_PREFIX: &str = "media-renamer-history-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    /// Schema version for compatibility
    pub version: String,

    /// When the batch was executed
    pub executed_at: DateTime<Utc>,

    pub operation: OperationType,

    /// Directory the renamed files live in
    pub target_directory: PathBuf,

    /// Tool version that created this history
    pub tool_version: String,

    /// Human-readable description of the rule, if one produced the names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Every outcome of the batch, in execution order
    pub outcomes: Vec<RenameOutcome>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Rename,
    Revert,
}

impl HistoryFile {
    pub fn new(
        operation: OperationType,
        target_directory: PathBuf,
        rule: Option<String>,
        outcomes: Vec<RenameOutcome>,
    ) -> Self {
        Self {
            version: HISTORY_VERSION.to_string(),
            executed_at: Utc::now(),
            operation,
            target_directory,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            rule,
            outcomes,
        }
    }

    /// Generate the filename for this history file
    pub fn generate_filename(&self) -> String {
        let timestamp = self.executed_at.format("%Y%m%d-%H%M%S");
        format!("{}{}.json", HISTORY_FILE_PREFIX, timestamp)
    }

    /// Outcomes that actually renamed a file, in execution order
    pub fn successful(&self) -> impl DoubleEndedIterator<Item = &RenameOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }
}
