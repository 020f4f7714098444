use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::types::*;

/// Error types for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Failed to write history file: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to serialize history: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Failed to read history file: {0}")]
    ReadError(String),

    #[error("History file version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

/// Write the history file into `target_dir` under its generated name
pub fn write_history(history: &HistoryFile, target_dir: &Path) -> Result<PathBuf, HistoryError> {
    let file_path = target_dir.join(history.generate_filename());

    if file_path.exists() {
        warn!("History file already exists: {:?}", file_path);
        let unique_filename = format!(
            "{}{}-{}.json",
            HISTORY_FILE_PREFIX,
            history.executed_at.format("%Y%m%d-%H%M%S"),
            history.executed_at.timestamp_subsec_millis()
        );
        return write_history_to(history, &target_dir.join(unique_filename));
    }

    write_history_to(history, &file_path)
}

/// Write the history file to an explicit path, replacing it atomically
pub fn write_history_to(history: &HistoryFile, path: &Path) -> Result<PathBuf, HistoryError> {
    let temp_path = path.with_extension("json.tmp");

    {
        let file = File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, history)?;
    }

    fs::rename(&temp_path, path)?;

    info!("History written to: {:?}", path);

    Ok(path.to_path_buf())
}
