use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::ScanConfig;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClass {
    Media,
    Subtitle,
}

impl FileClass {
    pub fn label(&self) -> &'static str {
        match self {
            FileClass::Media => "media",
            FileClass::Subtitle => "subtitle",
        }
    }
}

/// A classified file found by a scan. Not cached across scans.
#[derive(Debug, Clone, Serialize)]
pub struct FileDescriptor {
    pub name: String,
    pub absolute_path: PathBuf,
    pub class: FileClass,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Classify a filename by its extension, `None` when it is neither media nor subtitle
pub fn classify(name: &str, config: &ScanConfig) -> Option<FileClass> {
    let ext = Path::new(name).extension()?.to_str()?.to_lowercase();

    if config.is_media_extension(&ext) {
        Some(FileClass::Media)
    } else if config.is_subtitle_extension(&ext) {
        Some(FileClass::Subtitle)
    } else {
        None
    }
}

/// List the media and subtitle files directly inside `target`, in enumeration order
pub fn scan_directory(
    target: &Path,
    config: &ScanConfig,
) -> Result<Vec<FileDescriptor>, ScannerError> {
    debug!(path = ?target, "Scanning directory");

    if !target.exists() {
        return Err(ScannerError::PathNotFound(target.to_path_buf()));
    }

    if !target.is_dir() {
        return Err(ScannerError::NotADirectory(target.to_path_buf()));
    }

    let root = if target.is_absolute() {
        target.to_path_buf()
    } else {
        fs::canonicalize(target)?
    };

    let read_dir = fs::read_dir(&root).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScannerError::PermissionDenied(target.to_path_buf())
        } else {
            ScannerError::IoError(e)
        }
    })?;

    let mut files = Vec::new();

    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();

        trace!(entry = ?path, "Examining entry");

        // Follows symlinks, so a link to a regular file counts as a file
        let metadata = match fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            _ => {
                trace!(path = ?path, "Skipping non-regular entry");
                continue;
            }
        };

        let name = match path.file_name().map(|n| n.to_str()) {
            Some(Some(n)) => n.to_string(),
            Some(None) => {
                warn!(path = ?path, "Skipping file with a non-UTF-8 name");
                continue;
            }
            None => continue,
        };

        let class = match classify(&name, config) {
            Some(class) => class,
            None => {
                trace!(name = %name, "Skipping unsupported extension");
                continue;
            }
        };

        debug!(name = %name, class = class.label(), "Found file");

        files.push(FileDescriptor {
            name,
            absolute_path: path,
            class,
            size_bytes: metadata.len(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    debug!(count = files.len(), "Scan complete");

    Ok(files)
}
