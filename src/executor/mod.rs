mod types;

pub use types::*;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, info, warn};

/// Why a proposed name cannot be used as a sibling filename, if it cannot
fn invalid_name_reason(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("proposed name is empty")
    } else if name == "." || name == ".." {
        Some("proposed name is a reserved directory entry")
    } else if name.contains('/') || name.contains(MAIN_SEPARATOR) {
        Some("proposed name contains a path separator")
    } else {
        None
    }
}

/// Whether `destination` is taken by a file other than `source`.
///
/// On a case-insensitive filesystem a case-only rename resolves to the source
/// itself, which does not count as occupied.
fn occupied_by_other(source: &Path, destination: &Path) -> bool {
    if destination == source || fs::symlink_metadata(destination).is_err() {
        return false;
    }

    let case_only = match (source.file_name(), destination.file_name()) {
        (Some(from), Some(to)) => {
            from.to_string_lossy().to_lowercase() == to.to_string_lossy().to_lowercase()
        }
        _ => false,
    };

    !(case_only && same_file::is_same_file(source, destination).unwrap_or(false))
}

/// Rename every pair in order, one at a time.
///
/// Items never abort the batch: an occupied destination becomes a conflict, a
/// failed rename becomes an error, and the next pair is processed either way.
/// Only the first pair to claim a destination path gets to try it.
pub fn execute_renames(
    pairs: &[RenamePair],
    observer: &mut dyn ApplyObserver,
) -> Vec<RenameOutcome> {
    let total = pairs.len();
    let mut claimed: HashSet<PathBuf> = HashSet::with_capacity(total);
    let mut outcomes = Vec::with_capacity(total);

    info!(count = total, "Executing renames");

    for (i, pair) in pairs.iter().enumerate() {
        let outcome = execute_one(pair, &mut claimed);

        match outcome.status {
            OutcomeStatus::Success => {
                info!("Renamed: {} -> {}", outcome.original, outcome.proposed)
            }
            OutcomeStatus::Conflict | OutcomeStatus::Error => warn!(
                original = %outcome.original,
                proposed = %outcome.proposed,
                status = ?outcome.status,
                detail = outcome.error_detail.as_deref().unwrap_or(""),
                "Rename skipped"
            ),
        }

        observer.on_outcome(i + 1, total, &outcome);
        outcomes.push(outcome);
    }

    debug!(
        succeeded = outcomes.iter().filter(|o| o.is_success()).count(),
        total,
        "Batch complete"
    );

    outcomes
}

fn execute_one(pair: &RenamePair, claimed: &mut HashSet<PathBuf>) -> RenameOutcome {
    let original = pair.original_name();
    let proposed = pair.proposed_name.clone();

    if let Some(reason) = invalid_name_reason(&proposed) {
        return RenameOutcome::error(original, proposed, reason);
    }

    let destination = pair.destination_path();

    if !claimed.insert(destination.clone()) {
        return RenameOutcome::conflict(
            original,
            proposed,
            "destination already claimed by an earlier item in this batch",
        );
    }

    if occupied_by_other(&pair.original_path, &destination) {
        return RenameOutcome::conflict(original, proposed, "destination already exists");
    }

    if fs::symlink_metadata(&pair.original_path).is_err() {
        return RenameOutcome::error(original, proposed, "source file not found");
    }

    debug!(from = ?pair.original_path, to = ?destination, "Renaming");

    match fs::rename(&pair.original_path, &destination) {
        Ok(()) => RenameOutcome::success(original, proposed),
        Err(e) => RenameOutcome::error(original, proposed, e.to_string()),
    }
}
