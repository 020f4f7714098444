use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::controller::{apply_pairs, ApplySlot, ControllerError};
use crate::executor::{ApplyObserver, RenameOutcome, RenamePair};
use crate::history::{read_history, write_history, HistoryError, HistoryFile, OperationType};

#[derive(Debug, thiserror::Error)]
pub enum RevertError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error(transparent)]
    Apply(#[from] ControllerError),
}

#[derive(Debug, Clone, Default)]
pub struct RevertOptions {
    pub dry_run: bool,
    /// Record the revert in its own history file next to the files
    pub write_history: bool,
}

/// Result of a revert
#[derive(Debug)]
pub struct RevertResult {
    /// The reversed pairs, in the order they run
    pub pairs: Vec<RenamePair>,
    /// Empty on a dry run
    pub outcomes: Vec<RenameOutcome>,
    pub original_history: PathBuf,
    pub dry_run: bool,
    pub revert_history_path: Option<PathBuf>,
}

/// Build the pairs that undo every successful rename in a history file.
///
/// Pairs run in reverse execution order so chained renames unwind cleanly.
pub fn prepare_revert_pairs(history: &HistoryFile) -> Vec<RenamePair> {
    let target_dir = &history.target_directory;

    history
        .successful()
        .rev()
        .map(|o| {
            debug!("Planning revert: {} -> {}", o.proposed, o.original);
            RenamePair::new(target_dir.join(&o.proposed), o.original.clone())
        })
        .collect()
}

/// Undo a previous apply using its history file
pub fn revert_from_history(
    history_path: &Path,
    options: &RevertOptions,
    slot: &ApplySlot,
    observer: &mut dyn ApplyObserver,
) -> Result<RevertResult, RevertError> {
    info!("Loading history from: {:?}", history_path);

    let history = read_history(history_path)?;

    info!(
        "History contains {} outcomes from {}",
        history.outcomes.len(),
        history.executed_at
    );

    let pairs = prepare_revert_pairs(&history);

    let mut outcomes = Vec::new();
    let mut revert_history_path = None;

    if !options.dry_run {
        outcomes = apply_pairs(slot, &pairs, observer)?;

        if options.write_history {
            let revert_history = HistoryFile::new(
                OperationType::Revert,
                history.target_directory.clone(),
                None,
                outcomes.clone(),
            );
            let path = write_history(&revert_history, &history.target_directory)?;
            info!("Revert history saved to: {:?}", path);
            revert_history_path = Some(path);
        }
    }

    Ok(RevertResult {
        pairs,
        outcomes,
        original_history: history_path.to_path_buf(),
        dry_run: options.dry_run,
        revert_history_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::OutcomeStatus;
    use crate::history::write_history_to;
    use std::fs;
    use tempfile::tempdir;

    fn setup_test_scenario() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();

        // Files as they look after the rename
        fs::write(dir.path().join("New_A.mp4"), "a").unwrap();
        fs::write(dir.path().join("New_B.mp4"), "b").unwrap();
        fs::write(dir.path().join("C.mp4"), "c").unwrap();

        let history = HistoryFile::new(
            OperationType::Rename,
            dir.path().to_path_buf(),
            Some("prefix 'New_'".to_string()),
            vec![
                RenameOutcome::success("A.mp4".into(), "New_A.mp4".into()),
                RenameOutcome::success("B.mp4".into(), "New_B.mp4".into()),
                RenameOutcome::conflict("C.mp4".into(), "New_C.mp4".into(), "exists"),
            ],
        );

        let history_path = dir.path().join("history.json");
        write_history_to(&history, &history_path).unwrap();

        (dir, history_path)
    }

    #[test]
    fn test_revert_success() {
        let (dir, history_path) = setup_test_scenario();
        let options = RevertOptions {
            dry_run: false,
            write_history: false,
        };

        let result =
            revert_from_history(&history_path, &options, &ApplySlot::new(), &mut ()).unwrap();

        assert_eq!(result.pairs.len(), 2);
        assert!(result.outcomes.iter().all(|o| o.is_success()));
        assert_eq!(fs::read_to_string(dir.path().join("A.mp4")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dir.path().join("B.mp4")).unwrap(), "b");
        assert!(!dir.path().join("New_A.mp4").exists());
        assert!(dir.path().join("C.mp4").exists());
        assert!(result.revert_history_path.is_none());
    }

    #[test]
    fn test_revert_dry_run() {
        let (dir, history_path) = setup_test_scenario();
        let options = RevertOptions {
            dry_run: true,
            write_history: true,
        };

        let result =
            revert_from_history(&history_path, &options, &ApplySlot::new(), &mut ()).unwrap();

        assert!(result.dry_run);
        assert_eq!(result.pairs.len(), 2);
        assert!(result.outcomes.is_empty());
        assert!(dir.path().join("New_A.mp4").exists());
        assert!(!dir.path().join("A.mp4").exists());
        assert!(result.revert_history_path.is_none());
    }

    #[test]
    fn test_revert_conflict_does_not_block_others() {
        let (dir, history_path) = setup_test_scenario();
        fs::write(dir.path().join("A.mp4"), "someone else").unwrap();

        let result = revert_from_history(
            &history_path,
            &RevertOptions::default(),
            &ApplySlot::new(),
            &mut (),
        )
        .unwrap();

        // Pairs run in reverse order: B first, then A
        assert_eq!(result.outcomes[0].proposed, "B.mp4");
        assert_eq!(result.outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(result.outcomes[1].proposed, "A.mp4");
        assert_eq!(result.outcomes[1].status, OutcomeStatus::Conflict);
        assert_eq!(
            fs::read_to_string(dir.path().join("A.mp4")).unwrap(),
            "someone else"
        );
    }

    #[test]
    fn test_revert_creates_history() {
        let (_dir, history_path) = setup_test_scenario();
        let options = RevertOptions {
            dry_run: false,
            write_history: true,
        };

        let result =
            revert_from_history(&history_path, &options, &ApplySlot::new(), &mut ()).unwrap();

        let path = result.revert_history_path.unwrap();
        let written = read_history(&path).unwrap();
        assert_eq!(written.operation, OperationType::Revert);
        assert_eq!(written.outcomes.len(), 2);
    }

    #[test]
    fn test_revert_unwinds_chains_in_reverse() {
        let dir = tempdir().unwrap();
        // Forward batch was 2 -> 3, then 1 -> 2
        fs::write(dir.path().join("2.mkv"), "one").unwrap();
        fs::write(dir.path().join("3.mkv"), "two").unwrap();

        let history = HistoryFile::new(
            OperationType::Rename,
            dir.path().to_path_buf(),
            None,
            vec![
                RenameOutcome::success("2.mkv".into(), "3.mkv".into()),
                RenameOutcome::success("1.mkv".into(), "2.mkv".into()),
            ],
        );
        let history_path = dir.path().join("history.json");
        write_history_to(&history, &history_path).unwrap();

        let result = revert_from_history(
            &history_path,
            &RevertOptions::default(),
            &ApplySlot::new(),
            &mut (),
        )
        .unwrap();

        assert!(result.outcomes.iter().all(|o| o.is_success()));
        assert_eq!(fs::read_to_string(dir.path().join("1.mkv")).unwrap(), "one");
        assert_eq!(fs::read_to_string(dir.path().join("2.mkv")).unwrap(), "two");
    }

    #[test]
    fn test_revert_busy() {
        let (dir, history_path) = setup_test_scenario();
        let slot = ApplySlot::new();
        let _held = slot.try_acquire().unwrap();

        let result = revert_from_history(&history_path, &RevertOptions::default(), &slot, &mut ());

        assert!(matches!(
            result,
            Err(RevertError::Apply(ControllerError::Busy))
        ));
        assert!(dir.path().join("New_A.mp4").exists());
    }
}
