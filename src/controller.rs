//! Preview/apply sequencing.
//!
//! A [`Controller`] walks one editing session through
//! `Idle -> Previewed -> Applying -> Done`. Renames only ever run from a
//! retained, explicitly confirmed preview, and the preview is discarded once
//! applied so the same batch cannot be applied twice.
//!
//! Applies are serialized by an [`ApplySlot`]: a second apply while one is in
//! flight fails fast with [`ControllerError::Busy`] instead of waiting.

use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::executor::{execute_renames, ApplyObserver, RenameOutcome, RenamePair};
use crate::recognize::{
    recognize_batch, NamingScheme, Recognizer, TemplateEngine, TemplateError,
};
use crate::transform::{batch_preview, PreviewEntry, TransformError, TransformRule};

static GLOBAL_SLOT: Lazy<ApplySlot> = Lazy::new(ApplySlot::new);

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    InvalidPattern(#[from] TransformError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Another apply is already in progress")]
    Busy,

    #[error("Nothing to apply: a fresh preview is required")]
    NoPreview,

    #[error("Apply was not confirmed")]
    NotConfirmed,
}

/// Single-slot token allowing at most one apply in flight
#[derive(Debug, Clone, Default)]
pub struct ApplySlot {
    busy: Arc<AtomicBool>,
}

impl ApplySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot shared by every controller in this process
    pub fn global() -> Self {
        GLOBAL_SLOT.clone()
    }

    /// Take the slot, or fail immediately if it is held
    pub fn try_acquire(&self) -> Result<ApplyGuard, ControllerError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ControllerError::Busy)?;

        Ok(ApplyGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds the apply slot until dropped
#[derive(Debug)]
pub struct ApplyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for ApplyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Run a batch of renames while holding the slot
pub fn apply_pairs(
    slot: &ApplySlot,
    pairs: &[RenamePair],
    observer: &mut dyn ApplyObserver,
) -> Result<Vec<RenameOutcome>, ControllerError> {
    let _guard = slot.try_acquire()?;
    Ok(execute_renames(pairs, observer))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Previewed,
    Applying,
    Done,
    Error,
}

#[derive(Debug)]
struct RetainedPreview {
    directory: PathBuf,
    entries: Vec<PreviewEntry>,
}

/// Outcomes of an applied preview plus the names that were left alone
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub outcomes: Vec<RenameOutcome>,
    /// Entries whose proposed name equals the original: skipped, unchanged
    pub skipped: Vec<String>,
}

#[derive(Debug)]
pub struct Controller {
    state: SessionState,
    preview: Option<RetainedPreview>,
    slot: ApplySlot,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Create a controller using the process-wide apply slot
    pub fn new() -> Self {
        Self::with_slot(ApplySlot::global())
    }

    pub fn with_slot(slot: ApplySlot) -> Self {
        Self {
            state: SessionState::Idle,
            preview: None,
            slot,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn preview_entries(&self) -> Option<&[PreviewEntry]> {
        self.preview.as_ref().map(|p| p.entries.as_slice())
    }

    /// Preview `rule` over `filenames` living in `directory` and retain the result
    pub fn preview<S: AsRef<str>>(
        &mut self,
        directory: &Path,
        filenames: &[S],
        rule: &TransformRule,
    ) -> Result<&[PreviewEntry], ControllerError> {
        self.preview = None;

        match batch_preview(filenames, rule) {
            Ok(entries) => Ok(self.retain(directory, entries)),
            Err(e) => {
                warn!(error = %e, "Preview failed");
                self.state = SessionState::Error;
                Err(e.into())
            }
        }
    }

    /// Preview names a recognizer proposes, rendered with `scheme`, and retain the result
    pub fn preview_recognized<S: AsRef<str>>(
        &mut self,
        directory: &Path,
        filenames: &[S],
        recognizer: &dyn Recognizer,
        engine: &TemplateEngine,
        scheme: &NamingScheme,
    ) -> Result<&[PreviewEntry], ControllerError> {
        self.preview = None;

        match recognize_batch(filenames, recognizer, engine, scheme) {
            Ok(entries) => Ok(self.retain(directory, entries)),
            Err(e) => {
                warn!(error = %e, "Recognized preview failed");
                self.state = SessionState::Error;
                Err(e.into())
            }
        }
    }

    /// Apply the retained preview after explicit confirmation.
    ///
    /// Only changed entries are renamed. The preview is discarded afterwards,
    /// so another apply requires a new preview.
    pub fn apply(
        &mut self,
        confirmed: bool,
        observer: &mut dyn ApplyObserver,
    ) -> Result<ApplyReport, ControllerError> {
        if self.state != SessionState::Previewed || self.preview.is_none() {
            return Err(ControllerError::NoPreview);
        }

        if !confirmed {
            return Err(ControllerError::NotConfirmed);
        }

        let _guard = self.slot.try_acquire()?;

        let preview = match self.preview.take() {
            Some(p) => p,
            None => return Err(ControllerError::NoPreview),
        };
        self.state = SessionState::Applying;

        let (changed, unchanged): (Vec<_>, Vec<_>) =
            preview.entries.into_iter().partition(|e| e.changed);

        let pairs: Vec<RenamePair> = changed
            .into_iter()
            .map(|e| RenamePair::new(preview.directory.join(&e.original), e.proposed))
            .collect();

        let skipped: Vec<String> = unchanged.into_iter().map(|e| e.original).collect();

        info!(
            renames = pairs.len(),
            skipped = skipped.len(),
            "Applying preview"
        );

        let outcomes = execute_renames(&pairs, observer);

        self.state = SessionState::Done;
        debug!("Preview discarded after apply");

        Ok(ApplyReport { outcomes, skipped })
    }

    fn retain(&mut self, directory: &Path, entries: Vec<PreviewEntry>) -> &[PreviewEntry] {
        self.state = SessionState::Previewed;
        &self
            .preview
            .insert(RetainedPreview {
                directory: directory.to_path_buf(),
                entries,
            })
            .entries
    }
}
