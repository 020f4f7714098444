pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod history;
pub mod logging;
pub mod recognize;
pub mod revert;
pub mod scanner;
pub mod transform;

pub use config::{scan_config_from_env, ScanConfig};
pub use controller::{
    apply_pairs, ApplyGuard, ApplyReport, ApplySlot, Controller, ControllerError, SessionState,
};
pub use error::{AppError, ExitCode};
pub use executor::{
    execute_renames, ApplyObserver, OutcomeStatus, OutcomeSummary, RenameOutcome, RenamePair,
};
pub use recognize::{
    build_media_name, recognize_batch, MediaInfo, NamingScheme, RecognizeError, Recognizer,
    TemplateEngine, TemplateError,
};
pub use revert::{revert_from_history, RevertError, RevertOptions, RevertResult};
pub use scanner::{classify, scan_directory, FileClass, FileDescriptor, ScannerError};
pub use transform::{
    apply_rule, batch_preview, CaseMode, PreviewEntry, TransformError, TransformRule,
};
