mod codes;

pub use codes::ExitCode;

use crate::controller::ControllerError;
use crate::history::HistoryError;
use crate::recognize::TemplateError;
use crate::revert::RevertError;
use crate::scanner::ScannerError;
use crate::transform::TransformError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Target directory does not exist: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid regular expression: {pattern}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Another apply is already in progress")]
    Busy,

    #[error("History file error: {message}")]
    HistoryError {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("{failed} of {total} renames did not complete")]
    PartialFailure { failed: usize, total: usize },

    #[error("Apply cancelled")]
    Cancelled,

    #[error("No rename rule given")]
    MissingRule,

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid naming template: {0}")]
    InvalidTemplate(String),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::DirectoryNotFound { .. } => ExitCode::InvalidPath,
            AppError::NotADirectory { .. } => ExitCode::InvalidPath,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::InvalidPattern { .. } => ExitCode::InvalidPattern,
            AppError::Busy => ExitCode::Busy,
            AppError::HistoryError { .. } => ExitCode::HistoryError,
            AppError::PartialFailure { .. } => ExitCode::PartialFailure,
            AppError::Cancelled => ExitCode::Cancelled,
            AppError::MissingRule => ExitCode::InvalidArguments,
            AppError::InvalidArguments(_) => ExitCode::InvalidArguments,
            AppError::InvalidTemplate(_) => ExitCode::InvalidPattern,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::DirectoryNotFound { path } => {
                format!(
                    "The specified directory does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::NotADirectory { path } => {
                format!(
                    "The specified path is not a directory:\n  {}\n\n\
                     Please provide a valid directory path.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::InvalidPattern { pattern, message } => {
                format!(
                    "The regular expression does not compile:\n  {}\n\n{}\n\n\
                     No files were renamed.",
                    pattern, message
                )
            }

            AppError::Busy => String::from(
                "Another apply is already in progress.\n\
                 Wait for it to finish and try again.",
            ),

            AppError::HistoryError { path, message } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "History file error:\n  {}\n{}\n\
                     Ensure the history file exists and is valid JSON.",
                    message, path_info
                )
            }

            AppError::PartialFailure { failed, total } => {
                format!(
                    "{} of {} renames ended in a conflict or error.\n\
                     The remaining files were renamed; see the summary above.",
                    failed, total
                )
            }

            AppError::Cancelled => String::from("Apply cancelled. No files were renamed."),

            AppError::MissingRule => String::from(
                "No rename rule given.\n\
                 Use one of --replace, --regex, --prefix, --suffix, --remove or --case,\n\
                 or --list to only show the files found.",
            ),

            AppError::InvalidArguments(message) => {
                format!("{}\n\nRun with --help to see the available options.", message)
            }

            AppError::InvalidTemplate(message) => {
                format!(
                    "The naming template is not usable:\n  {}\n\n\
                     Run with --list-templates to see the built-in templates.",
                    message
                )
            }

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::DirectoryNotFound { path },
            ScannerError::NotADirectory(path) => AppError::NotADirectory { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::InvalidPattern { pattern, source } => AppError::InvalidPattern {
                pattern,
                message: source.to_string(),
            },
        }
    }
}

impl From<ControllerError> for AppError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::InvalidPattern(e) => e.into(),
            ControllerError::Template(e) => e.into(),
            ControllerError::Busy => AppError::Busy,
            ControllerError::NotConfirmed => AppError::Cancelled,
            ControllerError::NoPreview => {
                AppError::Other("Nothing to apply: preview the batch first".to_string())
            }
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::InvalidTemplate(err.to_string())
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::HistoryError {
            path: None,
            message: err.to_string(),
        }
    }
}

impl From<RevertError> for AppError {
    fn from(err: RevertError) -> Self {
        match err {
            RevertError::History(e) => e.into(),
            RevertError::Apply(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = AppError::DirectoryNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidPath);

        let err = AppError::NotADirectory {
            path: PathBuf::from("/test"),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidPath);

        assert_eq!(AppError::Busy.exit_code(), ExitCode::Busy);
        assert_eq!(
            AppError::PartialFailure {
                failed: 1,
                total: 2
            }
            .exit_code(),
            ExitCode::PartialFailure
        );
    }

    #[test]
    fn test_detailed_message_includes_context() {
        let err = AppError::InvalidPattern {
            pattern: "(unterminated".to_string(),
            message: "unclosed group".to_string(),
        };

        let msg = err.detailed_message();
        assert!(msg.contains("(unterminated"));
        assert!(msg.contains("unclosed group"));
        assert!(msg.contains("No files were renamed"));
    }

    #[test]
    fn test_scanner_error_conversion() {
        let scanner_err = ScannerError::PathNotFound(PathBuf::from("/missing"));
        let app_err: AppError = scanner_err.into();
        assert_eq!(app_err.exit_code(), ExitCode::InvalidPath);
    }

    #[test]
    fn test_transform_error_conversion() {
        let err = crate::transform::apply_rule(
            "a.mkv",
            &crate::transform::TransformRule::RegexReplace {
                pattern: "(".to_string(),
                replacement: String::new(),
            },
        )
        .unwrap_err();

        let app_err: AppError = ControllerError::from(err).into();
        assert_eq!(app_err.exit_code(), ExitCode::InvalidPattern);
    }

    #[test]
    fn test_controller_error_conversion() {
        let app_err: AppError = ControllerError::NotConfirmed.into();
        assert_eq!(app_err.exit_code(), ExitCode::Cancelled);

        let app_err: AppError = ControllerError::Busy.into();
        assert_eq!(app_err.exit_code(), ExitCode::Busy);
    }

    #[test]
    fn test_invalid_arguments_exit_code() {
        let err = AppError::InvalidArguments("--ignore-case only applies".to_string());
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
        assert!(err.detailed_message().contains("--help"));
    }

    #[test]
    fn test_template_error_conversion() {
        let err = TemplateError::UnknownTemplate("nope".to_string());
        let app_err: AppError = ControllerError::from(err).into();
        assert_eq!(app_err.exit_code(), ExitCode::InvalidPattern);
        assert!(app_err.detailed_message().contains("nope"));
    }
}
