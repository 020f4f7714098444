//! Progress output for user-facing status updates.
//!
//! In verbose mode output is suppressed since tracing handles everything.
//! In normal mode it is shown on stderr, colored when the terminal allows.

use colored::Colorize;
use media_renamer::{ApplyObserver, OutcomeStatus, OutcomeSummary, RenameOutcome};
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Progress reporter for user-facing output
pub struct Progress {
    writer: Box<dyn Write>,
    /// When true, all output is suppressed (verbose mode uses tracing instead)
    silent: bool,
    colors_enabled: bool,
}

/// Check if we should use colors in output
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

impl Progress {
    /// Create a progress reporter on stderr; `verbose` silences it
    pub fn new(verbose: bool) -> Self {
        let colors_enabled = should_use_colors();
        if !colors_enabled {
            colored::control::set_override(false);
        }

        Self {
            writer: Box::new(io::stderr()),
            silent: verbose,
            colors_enabled,
        }
    }

    /// Create a progress reporter with a custom writer (for testing)
    #[cfg(test)]
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    pub fn scan_start(&mut self, dir: &Path) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("Scanning {}", dir.display()).dimmed()
            );
        } else {
            let _ = writeln!(self.writer, "Scanning {}", dir.display());
        }
    }

    pub fn scan_complete(&mut self, media: usize, subtitles: usize) {
        if self.silent {
            return;
        }
        let _ = writeln!(
            self.writer,
            "Found {} media and {} subtitle files",
            media, subtitles
        );
    }

    /// Report an error during operation (non-fatal)
    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    pub fn history_written(&mut self, path: &Path) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("History saved to: {}", path.display()).dimmed()
            );
        } else {
            let _ = writeln!(self.writer, "History saved to: {}", path.display());
        }
    }

    pub fn apply_complete(&mut self, summary: &OutcomeSummary) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        if self.colors_enabled {
            let mut line = format!("{} renamed", summary.succeeded).green().to_string();
            if summary.conflicts > 0 {
                line.push_str(&format!(", {}", format!("{} conflicts", summary.conflicts).yellow()));
            }
            if summary.errors > 0 {
                line.push_str(&format!(", {}", format!("{} errors", summary.errors).red()));
            }
            let _ = writeln!(self.writer, "{} {}", "✓".green().bold(), line);
        } else {
            let _ = writeln!(
                self.writer,
                "Done. {} renamed, {} conflicts, {} errors.",
                summary.succeeded, summary.conflicts, summary.errors
            );
        }
    }
}

impl ApplyObserver for Progress {
    fn on_outcome(&mut self, index: usize, total: usize, outcome: &RenameOutcome) {
        if self.silent {
            return;
        }

        let detail = outcome.error_detail.as_deref().unwrap_or("");

        if self.colors_enabled {
            let counter = format!("[{}/{}]", index, total);
            let tag = match outcome.status {
                OutcomeStatus::Success => "→".cyan(),
                OutcomeStatus::Conflict => "conflict".yellow().bold(),
                OutcomeStatus::Error => "error".red().bold(),
            };
            let _ = write!(
                self.writer,
                "{} {} {} {}",
                counter.cyan(),
                outcome.original.dimmed(),
                tag,
                outcome.proposed
            );
            if !detail.is_empty() {
                let _ = write!(self.writer, " {}", format!("({})", detail).dimmed());
            }
            let _ = writeln!(self.writer);
        } else {
            let arrow = match outcome.status {
                OutcomeStatus::Success => "->",
                OutcomeStatus::Conflict => "-> [conflict]",
                OutcomeStatus::Error => "-> [error]",
            };
            let _ = write!(
                self.writer,
                "[{}/{}] {} {} {}",
                index, total, outcome.original, arrow, outcome.proposed
            );
            if !detail.is_empty() {
                let _ = write!(self.writer, " ({})", detail);
            }
            let _ = writeln!(self.writer);
        }
    }
}
