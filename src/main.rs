mod cli;
mod output;
mod progress;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use media_renamer::history::{write_history, write_history_to, HistoryFile, OperationType};
use media_renamer::{
    logging, revert_from_history, scan_config_from_env, scan_directory, AppError, ApplySlot,
    Controller, FileClass, OutcomeSummary, RenameOutcome, RevertOptions, TemplateEngine,
};
use output::{
    display_apply_report, display_preview, display_revert, display_scan, display_templates,
};
use progress::Progress;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, error, info};

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("\nError: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

fn run(args: Args) -> Result<(), AppError> {
    args.validate()?;

    if args.list_templates {
        let engine = TemplateEngine::new();
        display_templates(&engine.list_templates(), &mut io::stdout()).map_err(display_error)?;
        return Ok(());
    }

    let mut progress = Progress::new(args.verbose > 0);

    if let Some(history_file) = &args.revert {
        return run_revert(history_file, &args, &mut progress);
    }

    let target_dir = match &args.target_dir {
        Some(dir) => dir.as_path(),
        None => return Err(AppError::MissingRule),
    };

    // Step 1: Scan directory
    let config = scan_config_from_env();
    debug!(
        media = ?config.media_extensions().collect::<Vec<_>>(),
        subtitle = ?config.subtitle_extensions().collect::<Vec<_>>(),
        "Extensions"
    );
    progress.scan_start(target_dir);
    let files = scan_directory(target_dir, &config)?;
    let media = files.iter().filter(|f| f.class == FileClass::Media).count();
    progress.scan_complete(media, files.len() - media);

    info!("Found {} files", files.len());
    for file in &files {
        debug!("  {}", file.name);
    }

    if args.list {
        display_scan(&files, &mut io::stdout()).map_err(display_error)?;
        return Ok(());
    }

    let rule = args.rule().ok_or(AppError::MissingRule)?;
    let rule_description = rule.description();

    // Step 2: Preview
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    let mut controller = Controller::new();
    let entries = controller.preview(target_dir, &names, &rule)?;
    let changed = entries.iter().filter(|e| e.changed).count();

    display_preview(entries, &rule_description, args.dry, &mut io::stdout())
        .map_err(display_error)?;

    if args.dry || changed == 0 {
        return Ok(());
    }

    // Step 3: Confirm and apply
    let confirmed = args.yes
        || confirm_apply(changed)
            .map_err(|e| AppError::Other(format!("Failed to read confirmation: {:#}", e)))?;

    let report = controller.apply(confirmed, &mut progress)?;
    let summary = OutcomeSummary::from_outcomes(&report.outcomes);

    progress.apply_complete(&summary);
    display_apply_report(&report, &mut io::stdout()).map_err(display_error)?;

    if !args.no_history {
        record_history(
            &args,
            target_dir,
            OperationType::Rename,
            Some(rule_description),
            &report.outcomes,
            &mut progress,
        );
    }

    partial_failure(&summary, report.outcomes.len())
}

fn run_revert(history_file: &Path, args: &Args, progress: &mut Progress) -> Result<(), AppError> {
    info!("Revert mode: {:?}", history_file);

    let options = RevertOptions {
        dry_run: args.dry,
        write_history: !args.no_history && args.history.is_none(),
    };

    let result = revert_from_history(history_file, &options, &ApplySlot::global(), progress)
        .map_err(|e| match AppError::from(e) {
            AppError::HistoryError { message, .. } => AppError::HistoryError {
                path: Some(history_file.to_path_buf()),
                message,
            },
            other => other,
        })?;

    display_revert(&result, &mut io::stdout()).map_err(display_error)?;

    if result.dry_run {
        return Ok(());
    }

    let summary = OutcomeSummary::from_outcomes(&result.outcomes);
    progress.apply_complete(&summary);

    if let Some(path) = &result.revert_history_path {
        progress.history_written(path);
    } else if let Some(dir) = result.pairs.first().and_then(|p| p.original_path.parent()) {
        if !args.no_history {
            record_history(
                args,
                dir,
                OperationType::Revert,
                None,
                &result.outcomes,
                progress,
            );
        }
    }

    partial_failure(&summary, result.outcomes.len())
}

/// Forward outcomes to the history log; a failed write only warns
fn record_history(
    args: &Args,
    target_dir: &Path,
    operation: OperationType,
    rule: Option<String>,
    outcomes: &[RenameOutcome],
    progress: &mut Progress,
) {
    if outcomes.is_empty() {
        return;
    }

    let directory = std::fs::canonicalize(target_dir).unwrap_or_else(|_| target_dir.to_path_buf());
    let history = HistoryFile::new(operation, directory, rule, outcomes.to_vec());

    let written = match &args.history {
        Some(path) => write_history_to(&history, path),
        None => write_history(&history, target_dir),
    };

    match written {
        Ok(path) => progress.history_written(&path),
        Err(e) => {
            error!("Failed to write history: {}", e);
            progress.warn(&format!("History not saved: {}", e));
        }
    }
}

fn partial_failure(summary: &OutcomeSummary, total: usize) -> Result<(), AppError> {
    if summary.failed() > 0 {
        return Err(AppError::PartialFailure {
            failed: summary.failed(),
            total,
        });
    }
    Ok(())
}

fn confirm_apply(count: usize) -> anyhow::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "Apply {} renames? [y/N] ", count).context("writing prompt")?;
    stderr.flush().context("flushing prompt")?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("reading answer from stdin")?;

    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn display_error(e: io::Error) -> AppError {
    AppError::Other(format!("Failed to display output: {}", e))
}
