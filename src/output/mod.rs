use media_renamer::{
    ApplyReport, FileClass, FileDescriptor, OutcomeStatus, OutcomeSummary, PreviewEntry,
    RevertResult,
};
use std::collections::BTreeMap;
use std::io::{self, Write};

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// List scanned files in scan order
pub fn display_scan(files: &[FileDescriptor], writer: &mut impl Write) -> io::Result<()> {
    if files.is_empty() {
        writeln!(writer, "No media or subtitle files found.")?;
        return Ok(());
    }

    for file in files {
        writeln!(
            writer,
            "  {:<8} {:>10}  {}",
            file.class.label(),
            human_size(file.size_bytes),
            file.name
        )?;
    }

    let media = files.iter().filter(|f| f.class == FileClass::Media).count();
    writeln!(writer)?;
    writeln!(
        writer,
        "{} files: {} media, {} subtitle",
        files.len(),
        media,
        files.len() - media
    )?;

    Ok(())
}

/// List naming templates by name
pub fn display_templates(
    templates: &BTreeMap<&str, &str>,
    writer: &mut impl Write,
) -> io::Result<()> {
    let width = templates.keys().map(|n| n.len()).max().unwrap_or(0);

    for (name, template) in templates {
        writeln!(writer, "  {:<width$}  {}", name, template, width = width)?;
    }

    Ok(())
}

/// Display the planned changes of a preview
pub fn display_preview(
    entries: &[PreviewEntry],
    rule: &str,
    dry_run: bool,
    writer: &mut impl Write,
) -> io::Result<()> {
    let changed = entries.iter().filter(|e| e.changed).count();

    writeln!(writer)?;
    if dry_run {
        writeln!(writer, "========================================")?;
        writeln!(writer, "              DRY RUN")?;
        writeln!(writer, "========================================")?;
        writeln!(writer)?;
    }
    writeln!(writer, "Rule:    {}", rule)?;
    writeln!(writer, "Files:   {}", entries.len())?;
    writeln!(writer, "Changed: {}", changed)?;
    writeln!(writer)?;

    if changed == 0 {
        writeln!(writer, "No file names would change.")?;
        return Ok(());
    }

    writeln!(writer, "Planned changes:")?;
    writeln!(writer)?;

    for (i, entry) in entries.iter().filter(|e| e.changed).enumerate() {
        writeln!(writer, "  {}. From: {}", i + 1, entry.original)?;
        writeln!(writer, "     To:   {}", entry.proposed)?;
    }

    writeln!(writer)?;
    writeln!(writer, "----------------------------------------")?;
    writeln!(
        writer,
        "{} of {} files would be renamed, {} unchanged",
        changed,
        entries.len(),
        entries.len() - changed
    )?;

    if dry_run {
        writeln!(writer)?;
        writeln!(writer, "Run without --dry to apply these changes.")?;
    }

    Ok(())
}

/// Display the outcomes of an applied preview
pub fn display_apply_report(report: &ApplyReport, writer: &mut impl Write) -> io::Result<()> {
    let summary = OutcomeSummary::from_outcomes(&report.outcomes);

    writeln!(writer)?;
    writeln!(writer, "Renamed {} files.", summary.succeeded)?;

    if !report.skipped.is_empty() {
        writeln!(writer, "  {} skipped, unchanged.", report.skipped.len())?;
    }

    write_failures(&report.outcomes, writer)
}

/// Display the pairs or outcomes of a revert
pub fn display_revert(result: &RevertResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;

    if result.dry_run {
        writeln!(writer, "DRY RUN: {} renames would be reverted", result.pairs.len())?;
        writeln!(writer)?;
        for (i, pair) in result.pairs.iter().enumerate() {
            writeln!(writer, "  {}. From: {}", i + 1, pair.original_name())?;
            writeln!(writer, "     To:   {}", pair.proposed_name)?;
        }
        return Ok(());
    }

    let summary = OutcomeSummary::from_outcomes(&result.outcomes);
    writeln!(writer, "Reverted {} files.", summary.succeeded)?;

    write_failures(&result.outcomes, writer)
}

fn write_failures(
    outcomes: &[media_renamer::RenameOutcome],
    writer: &mut impl Write,
) -> io::Result<()> {
    let failures: Vec<_> = outcomes
        .iter()
        .filter(|o| o.status != OutcomeStatus::Success)
        .collect();

    if failures.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "Not renamed:")?;
    for outcome in failures {
        let label = match outcome.status {
            OutcomeStatus::Conflict => "conflict",
            _ => "error",
        };
        writeln!(
            writer,
            "  [{}] {} -> {}: {}",
            label,
            outcome.original,
            outcome.proposed,
            outcome.error_detail.as_deref().unwrap_or("")
        )?;
    }

    Ok(())
}
