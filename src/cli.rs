use clap::{ArgGroup, Parser, ValueEnum};
use media_renamer::{AppError, CaseMode, TransformRule};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaseArg {
    Upper,
    Lower,
    Title,
}

impl From<CaseArg> for CaseMode {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Upper => CaseMode::Upper,
            CaseArg::Lower => CaseMode::Lower,
            CaseArg::Title => CaseMode::Title,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "media-renamer")]
#[command(author, version, long_about = None)]
#[command(about = "Preview and apply batch renames of media and subtitle files")]
#[command(group(
    ArgGroup::new("rule")
        .args(["replace", "regex", "prefix", "suffix", "remove", "case"])
        .required(false)
        .multiple(false)
))]
pub struct Args {
    /// Directory containing the media and subtitle files
    #[arg(required_unless_present_any = ["revert", "list_templates"])]
    pub target_dir: Option<PathBuf>,

    /// Replace every occurrence of this text
    #[arg(long, value_name = "FIND")]
    pub replace: Option<String>,

    /// Replace every match of this regular expression ($1, ${name} expand)
    #[arg(long, value_name = "PATTERN")]
    pub regex: Option<String>,

    /// Replacement text for --replace and --regex
    #[arg(long = "with", value_name = "TEXT", default_value = "")]
    pub replace_with: String,

    /// Match --replace or --regex without regard to case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Add text in front of every name
    #[arg(long, value_name = "TEXT")]
    pub prefix: Option<String>,

    /// Add text before the extension of every name
    #[arg(long, value_name = "TEXT")]
    pub suffix: Option<String>,

    /// Delete every occurrence of this text
    #[arg(long, value_name = "TEXT")]
    pub remove: Option<String>,

    /// Convert the case of every name
    #[arg(long, value_enum, value_name = "MODE")]
    pub case: Option<CaseArg>,

    /// Only list the media and subtitle files found
    #[arg(long, conflicts_with = "rule")]
    pub list: bool,

    /// Show the preview without renaming anything
    #[arg(short, long)]
    pub dry: bool,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Write the outcome history to this file
    #[arg(long, value_name = "FILE", conflicts_with = "no_history")]
    pub history: Option<PathBuf>,

    /// Do not write an outcome history file
    #[arg(long)]
    pub no_history: bool,

    /// Revert changes using a history file
    #[arg(short, long, value_name = "HISTORY_FILE", conflicts_with_all = ["rule", "list"])]
    pub revert: Option<PathBuf>,

    /// List the naming templates used for recognized media
    #[arg(long, conflicts_with_all = ["rule", "list", "revert"])]
    pub list_templates: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Checks clap cannot express on its own
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ignore_case && self.replace.is_none() && self.regex.is_none() {
            return Err(AppError::InvalidArguments(
                "--ignore-case only applies to --replace or --regex".to_string(),
            ));
        }
        Ok(())
    }

    /// The rule selected on the command line, if any
    pub fn rule(&self) -> Option<TransformRule> {
        if let Some(find) = &self.replace {
            return Some(TransformRule::Replace {
                find: find.clone(),
                replace_with: self.replace_with.clone(),
                case_sensitive: !self.ignore_case,
            });
        }

        if let Some(pattern) = &self.regex {
            let pattern = if self.ignore_case && !pattern.is_empty() {
                format!("(?i){}", pattern)
            } else {
                pattern.clone()
            };
            return Some(TransformRule::RegexReplace {
                pattern,
                replacement: self.replace_with.clone(),
            });
        }

        if let Some(text) = &self.prefix {
            return Some(TransformRule::Prefix { text: text.clone() });
        }

        if let Some(text) = &self.suffix {
            return Some(TransformRule::Suffix { text: text.clone() });
        }

        if let Some(text) = &self.remove {
            return Some(TransformRule::Remove { text: text.clone() });
        }

        self.case.map(|mode| TransformRule::CaseConvert { mode: mode.into() })
    }
}
