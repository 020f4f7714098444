use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    Upper,
    Lower,
    Title,
}

/// One text rule applied uniformly to every name in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformRule {
    Replace {
        find: String,
        replace_with: String,
        case_sensitive: bool,
    },
    RegexReplace {
        pattern: String,
        replacement: String,
    },
    Prefix {
        text: String,
    },
    Suffix {
        text: String,
    },
    Remove {
        text: String,
    },
    CaseConvert {
        mode: CaseMode,
    },
}

impl TransformRule {
    pub fn description(&self) -> String {
        match self {
            TransformRule::Replace {
                find,
                replace_with,
                case_sensitive,
            } => {
                let sensitivity = if *case_sensitive { "" } else { " (ignore case)" };
                format!("replace '{}' with '{}'{}", find, replace_with, sensitivity)
            }
            TransformRule::RegexReplace {
                pattern,
                replacement,
            } => format!("regex '{}' -> '{}'", pattern, replacement),
            TransformRule::Prefix { text } => format!("prefix '{}'", text),
            TransformRule::Suffix { text } => format!("suffix '{}'", text),
            TransformRule::Remove { text } => format!("remove '{}'", text),
            TransformRule::CaseConvert { mode } => match mode {
                CaseMode::Upper => "uppercase".to_string(),
                CaseMode::Lower => "lowercase".to_string(),
                CaseMode::Title => "title case".to_string(),
            },
        }
    }
}

/// A name as it is now and as a rule would leave it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub original: String,
    pub proposed: String,
    pub changed: bool,
}

impl PreviewEntry {
    pub fn new(original: String, proposed: String) -> Self {
        let changed = original != proposed;
        Self {
            original,
            proposed,
            changed,
        }
    }
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
