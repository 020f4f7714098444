mod types;

pub use types::*;

use regex::{NoExpand, Regex};
use tracing::{debug, trace};

/// A rule with its pattern compiled, ready to run over a whole batch
enum CompiledRule<'a> {
    Identity,
    Literal { find: &'a str, replace_with: &'a str },
    Pattern { regex: Regex, replacement: &'a str, expand: bool },
    Prefix(&'a str),
    Suffix(&'a str),
    Remove(&'a str),
    Case(CaseMode),
}

impl<'a> CompiledRule<'a> {
    fn compile(rule: &'a TransformRule) -> Result<Self, TransformError> {
        let compiled = match rule {
            TransformRule::Replace { find, .. } if find.is_empty() => CompiledRule::Identity,
            TransformRule::Replace {
                find,
                replace_with,
                case_sensitive: true,
            } => CompiledRule::Literal {
                find,
                replace_with,
            },
            TransformRule::Replace {
                find,
                replace_with,
                case_sensitive: false,
            } => {
                let pattern = format!("(?i){}", regex::escape(find));
                CompiledRule::Pattern {
                    regex: build_regex(&pattern)?,
                    replacement: replace_with,
                    expand: false,
                }
            }
            TransformRule::RegexReplace { pattern, .. } if pattern.is_empty() => {
                CompiledRule::Identity
            }
            TransformRule::RegexReplace {
                pattern,
                replacement,
            } => CompiledRule::Pattern {
                regex: build_regex(pattern)?,
                replacement,
                expand: true,
            },
            TransformRule::Prefix { text } => CompiledRule::Prefix(text),
            TransformRule::Suffix { text } => CompiledRule::Suffix(text),
            TransformRule::Remove { text } if text.is_empty() => CompiledRule::Identity,
            TransformRule::Remove { text } => CompiledRule::Remove(text),
            TransformRule::CaseConvert { mode } => CompiledRule::Case(*mode),
        };

        Ok(compiled)
    }

    fn apply(&self, filename: &str) -> String {
        match self {
            CompiledRule::Identity => filename.to_string(),
            CompiledRule::Literal { find, replace_with } => filename.replace(find, replace_with),
            CompiledRule::Pattern {
                regex,
                replacement,
                expand,
            } => {
                if *expand {
                    regex.replace_all(filename, *replacement).into_owned()
                } else {
                    regex.replace_all(filename, NoExpand(replacement)).into_owned()
                }
            }
            CompiledRule::Prefix(text) => format!("{}{}", text, filename),
            CompiledRule::Suffix(text) => insert_suffix(filename, text),
            CompiledRule::Remove(text) => filename.replace(text, ""),
            CompiledRule::Case(mode) => convert_case(filename, *mode),
        }
    }
}

fn build_regex(pattern: &str) -> Result<Regex, TransformError> {
    Regex::new(pattern).map_err(|source| TransformError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Insert `text` before the last '.'; a name without one (or a dotfile) gets it appended
fn insert_suffix(filename: &str, text: &str) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}", &filename[..dot], text, &filename[dot..]),
        _ => format!("{}{}", filename, text),
    }
}

fn convert_case(filename: &str, mode: CaseMode) -> String {
    match mode {
        CaseMode::Upper => filename.to_uppercase(),
        CaseMode::Lower => filename.to_lowercase(),
        CaseMode::Title => filename
            .split(' ')
            .map(capitalize_word)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Apply a single rule to a single filename
pub fn apply_rule(filename: &str, rule: &TransformRule) -> Result<String, TransformError> {
    let compiled = CompiledRule::compile(rule)?;
    Ok(compiled.apply(filename))
}

/// Compute the proposed name for every filename, in input order.
///
/// The rule is compiled before any name is touched, so an invalid pattern
/// fails the whole call and nothing is produced.
pub fn batch_preview<S: AsRef<str>>(
    filenames: &[S],
    rule: &TransformRule,
) -> Result<Vec<PreviewEntry>, TransformError> {
    debug!(count = filenames.len(), rule = %rule.description(), "Building preview");

    let compiled = CompiledRule::compile(rule)?;

    let entries: Vec<PreviewEntry> = filenames
        .iter()
        .map(|name| {
            let original = name.as_ref();
            let proposed = compiled.apply(original);
            trace!(original = %original, proposed = %proposed, "Previewed");
            PreviewEntry::new(original.to_string(), proposed)
        })
        .collect();

    debug!(
        changed = entries.iter().filter(|e| e.changed).count(),
        "Preview built"
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace(find: &str, with: &str, case_sensitive: bool) -> TransformRule {
        TransformRule::Replace {
            find: find.to_string(),
            replace_with: with.to_string(),
            case_sensitive,
        }
    }

    fn regex_rule(pattern: &str, replacement: &str) -> TransformRule {
        TransformRule::RegexReplace {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }

    fn apply(name: &str, rule: &TransformRule) -> String {
        apply_rule(name, rule).unwrap()
    }

    #[test]
    fn test_replace_case_sensitive_all_occurrences() {
        let rule = replace("Show", "Series", true);
        assert_eq!(apply("Show.Show.show.mkv", &rule), "Series.Series.show.mkv");
    }

    #[test]
    fn test_replace_is_non_overlapping() {
        assert_eq!(apply("aaaa.mkv", &replace("aa", "b", true)), "bb.mkv");
        assert_eq!(apply("aaa.mkv", &replace("aa", "b", true)), "ba.mkv");
    }

    #[test]
    fn test_replace_case_insensitive() {
        let rule = replace("show", "Series", false);
        assert_eq!(apply("SHOW.Show.show.mkv", &rule), "Series.Series.Series.mkv");
    }

    #[test]
    fn test_replace_case_insensitive_treats_find_literally() {
        let rule = replace("(1080p)", "[HD]", false);
        assert_eq!(apply("Movie (1080P).mkv", &rule), "Movie [HD].mkv");
        assert_eq!(apply("Movie.1080p.mkv", &rule), "Movie.1080p.mkv");
    }

    #[test]
    fn test_replace_case_insensitive_replacement_is_verbatim() {
        let rule = replace("x", "$1", false);
        assert_eq!(apply("aXb.mkv", &rule), "a$1b.mkv");
    }

    #[test]
    fn test_replace_empty_find_is_identity() {
        assert_eq!(apply("A.mp4", &replace("", "zzz", true)), "A.mp4");
        assert_eq!(apply("A.mp4", &replace("", "zzz", false)), "A.mp4");
    }

    #[test]
    fn test_regex_replace_global_with_backreferences() {
        let rule = regex_rule(r"S(\d+)E(\d+)", "${1}x$2");
        assert_eq!(apply("Show.S01E02.S01E03.mkv", &rule), "Show.01x02.01x03.mkv");
    }

    #[test]
    fn test_regex_replace_named_group() {
        let rule = regex_rule(r"(?P<year>\d{4})", "(${year})");
        assert_eq!(apply("Movie 1999.mkv", &rule), "Movie (1999).mkv");
    }

    #[test]
    fn test_regex_empty_pattern_is_identity() {
        assert_eq!(apply("A.mp4", &regex_rule("", "x")), "A.mp4");
    }

    #[test]
    fn test_invalid_pattern() {
        let result = apply_rule("A.mp4", &regex_rule("(unterminated", "x"));
        assert!(matches!(result, Err(TransformError::InvalidPattern { .. })));
    }

    #[test]
    fn test_prefix() {
        let rule = TransformRule::Prefix {
            text: "New_".to_string(),
        };
        assert_eq!(apply("A.mp4", &rule), "New_A.mp4");
    }

    #[test]
    fn test_suffix_before_extension() {
        let rule = TransformRule::Suffix {
            text: "_v2".to_string(),
        };
        assert_eq!(apply("Show.S01E02.mkv", &rule), "Show.S01E02_v2.mkv");
    }

    #[test]
    fn test_suffix_without_usable_extension() {
        let rule = TransformRule::Suffix {
            text: "_v2".to_string(),
        };
        assert_eq!(apply("README", &rule), "README_v2");
        assert_eq!(apply(".hidden", &rule), ".hidden_v2");
    }

    #[test]
    fn test_remove() {
        let rule = TransformRule::Remove {
            text: "[Group] ".to_string(),
        };
        assert_eq!(apply("[Group] Show [Group] 01.mkv", &rule), "Show 01.mkv");
        assert_eq!(apply("[group] Show.mkv", &rule), "[group] Show.mkv");
    }

    #[test]
    fn test_case_upper_lower() {
        let upper = TransformRule::CaseConvert {
            mode: CaseMode::Upper,
        };
        let lower = TransformRule::CaseConvert {
            mode: CaseMode::Lower,
        };
        assert_eq!(apply("Show.s01e02.mkv", &upper), "SHOW.S01E02.MKV");
        assert_eq!(apply("Show.S01E02.MKV", &lower), "show.s01e02.mkv");
    }

    #[test]
    fn test_case_upper_is_idempotent() {
        let upper = TransformRule::CaseConvert {
            mode: CaseMode::Upper,
        };
        for name in ["straße.mkv", "Ünïcode file.srt", "plain.mp4"] {
            let once = apply(name, &upper);
            assert_eq!(apply(&once, &upper), once);
        }
    }

    #[test]
    fn test_case_title_splits_on_spaces_only() {
        let title = TransformRule::CaseConvert {
            mode: CaseMode::Title,
        };
        assert_eq!(apply("the MATRIX reloaded.mkv", &title), "The Matrix Reloaded.mkv");
        assert_eq!(apply("the.matrix.mkv", &title), "The.matrix.mkv");
        assert_eq!(apply("a  b", &title), "A  B");
    }

    #[test]
    fn test_suffix_then_remove_round_trip() {
        let suffix = TransformRule::Suffix {
            text: "_EXTRA".to_string(),
        };
        let remove = TransformRule::Remove {
            text: "_EXTRA".to_string(),
        };
        for name in ["Show.S01E02.mkv", "noext", "Movie (1999).mp4"] {
            assert_eq!(apply(&apply(name, &suffix), &remove), name);
        }
    }

    #[test]
    fn test_batch_preview_prefix() {
        let rule = TransformRule::Prefix {
            text: "New_".to_string(),
        };
        let entries = batch_preview(&["A.mp4", "B.mp4"], &rule).unwrap();

        assert_eq!(
            entries,
            vec![
                PreviewEntry::new("A.mp4".into(), "New_A.mp4".into()),
                PreviewEntry::new("B.mp4".into(), "New_B.mp4".into()),
            ]
        );
        assert!(entries.iter().all(|e| e.changed));
    }

    #[test]
    fn test_batch_preview_changed_matches_apply_rule() {
        let names = ["Show.mkv", "show.mkv", "Other.srt"];
        let rules = [
            replace("Show", "Show", true),
            replace("show", "Show", false),
            TransformRule::CaseConvert {
                mode: CaseMode::Lower,
            },
            TransformRule::Suffix {
                text: String::new(),
            },
        ];

        for rule in &rules {
            let entries = batch_preview(&names, rule).unwrap();
            for (name, entry) in names.iter().zip(&entries) {
                let proposed = apply_rule(name, rule).unwrap();
                assert_eq!(entry.proposed, proposed);
                assert_eq!(entry.changed, proposed != *name);
            }
        }
    }

    #[test]
    fn test_batch_preview_invalid_pattern_produces_nothing() {
        let result = batch_preview(&["A.mp4", "B.mp4"], &regex_rule("(unterminated", "x"));
        assert!(matches!(result, Err(TransformError::InvalidPattern { .. })));
    }

    #[test]
    fn test_batch_preview_preserves_order() {
        let rule = TransformRule::Remove {
            text: "x".to_string(),
        };
        let entries = batch_preview(&["c.mkv", "a.mkv", "b.mkv"], &rule).unwrap();
        let originals: Vec<_> = entries.iter().map(|e| e.original.as_str()).collect();
        assert_eq!(originals, vec!["c.mkv", "a.mkv", "b.mkv"]);
    }
}
