use std::collections::BTreeSet;
use std::env;

/// Environment variable names for scan configuration
pub const ENV_MEDIA_EXTENSIONS: &str = "MEDIA_RENAMER_MEDIA_EXTENSIONS";
pub const ENV_SUBTITLE_EXTENSIONS: &str = "MEDIA_RENAMER_SUBTITLE_EXTENSIONS";

pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] =
    &["mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v"];
pub const DEFAULT_SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass", "ssa", "sub", "vtt"];

/// Extension sets used to classify scanned files.
///
/// Extensions are stored lowercased and without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    media: BTreeSet<String>,
    subtitle: BTreeSet<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_MEDIA_EXTENSIONS.iter().copied(),
            DEFAULT_SUBTITLE_EXTENSIONS.iter().copied(),
        )
    }
}

impl ScanConfig {
    pub fn new<M, S>(media: M, subtitle: S) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            media: media.into_iter().filter_map(normalize_extension).collect(),
            subtitle: subtitle.into_iter().filter_map(normalize_extension).collect(),
        }
    }

    pub fn is_media_extension(&self, ext: &str) -> bool {
        self.media.contains(&ext.to_lowercase())
    }

    pub fn is_subtitle_extension(&self, ext: &str) -> bool {
        self.subtitle.contains(&ext.to_lowercase())
    }

    pub fn media_extensions(&self) -> impl Iterator<Item = &str> {
        self.media.iter().map(String::as_str)
    }

    pub fn subtitle_extensions(&self) -> impl Iterator<Item = &str> {
        self.subtitle.iter().map(String::as_str)
    }
}

fn normalize_extension(raw: impl AsRef<str>) -> Option<String> {
    let ext = raw.as_ref().trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

fn parse_extension_list(value: &str) -> Vec<String> {
    value.split(',').filter_map(normalize_extension).collect()
}

/// Load scan configuration from environment variables
///
/// Optional environment variables (comma-separated lists, dots optional):
/// - `MEDIA_RENAMER_MEDIA_EXTENSIONS`
/// - `MEDIA_RENAMER_SUBTITLE_EXTENSIONS`
///
/// An unset or empty variable keeps the built-in defaults. These can be set
/// in a `.env` file in the working directory.
pub fn scan_config_from_env() -> ScanConfig {
    let defaults = ScanConfig::default();

    let media = env::var(ENV_MEDIA_EXTENSIONS)
        .ok()
        .map(|v| parse_extension_list(&v))
        .filter(|list| !list.is_empty())
        .map(|list| list.into_iter().collect())
        .unwrap_or(defaults.media);

    let subtitle = env::var(ENV_SUBTITLE_EXTENSIONS)
        .ok()
        .map(|v| parse_extension_list(&v))
        .filter(|list| !list.is_empty())
        .map(|list| list.into_iter().collect())
        .unwrap_or(defaults.subtitle);

    ScanConfig { media, subtitle }
}
