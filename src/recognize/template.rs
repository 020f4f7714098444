//! Named filename templates for recognized media.
//!
//! Placeholders look like `{title}` or `{season:02d}`. A template renders the
//! file name only, never a directory, so every proposed name stays a sibling
//! of the original file.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

use super::{sanitize_filename, MediaInfo, WHITESPACE_RUN};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)(?::([^}]+))?\}").unwrap());
static INTEGER_SPEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0?)(\d*)d$").unwrap());

static GROUP_OPEN_PADDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\[(])[-_\s]+").unwrap());
static GROUP_CLOSE_PADDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_\s]+([\])])").unwrap());
static EMPTY_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\)|\[\s*\]").unwrap());
static SEPARATOR_BEFORE_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_\s]+\.").unwrap());
static REPEATED_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_]{2,}").unwrap());

pub const DEFAULT_MOVIE_TEMPLATE: &str = "movie_simple";
pub const DEFAULT_TV_TEMPLATE: &str = "tv_simple";

const PLACEHOLDER_KEYS: [&str; 10] = [
    "title",
    "year",
    "season",
    "episode",
    "resolution",
    "video_codec",
    "audio_codec",
    "source",
    "quality",
    "ext",
];

const BUILTIN_TEMPLATES: [(&str, &str); 16] = [
    ("movie_default", "{title} ({year}) [{resolution}-{source}].{ext}"),
    ("movie_simple", "{title} ({year}).{ext}"),
    (
        "movie_detailed",
        "{title} ({year}) [{resolution} {video_codec} {audio_codec} {source}].{ext}",
    ),
    ("movie_quality", "{title} ({year}) [{quality}].{ext}"),
    (
        "tv_default",
        "{title} - S{season:02d}E{episode:02d} [{resolution}-{source}].{ext}",
    ),
    ("tv_simple", "{title} - S{season:02d}E{episode:02d}.{ext}"),
    (
        "tv_detailed",
        "{title} - S{season:02d}E{episode:02d} [{resolution} {video_codec} {audio_codec} {source}].{ext}",
    ),
    ("tv_quality", "{title} - S{season:02d}E{episode:02d} [{quality}].{ext}"),
    (
        "nas_movie",
        "{title} ({year}) [{resolution} {video_codec} {audio_codec}].{ext}",
    ),
    (
        "nas_tv",
        "{title} S{season:02d}E{episode:02d} [{resolution} {video_codec} {audio_codec}].{ext}",
    ),
    ("mp_movie", "{title} ({year}) [{quality}].{ext}"),
    ("mp_tv", "{title} S{season:02d}E{episode:02d} [{quality}].{ext}"),
    ("plex_movie", "{title} ({year}).{ext}"),
    ("plex_tv", "{title} - s{season:02d}e{episode:02d}.{ext}"),
    ("jellyfin_movie", "{title} ({year}) - {quality}.{ext}"),
    ("jellyfin_tv", "{title} S{season:02d}E{episode:02d}.{ext}"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template name must not be empty")]
    EmptyName,

    #[error("Template is empty")]
    EmptyTemplate,

    #[error("Template renders a path, not a file name: {0}")]
    PathSeparator(String),

    #[error("Unbalanced braces in template: {0}")]
    UnbalancedBraces(String),

    #[error("Unknown placeholder '{key}' in template: {template}")]
    UnknownPlaceholder { template: String, key: String },

    #[error("Unsupported format '{spec}' for placeholder '{key}'")]
    InvalidFormat { key: String, spec: String },
}

/// Check that a template only uses known placeholders and renders a file name
pub fn validate_template(template: &str) -> Result<(), TemplateError> {
    if template.trim().is_empty() {
        return Err(TemplateError::EmptyTemplate);
    }

    if template.contains('/') || template.contains('\\') {
        return Err(TemplateError::PathSeparator(template.to_string()));
    }

    for caps in PLACEHOLDER.captures_iter(template) {
        let key = &caps[1];
        if !PLACEHOLDER_KEYS.contains(&key) {
            return Err(TemplateError::UnknownPlaceholder {
                template: template.to_string(),
                key: key.to_string(),
            });
        }
        if let Some(spec) = caps.get(2) {
            if !INTEGER_SPEC.is_match(spec.as_str()) {
                return Err(TemplateError::InvalidFormat {
                    key: key.to_string(),
                    spec: spec.as_str().to_string(),
                });
            }
        }
    }

    let literal = PLACEHOLDER.replace_all(template, "");
    if literal.contains('{') || literal.contains('}') {
        return Err(TemplateError::UnbalancedBraces(template.to_string()));
    }

    Ok(())
}

/// Which template renders movies and which renders episodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    pub movie: String,
    pub tv: String,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self::new(DEFAULT_MOVIE_TEMPLATE, DEFAULT_TV_TEMPLATE)
    }
}

impl NamingScheme {
    pub fn new(movie: impl Into<String>, tv: impl Into<String>) -> Self {
        Self {
            movie: movie.into(),
            tv: tv.into(),
        }
    }

    pub fn template_for(&self, info: &MediaInfo) -> &str {
        if info.is_tv {
            &self.tv
        } else {
            &self.movie
        }
    }
}

/// Built-in templates plus any custom ones; custom names shadow built-ins
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    custom: BTreeMap<String, String>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom template after validating it
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        let template = template.into();

        if name.trim().is_empty() {
            return Err(TemplateError::EmptyName);
        }
        validate_template(&template)?;

        debug!(name = %name, template = %template, "Added custom template");
        self.custom.insert(name, template);
        Ok(())
    }

    pub fn get_template(&self, name: &str) -> Option<&str> {
        self.custom.get(name).map(String::as_str).or_else(|| {
            BUILTIN_TEMPLATES
                .iter()
                .find(|(builtin, _)| *builtin == name)
                .map(|(_, template)| *template)
        })
    }

    /// Every template by name, custom ones replacing built-ins of the same name
    pub fn list_templates(&self) -> BTreeMap<&str, &str> {
        let mut all: BTreeMap<&str, &str> = BUILTIN_TEMPLATES.iter().copied().collect();
        for (name, template) in &self.custom {
            all.insert(name.as_str(), template.as_str());
        }
        all
    }

    /// Fail if either template of the scheme is unknown
    pub fn check_scheme(&self, scheme: &NamingScheme) -> Result<(), TemplateError> {
        for name in [&scheme.movie, &scheme.tv] {
            if self.get_template(name).is_none() {
                return Err(TemplateError::UnknownTemplate(name.clone()));
            }
        }
        Ok(())
    }

    /// Render the named template for `info`
    pub fn render(
        &self,
        name: &str,
        info: &MediaInfo,
        extension: Option<&str>,
    ) -> Result<String, TemplateError> {
        let template = self
            .get_template(name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))?;

        let rendered = render_placeholders(template, info, extension);
        let name = sanitize_filename(&clean_rendered(&rendered));

        trace!(template = %template, rendered = %name, "Rendered template");
        Ok(name)
    }

    /// Render whichever template of the scheme fits `info`
    pub fn name_for(
        &self,
        info: &MediaInfo,
        extension: Option<&str>,
        scheme: &NamingScheme,
    ) -> Result<String, TemplateError> {
        self.render(scheme.template_for(info), info, extension)
    }
}

enum Value<'a> {
    Text(Cow<'a, str>),
    Number(u32),
    Missing,
}

fn text(value: &Option<String>) -> Value<'_> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Value::Text(Cow::Borrowed(v)),
        _ => Value::Missing,
    }
}

fn lookup<'a>(key: &str, info: &'a MediaInfo, extension: Option<&'a str>) -> Value<'a> {
    match key {
        "title" => match info.title.trim() {
            "" => Value::Text(Cow::Borrowed("Unknown")),
            title => Value::Text(Cow::Borrowed(title)),
        },
        "year" => info
            .year
            .map_or(Value::Missing, |y| Value::Number(u32::from(y))),
        "season" => Value::Number(info.season.unwrap_or(1)),
        "episode" => Value::Number(info.episode.unwrap_or(1)),
        "resolution" => text(&info.resolution),
        "video_codec" => text(&info.video_codec),
        "audio_codec" => text(&info.audio_codec),
        "source" => text(&info.source),
        "quality" => match text(&info.quality) {
            Value::Missing => Value::Text(Cow::Owned(derive_quality(info))),
            quality => quality,
        },
        "ext" => match extension.filter(|e| !e.is_empty()) {
            Some(ext) => Value::Text(Cow::Borrowed(ext)),
            None => Value::Missing,
        },
        _ => Value::Missing,
    }
}

/// `resolution-source` from whichever parts are known, else `Unknown`
fn derive_quality(info: &MediaInfo) -> String {
    let parts: Vec<&str> = [&info.resolution, &info.source]
        .into_iter()
        .filter_map(|p| p.as_deref().map(str::trim))
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        "Unknown".to_string()
    } else {
        parts.join("-")
    }
}

fn format_value(value: Value<'_>, spec: Option<&str>) -> String {
    match value {
        Value::Missing => String::new(),
        Value::Text(text) => text.into_owned(),
        Value::Number(n) => match spec.and_then(|s| INTEGER_SPEC.captures(s)) {
            Some(caps) => {
                let width = caps[2].parse::<usize>().unwrap_or(0);
                if caps[1].is_empty() {
                    format!("{:width$}", n, width = width)
                } else {
                    format!("{:0width$}", n, width = width)
                }
            }
            None => n.to_string(),
        },
    }
}

fn render_placeholders(template: &str, info: &MediaInfo, extension: Option<&str>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let spec = caps.get(2).map(|m| m.as_str());
            format_value(lookup(&caps[1], info, extension), spec)
        })
        .into_owned()
}

/// Tidy what empty placeholders leave behind: `()`, `[-]`, ` .ext`, runs of separators
fn clean_rendered(rendered: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(rendered, " ");
    let text = GROUP_OPEN_PADDING.replace_all(&text, "$1");
    let text = GROUP_CLOSE_PADDING.replace_all(&text, "$1");
    let text = EMPTY_GROUP.replace_all(&text, "");
    let text = SEPARATOR_BEFORE_DOT.replace_all(&text, ".");
    let text = REPEATED_SEPARATORS.replace_all(&text, "-");
    let text = WHITESPACE_RUN.replace_all(&text, " ");

    text.trim().trim_end_matches('.').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> MediaInfo {
        MediaInfo {
            title: "The Matrix".to_string(),
            year: Some(1999),
            resolution: Some("1080p".to_string()),
            video_codec: Some("x264".to_string()),
            audio_codec: Some("DTS".to_string()),
            source: Some("BluRay".to_string()),
            ..Default::default()
        }
    }

    fn episode() -> MediaInfo {
        MediaInfo {
            title: "Show".to_string(),
            season: Some(1),
            episode: Some(2),
            is_tv: true,
            resolution: Some("720p".to_string()),
            video_codec: Some("HEVC".to_string()),
            audio_codec: Some("AAC".to_string()),
            source: Some("WEB-DL".to_string()),
            ..Default::default()
        }
    }

    fn render(name: &str, info: &MediaInfo) -> String {
        TemplateEngine::new().render(name, info, Some("mkv")).unwrap()
    }

    #[test]
    fn test_movie_templates() {
        let info = movie();
        assert_eq!(
            render("movie_default", &info),
            "The Matrix (1999) [1080p-BluRay].mkv"
        );
        assert_eq!(render("movie_simple", &info), "The Matrix (1999).mkv");
        assert_eq!(
            render("movie_detailed", &info),
            "The Matrix (1999) [1080p x264 DTS BluRay].mkv"
        );
        assert_eq!(
            render("movie_quality", &info),
            "The Matrix (1999) [1080p-BluRay].mkv"
        );
        assert_eq!(
            render("nas_movie", &info),
            "The Matrix (1999) [1080p x264 DTS].mkv"
        );
        assert_eq!(
            render("mp_movie", &info),
            "The Matrix (1999) [1080p-BluRay].mkv"
        );
        assert_eq!(render("plex_movie", &info), "The Matrix (1999).mkv");
        assert_eq!(
            render("jellyfin_movie", &info),
            "The Matrix (1999) - 1080p-BluRay.mkv"
        );
    }

    #[test]
    fn test_tv_templates() {
        let info = episode();
        assert_eq!(
            render("tv_default", &info),
            "Show - S01E02 [720p-WEB-DL].mkv"
        );
        assert_eq!(render("tv_simple", &info), "Show - S01E02.mkv");
        assert_eq!(
            render("tv_detailed", &info),
            "Show - S01E02 [720p HEVC AAC WEB-DL].mkv"
        );
        assert_eq!(
            render("tv_quality", &info),
            "Show - S01E02 [720p-WEB-DL].mkv"
        );
        assert_eq!(render("nas_tv", &info), "Show S01E02 [720p HEVC AAC].mkv");
        assert_eq!(render("mp_tv", &info), "Show S01E02 [720p-WEB-DL].mkv");
        assert_eq!(render("plex_tv", &info), "Show - s01e02.mkv");
        assert_eq!(render("jellyfin_tv", &info), "Show S01E02.mkv");
    }

    #[test]
    fn test_every_builtin_is_valid() {
        for (name, template) in BUILTIN_TEMPLATES {
            assert!(validate_template(template).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_missing_fields_are_cleaned_away() {
        let info = MediaInfo {
            title: "Untitled".to_string(),
            ..Default::default()
        };
        assert_eq!(render("movie_default", &info), "Untitled.mkv");
        assert_eq!(render("movie_quality", &info), "Untitled [Unknown].mkv");
    }

    #[test]
    fn test_partial_group_is_trimmed() {
        let info = MediaInfo {
            title: "Heat".to_string(),
            year: Some(1995),
            resolution: Some("2160p".to_string()),
            ..Default::default()
        };
        assert_eq!(render("movie_default", &info), "Heat (1995) [2160p].mkv");
    }

    #[test]
    fn test_without_extension() {
        let engine = TemplateEngine::new();
        let name = engine.render("movie_simple", &movie(), None).unwrap();
        assert_eq!(name, "The Matrix (1999)");
    }

    #[test]
    fn test_integer_format_widths() {
        let mut engine = TemplateEngine::new();
        engine
            .add_template("wide", "{title} {episode:03d} {season} {year:6d}.{ext}")
            .unwrap();

        let name = engine.render("wide", &episode(), Some("mkv")).unwrap();
        assert_eq!(name, "Show 002 1.mkv");
    }

    #[test]
    fn test_custom_template_shadows_builtin() {
        let mut engine = TemplateEngine::new();
        engine
            .add_template("movie_simple", "{title} [{year}].{ext}")
            .unwrap();

        assert_eq!(
            engine.render("movie_simple", &movie(), Some("mp4")).unwrap(),
            "The Matrix [1999].mp4"
        );
        assert_eq!(
            engine.list_templates().get("movie_simple"),
            Some(&"{title} [{year}].{ext}")
        );
        assert_eq!(engine.list_templates().len(), BUILTIN_TEMPLATES.len());
    }

    #[test]
    fn test_unknown_template() {
        let err = TemplateEngine::new()
            .render("nope", &movie(), Some("mkv"))
            .unwrap_err();
        assert_eq!(err, TemplateError::UnknownTemplate("nope".to_string()));
    }

    #[test]
    fn test_invalid_templates_are_rejected() {
        let mut engine = TemplateEngine::new();

        assert!(matches!(
            engine.add_template("a", "{title} ({year}/{title}.{ext}"),
            Err(TemplateError::PathSeparator(_))
        ));
        assert!(matches!(
            engine.add_template("b", "{title} {year.{ext}"),
            Err(TemplateError::UnbalancedBraces(_))
        ));
        assert!(matches!(
            engine.add_template("c", "{title} {director}.{ext}"),
            Err(TemplateError::UnknownPlaceholder { ref key, .. }) if key == "director"
        ));
        assert!(matches!(
            engine.add_template("d", "{title} {season:.2f}.{ext}"),
            Err(TemplateError::InvalidFormat { .. })
        ));
        assert_eq!(engine.add_template("e", "  "), Err(TemplateError::EmptyTemplate));
        assert_eq!(
            engine.add_template(" ", "{title}.{ext}"),
            Err(TemplateError::EmptyName)
        );

        assert!(engine.get_template("a").is_none());
    }

    #[test]
    fn test_check_scheme() {
        let engine = TemplateEngine::new();
        assert!(engine.check_scheme(&NamingScheme::default()).is_ok());
        assert_eq!(
            engine.check_scheme(&NamingScheme::new("plex_movie", "missing_tv")),
            Err(TemplateError::UnknownTemplate("missing_tv".to_string()))
        );
    }

    #[test]
    fn test_values_are_sanitized() {
        let info = MediaInfo {
            title: "Face/Off".to_string(),
            year: Some(1997),
            ..Default::default()
        };
        assert_eq!(render("movie_simple", &info), "Face_Off (1997).mkv");
    }
}
