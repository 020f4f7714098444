//! Seam for the automated workflow, where an external recognition service
//! infers media metadata and a proposed name is rendered from it.

mod template;

pub use template::{
    validate_template, NamingScheme, TemplateEngine, TemplateError, DEFAULT_MOVIE_TEMPLATE,
    DEFAULT_TV_TEMPLATE,
};

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::transform::PreviewEntry;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const INVALID_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Metadata a recognizer extracts from a filename
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub title: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub is_tv: bool,
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub source: Option<String>,
    /// Overrides the `resolution-source` quality label
    pub quality: Option<String>,
}

#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("Could not recognize '{0}'")]
    Unrecognized(String),

    #[error("Recognition service failed: {0}")]
    Service(String),
}

pub trait Recognizer {
    fn recognize(&self, filename: &str) -> Result<MediaInfo, RecognizeError>;
}

/// Replace characters no common filesystem accepts and collapse whitespace
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();

    WHITESPACE_RUN.replace_all(replaced.trim(), " ").into_owned()
}

/// Render a flat filename with the default scheme:
/// `Title (Year).ext` for movies, `Title - SxxEyy.ext` for TV
pub fn build_media_name(
    info: &MediaInfo,
    extension: Option<&str>,
) -> Result<String, TemplateError> {
    TemplateEngine::new().name_for(info, extension, &NamingScheme::default())
}

/// Ask the recognizer about every name and render it with `scheme`.
///
/// Both templates of the scheme are resolved first, so an unknown template
/// fails the whole batch. Recognition failures keep the original name.
pub fn recognize_batch<S: AsRef<str>>(
    filenames: &[S],
    recognizer: &dyn Recognizer,
    engine: &TemplateEngine,
    scheme: &NamingScheme,
) -> Result<Vec<PreviewEntry>, TemplateError> {
    engine.check_scheme(scheme)?;

    let mut entries = Vec::with_capacity(filenames.len());

    for name in filenames {
        let original = name.as_ref();
        let extension = Path::new(original).extension().and_then(|e| e.to_str());

        let proposed = match recognizer.recognize(original) {
            Ok(info) if !info.title.trim().is_empty() => {
                engine.name_for(&info, extension, scheme)?
            }
            Ok(_) => {
                warn!(name = %original, "Recognizer returned an empty title");
                original.to_string()
            }
            Err(RecognizeError::Unrecognized(_)) => {
                info!(name = %original, "Not recognized, keeping name");
                original.to_string()
            }
            Err(e @ RecognizeError::Service(_)) => {
                warn!(name = %original, error = %e, "Recognition failed");
                original.to_string()
            }
        };

        debug!(original = %original, proposed = %proposed, "Recognized");
        entries.push(PreviewEntry::new(original.to_string(), proposed));
    }

    Ok(entries)
}
