use serde::{Deserialize, Serialize};

use super::hash::TrackId;

/// Represent a playable track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Length in seconds, `0.0` while unknown.
    #[serde(default)]
    pub duration_seconds: f64,
    /// Where the audio lives: a URL or a local path.
    pub source_locator: String,
    #[serde(default)]
    pub cover_glyph: Option<String>,
}

impl Track {
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        source_locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_seconds: 0.0,
            source_locator: source_locator.into(),
            cover_glyph: None,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_cover(mut self, glyph: impl Into<String>) -> Self {
        self.cover_glyph = Some(glyph.into());
        self
    }

    pub fn is_duration_known(&self) -> bool {
        self.duration_seconds > 0.0
    }

    /// Whether the locator points at a remote resource the browser fetches itself.
    pub fn is_remote(&self) -> bool {
        self.source_locator.starts_with("http://") || self.source_locator.starts_with("https://")
    }
}

/// A usable duration is finite and not negative.
pub fn is_valid_duration(seconds: f64) -> bool {
    seconds.is_finite() && seconds >= 0.0
}

/// Formats seconds as `m:ss`, dropping the fractional part.
pub fn format_duration(seconds: f64) -> String {
    let total = if is_valid_duration(seconds) {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
