use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub http: HttpConfig,
    #[serde(default)]
    pub library_source: LibrarySource,
    /// Tracks appended before anything found under `library_source`.
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        toml::from_str(contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LibrarySource {
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default)]
    pub ignored_dirs: Vec<PathBuf>,
}

/// A track declared by hand in the config file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TrackEntry {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// `0` or missing means the player learns it at play time.
    #[serde(default)]
    pub duration_seconds: f64,
    /// URL or local path of the audio.
    pub source: String,
    pub cover: Option<String>,
}
