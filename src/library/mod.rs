//! Populates the playlist from the config file and the music directories.

use std::path::PathBuf;

use log::{info, warn};

use crate::{
    config::{Config, TrackEntry},
    domain::{
        hash::TrackId,
        track::{Track, is_valid_duration},
    },
    library::error::LibraryError,
    playlist::Playlist,
};

pub mod error;
pub mod fs;

/// Builds the startup playlist: configured tracks first, in file order, then
/// every music file under the library roots.
///
/// IDs already present are skipped with a warning, so the served playlist
/// never holds two tracks with the same ID.
pub fn load_playlist(config: &Config) -> Result<Playlist, LibraryError> {
    let mut playlist = Playlist::new();

    for entry in &config.tracks {
        add_unless_duplicate(&mut playlist, track_from_entry(entry))?;
    }

    let files = fs::scan_dirs(&config.library_source)?;
    let scanned = files.len();
    for file in files {
        add_unless_duplicate(&mut playlist, file.into_track())?;
    }

    info!(
        "Playlist loaded: {} tracks ({} configured, {} scanned)",
        playlist.len(),
        config.tracks.len(),
        scanned
    );
    Ok(playlist)
}

fn add_unless_duplicate(playlist: &mut Playlist, track: Track) -> Result<(), LibraryError> {
    match add_track(playlist, track) {
        Err(LibraryError::DuplicateTrack(id)) => {
            warn!("Skipping track {id}: id already in playlist");
            Ok(())
        }
        other => other,
    }
}

pub fn track_from_entry(entry: &TrackEntry) -> Track {
    Track {
        id: TrackId::new(entry.id.clone()),
        title: entry.title.clone(),
        artist: entry.artist.clone(),
        duration_seconds: entry.duration_seconds,
        source_locator: entry.source.clone(),
        cover_glyph: entry.cover.clone(),
    }
}

pub fn validate_track(track: &Track) -> Result<(), LibraryError> {
    let invalid = |reason: &str| LibraryError::InvalidTrack {
        track: track.id.clone(),
        reason: reason.to_string(),
    };

    if track.id.is_empty() {
        return Err(invalid("id is empty"));
    }
    if !is_valid_duration(track.duration_seconds) {
        return Err(invalid("duration must be a finite, non-negative number"));
    }
    if track.source_locator.trim().is_empty() {
        return Err(invalid("source is empty"));
    }
    Ok(())
}

/// Appends `track` after checking it and keeping IDs unique.
pub fn add_track(playlist: &mut Playlist, track: Track) -> Result<(), LibraryError> {
    validate_track(&track)?;
    if playlist.contains(track.id.as_str()) {
        return Err(LibraryError::DuplicateTrack(track.id));
    }
    playlist.append(track);
    Ok(())
}

/// Local file behind a track's locator, checked to be a readable music file.
pub fn resolve_local_file(track: &Track) -> Result<PathBuf, LibraryError> {
    let path = PathBuf::from(&track.source_locator);
    if fs::is_valid_music_path(&path) {
        Ok(path)
    } else {
        Err(LibraryError::InvalidTrackFile {
            track: track.id.clone(),
        })
    }
}
