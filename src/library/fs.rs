//! Module to scan music directories in the file system

use log::warn;
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::{
    config::LibrarySource,
    domain::{hash::TrackId, track::Track},
    library::error::LibraryError,
};

const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "m4a", "ogg", "aac"];

const UNKNOWN_ARTIST: &str = "Unknown Artist";

pub fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MUSIC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ObservedFile {
    pub track_id: TrackId,
    pub path: PathBuf,
}

impl ObservedFile {
    pub fn new(id: TrackId, path: PathBuf) -> Self {
        Self { track_id: id, path }
    }

    /// Builds a track from what the path tells us. The duration stays unknown
    /// until the browser has loaded the audio.
    pub fn into_track(self) -> Track {
        let title = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.track_id.to_string());
        let artist = self
            .path
            .parent()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        Track::new(
            self.track_id,
            title,
            artist,
            self.path.to_string_lossy().into_owned(),
        )
    }
}

/// Recursively scans all music files in the given directory, in file name
/// order. Retrieves their paths and track ids
pub fn scan_dir(
    follow_symlinks: bool,
    root: &Path,
    ignored_dirs: &[PathBuf],
) -> Result<Vec<ObservedFile>, LibraryError> {
    let root_str = root.to_string_lossy();

    let walker = WalkDir::new(root)
        .follow_links(follow_symlinks)
        .sort_by_file_name();

    let paths = walker
        .into_iter()
        // keep the entry if it's not inside any ignored directory
        .filter_entry(|entry| {
            !ignored_dirs
                .iter()
                .any(|ignored| entry.path().starts_with(ignored))
        })
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("error while scanning dir {root_str}, skipping an entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_music_file(e.path()))
        .map(|e| e.into_path());

    let files = paths
        .filter_map(|path| match TrackId::from_file(&path) {
            Ok(id) => Some(ObservedFile::new(id, path)),
            Err(err) => {
                warn!("skipping unreadable music file: {err:#}");
                None
            }
        })
        .collect();

    Ok(files)
}

/// Recursively scans all music files in the configured roots, root by root.
pub fn scan_dirs(config: &LibrarySource) -> Result<Vec<ObservedFile>, LibraryError> {
    let scanned_dirs = config
        .roots
        .iter()
        .map(|root| scan_dir(config.follow_symlinks, root, &config.ignored_dirs))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(scanned_dirs.into_iter().flatten().collect())
}

/// Best-effort check that a path points to a real, playable music file.
///
/// This does NOT decode audio, but rules out:
/// - missing paths
/// - directories / special files
/// - wrong extensions
/// - empty files
/// - unreadable files
pub fn is_valid_music_path(path: &Path) -> bool {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return false,
    };

    if !meta.is_file() || !is_music_file(path) || meta.len() == 0 {
        return false;
    }

    std::fs::File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::{
        config::LibrarySource,
        domain::hash::TrackId,
        library::fs::{is_music_file, is_valid_music_path, scan_dir, scan_dirs},
    };

    #[test]
    fn is_music_file_is_case_insensitive() {
        assert!(is_music_file("a.mp3".as_ref()));
        assert!(is_music_file("a.FLAC".as_ref()));
        assert!(is_music_file("a.m4a".as_ref()));
        assert!(!is_music_file("a.txt".as_ref()));
        assert!(!is_music_file("mp3".as_ref()));
    }

    #[test]
    fn scan_finds_music_files_in_name_order_and_hashes_them() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        let song_b = root.join("b.flac");
        let song_a = root.join("a.mp3");
        fs::write(&song_b, b"bbb").unwrap();
        fs::write(&song_a, b"aaa").unwrap();
        fs::write(root.join("notes.txt"), b"ccc").unwrap();
        // a directory that merely looks like music
        fs::create_dir_all(root.join("folder.mp3")).unwrap();

        let files = scan_dir(false, root, &[]).unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![song_a, song_b]);
        assert_eq!(files[0].track_id, TrackId::from_bytes(b"aaa"));
    }

    #[test]
    fn scan_dirs_scans_roots_in_order() {
        let dir1 = TempDir::new().unwrap();
        let dir2 = TempDir::new().unwrap();

        let song1 = dir1.path().join("z.mp3");
        let song2 = dir2.path().join("a.flac");
        fs::write(&song1, b"song one").unwrap();
        fs::write(&song2, b"song two").unwrap();

        let config = LibrarySource {
            follow_symlinks: false,
            roots: vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()],
            ignored_dirs: vec![],
        };

        let files = scan_dirs(&config).unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.as_path()).collect();
        assert_eq!(paths, vec![song1.as_path(), song2.as_path()]);
    }

    #[test]
    fn scan_respects_ignored_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        let song = root.join("song1.mp3");
        let ignored_dir = root.join("ignored");
        fs::create_dir_all(&ignored_dir).unwrap();
        let ignored_song = ignored_dir.join("ignored_song.mp3");

        fs::write(&song, b"aaa").unwrap();
        fs::write(&ignored_song, b"ccc").unwrap();

        let files = scan_dir(false, root, &[ignored_dir]).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, song);
    }

    #[test]
    fn scan_of_missing_root_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let files = scan_dir(false, &tmp.path().join("missing"), &[]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn observed_file_becomes_track_with_unknown_duration() {
        let tmp = TempDir::new().unwrap();
        let album = tmp.path().join("Daft Punk");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("Digital Love.mp3"), b"x").unwrap();

        let files = scan_dir(false, tmp.path(), &[]).unwrap();
        let track = files.into_iter().next().unwrap().into_track();

        assert_eq!(track.title, "Digital Love");
        assert_eq!(track.artist, "Daft Punk");
        assert_eq!(track.duration_seconds, 0.0);
        assert_eq!(track.id, TrackId::from_bytes(b"x"));
        assert!(track.source_locator.ends_with("Digital Love.mp3"));
        assert!(track.cover_glyph.is_none());
    }

    #[test]
    fn valid_music_path_rules_out_bad_files() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.mp3");
        let empty = tmp.path().join("empty.mp3");
        let text = tmp.path().join("text.txt");
        fs::write(&good, b"x").unwrap();
        fs::write(&empty, b"").unwrap();
        fs::write(&text, b"x").unwrap();

        assert!(is_valid_music_path(&good));
        assert!(!is_valid_music_path(&empty));
        assert!(!is_valid_music_path(&text));
        assert!(!is_valid_music_path(tmp.path()));
        assert!(!is_valid_music_path(&tmp.path().join("missing.mp3")));
    }
}
