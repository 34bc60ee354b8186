use thiserror::Error;

use crate::domain::hash::TrackId;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("track {0} not found")]
    TrackNotFound(TrackId),

    #[error("track {0} already exists")]
    DuplicateTrack(TrackId),

    #[error("track {track} is invalid: {reason}")]
    InvalidTrack { track: TrackId, reason: String },

    #[error("track {track} has no valid music file")]
    InvalidTrackFile { track: TrackId },

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
