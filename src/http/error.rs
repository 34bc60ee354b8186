use rouille::Response;
use thiserror::Error;

use crate::library::error::LibraryError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::TrackNotFound(id) => {
                ApiError::NotFound(format!("track {} not found", id))
            }

            LibraryError::InvalidTrackFile { track } => {
                ApiError::NotFound(format!("track {} has no valid music file", track))
            }

            LibraryError::DuplicateTrack(id) => {
                ApiError::Conflict(format!("track {} already exists", id))
            }

            e @ LibraryError::InvalidTrack { .. } => ApiError::BadRequest(e.to_string()),

            err @ (LibraryError::Fs(_) | LibraryError::Internal(_)) => {
                log::error!("{err}");
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        Response::text(self.to_string()).with_status_code(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hash::TrackId;

    #[test]
    fn test_library_errors_map_to_statuses() {
        let cases = [
            (LibraryError::TrackNotFound(TrackId::from("1")), 404),
            (
                LibraryError::InvalidTrackFile {
                    track: TrackId::from("1"),
                },
                404,
            ),
            (LibraryError::DuplicateTrack(TrackId::from("1")), 409),
            (
                LibraryError::InvalidTrack {
                    track: TrackId::from("1"),
                    reason: "id is empty".into(),
                },
                400,
            ),
            (
                LibraryError::Fs(std::io::Error::other("disk on fire")),
                500,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_internal_errors_do_not_leak_details() {
        let err = ApiError::from(LibraryError::Fs(std::io::Error::other("disk on fire")));
        assert_eq!(err.to_string(), "internal server error");
        assert_eq!(err.into_response().status_code, 500);
    }
}
