use anyhow::anyhow;
use log::{debug, info};
use rouille::{Request, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    config::HttpConfig,
    domain::track::{Track, is_valid_duration},
    http::error::ApiError,
    library::{self, error::LibraryError},
    playlist::Playlist,
};

pub struct HttpServer {
    playlist: Arc<Mutex<Playlist>>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(playlist: Playlist, config: HttpConfig) -> Self {
        Self {
            playlist: Arc::new(Mutex::new(playlist)),
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let result = rouille::router!(request,
            (GET) (/) => {
                Ok(Self::handle_player_page())
            },

            (GET) (/playlist) => {
                self.handle_get_playlist()
            },
            (GET) (/playlist/current) => {
                self.handle_current()
            },
            (POST) (/playlist/next) => {
                self.handle_next()
            },
            (POST) (/playlist/previous) => {
                self.handle_previous()
            },
            (POST) (/playlist/select/{id: String}) => {
                self.handle_select(&id)
            },

            (POST) (/tracks) => {
                self.handle_append(request)
            },
            (GET) (/tracks/{id: String}) => {
                self.handle_get_track(&id)
            },
            (PUT) (/tracks/{id: String}) => {
                self.handle_update_track(&id, request)
            },
            (DELETE) (/tracks/{id: String}) => {
                self.handle_remove(&id)
            },
            (PUT) (/tracks/{id: String}/duration) => {
                self.handle_backfill_duration(&id, request)
            },
            (GET) (/tracks/{id: String}/stream) => {
                self.handle_stream(&id)
            },
            _ => Ok(Response::empty_404())
        );

        let response = result.unwrap_or_else(ApiError::into_response);
        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    /// Runs `f` with the playlist locked, so every operation is a single step
    /// for concurrent requests.
    fn with_playlist<T>(
        &self,
        f: impl FnOnce(&mut Playlist) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut playlist = self.playlist.lock().map_err(|e| {
            LibraryError::Internal(anyhow!("Could not access playlist under lock: {e}"))
        })?;
        f(&mut playlist)
    }

    fn handle_player_page() -> Response {
        Response::html(include_str!("../../html/player.html"))
    }

    fn handle_get_playlist(&self) -> Result<Response, ApiError> {
        self.with_playlist(|playlist| Ok(Response::json(&PlaylistResponse::from_domain(playlist))))
    }

    fn handle_current(&self) -> Result<Response, ApiError> {
        self.with_playlist(|playlist| Ok(NavigationResponse::of(playlist.current())))
    }

    fn handle_next(&self) -> Result<Response, ApiError> {
        self.with_playlist(|playlist| Ok(NavigationResponse::of(playlist.next())))
    }

    fn handle_previous(&self) -> Result<Response, ApiError> {
        self.with_playlist(|playlist| Ok(NavigationResponse::of(playlist.previous())))
    }

    fn handle_select(&self, id: &str) -> Result<Response, ApiError> {
        self.with_playlist(|playlist| match playlist.select_by_id(id) {
            Some(track) => Ok(NavigationResponse::of(Some(track))),
            None => Err(LibraryError::TrackNotFound(id.into()).into()),
        })
    }

    fn handle_get_track(&self, id: &str) -> Result<Response, ApiError> {
        self.with_playlist(|playlist| {
            let track = playlist
                .get(id)
                .ok_or_else(|| LibraryError::TrackNotFound(id.into()))?;
            Ok(Response::json(&TrackResponse::from_domain(track)))
        })
    }

    fn handle_append(&self, request: &Request) -> Result<Response, ApiError> {
        let track: Track = read_json(request)?;
        let body = TrackResponse::from_domain(&track);

        self.with_playlist(|playlist| Ok(library::add_track(playlist, track)?))?;
        Ok(Response::json(&body).with_status_code(201))
    }

    fn handle_update_track(&self, id: &str, request: &Request) -> Result<Response, ApiError> {
        let track: Track = read_json(request)?;
        if track.id != *id {
            return Err(ApiError::BadRequest(format!(
                "track id {} does not match {}",
                track.id, id
            )));
        }
        library::validate_track(&track)?;
        let body = TrackResponse::from_domain(&track);

        self.with_playlist(|playlist| {
            if playlist.update_by_id(id, track) {
                Ok(Response::json(&body))
            } else {
                Err(LibraryError::TrackNotFound(id.into()).into())
            }
        })
    }

    /// Fills in a duration the player has just learned from the media.
    /// A duration that is already known stays as it is.
    fn handle_backfill_duration(&self, id: &str, request: &Request) -> Result<Response, ApiError> {
        let DurationRequest { duration_seconds } = read_json(request)?;
        if !is_valid_duration(duration_seconds) {
            return Err(ApiError::BadRequest(
                "duration must be a finite, non-negative number".into(),
            ));
        }

        self.with_playlist(|playlist| {
            let mut track = playlist
                .get(id)
                .cloned()
                .ok_or_else(|| LibraryError::TrackNotFound(id.into()))?;
            if !track.is_duration_known() {
                track.duration_seconds = duration_seconds;
                playlist.update_by_id(id, track.clone());
                info!("Duration of {id} resolved to {duration_seconds}s");
            }
            Ok(Response::json(&TrackResponse::from_domain(&track)))
        })
    }

    fn handle_remove(&self, id: &str) -> Result<Response, ApiError> {
        self.with_playlist(|playlist| {
            if playlist.remove(id) {
                Ok(Response::empty_204())
            } else {
                Err(LibraryError::TrackNotFound(id.into()).into())
            }
        })
    }

    /// Serves a local file, or sends the browser to a remote locator.
    fn handle_stream(&self, id: &str) -> Result<Response, ApiError> {
        let track = self.with_playlist(|playlist| {
            let track = playlist
                .get(id)
                .cloned()
                .ok_or_else(|| LibraryError::TrackNotFound(id.into()))?;
            Ok(track)
        })?;

        if track.is_remote() {
            debug!("STREAM {} -> 302 {}", id, track.source_locator);
            return Ok(Response::redirect_302(track.source_locator));
        }

        let path = library::resolve_local_file(&track)?;
        let mime = Self::mime_for_track(&path);
        let file = std::fs::File::open(&path).map_err(LibraryError::Fs)?;
        debug!(
            "STREAM {} -> 200 OK, path: {}, MIME type: {}",
            id,
            path.to_string_lossy(),
            mime
        );

        Ok(Response::from_file(mime, file))
    }

    fn mime_for_track(path: &Path) -> String {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy())
            .map(|s| s.to_lowercase());
        let default = || {
            mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string()
        };
        ext.and_then(|ext| Self::mime_from_ext(ext.as_str()))
            .unwrap_or_else(default)
    }

    /// Map file extension (without dot) to proper MIME type for browser playback.
    /// Returns None if the extension is not recognized.
    pub fn mime_from_ext(ext: &str) -> Option<String> {
        match ext {
            "m4a" => Some("audio/x-m4a".to_string()), // Safari iOS compatible
            "aac" => Some("audio/aac".to_string()),
            "mp3" => Some("audio/mpeg".to_string()),
            "wav" => Some("audio/wav".to_string()),
            "ogg" => Some("audio/ogg".to_string()),
            "flac" => Some("audio/flac".to_string()),
            _ => None,
        }
    }
}

fn read_json<T: DeserializeOwned>(request: &Request) -> Result<T, ApiError> {
    rouille::input::json_input(request)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

#[derive(Serialize, Deserialize)]
struct TrackResponse {
    id: String,
    title: String,
    artist: String,
    duration_seconds: f64,
    cover_glyph: Option<String>,
    stream_url: String,
}

impl TrackResponse {
    fn from_domain(track: &Track) -> Self {
        Self {
            id: track.id.to_string(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration_seconds: track.duration_seconds,
            cover_glyph: track.cover_glyph.clone(),
            stream_url: format!("/tracks/{}/stream", track.id),
        }
    }
}

/// Result of a cursor move; `track` is null when the cursor could not move.
#[derive(Serialize, Deserialize)]
struct NavigationResponse {
    track: Option<TrackResponse>,
}

impl NavigationResponse {
    fn of(track: Option<&Track>) -> Response {
        Response::json(&Self {
            track: track.map(TrackResponse::from_domain),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct PlaylistResponse {
    size: usize,
    current: Option<String>,
    tracks: Vec<TrackResponse>,
}

impl PlaylistResponse {
    fn from_domain(playlist: &Playlist) -> Self {
        Self {
            size: playlist.len(),
            current: playlist.current_id().map(str::to_string),
            tracks: playlist.iter().map(TrackResponse::from_domain).collect(),
        }
    }
}

#[derive(Deserialize)]
struct DurationRequest {
    duration_seconds: f64,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
