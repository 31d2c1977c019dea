use anyhow::anyhow;
use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::{
    io::Read,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    config::HttpConfig,
    domain::track::Track,
    http::error::ApiError,
    recognition::{
        orchestrator::{self, RecognitionOutcome},
        provider::RecognitionProvider,
    },
    storage::{error::StorageError, operations::Storage},
};

pub struct HttpServer {
    storage: Arc<Mutex<Storage>>,
    provider: Arc<dyn RecognitionProvider + Send + Sync>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(
        storage: Storage,
        provider: Arc<dyn RecognitionProvider + Send + Sync>,
        config: HttpConfig,
    ) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            provider,
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/catalog/tracks) => {
                Self::handle_list_tracks(&self.storage)
            },

            (POST) (/catalog/tracks) => {
                Self::handle_add_track(request, &self.storage)
            },

            // non-integer ids fall through to 404
            (DELETE) (/catalog/tracks/{id: i64}) => {
                Self::handle_remove_track(id, &self.storage)
            },

            (POST) (/recognition) => {
                self.handle_recognize(request)
            },

            _ => ApiError::NotFound("resource not found".into()).into_response()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn lock_storage(storage: &Mutex<Storage>) -> Result<MutexGuard<'_, Storage>, ApiError> {
        storage.lock().map_err(|e| {
            ApiError::from(StorageError::Internal(anyhow!(
                "Could not access catalogue storage under lock: {e}"
            )))
        })
    }

    fn handle_list_tracks(storage: &Arc<Mutex<Storage>>) -> Response {
        let result = {
            let mut storage = match Self::lock_storage(storage) {
                Ok(guard) => guard,
                Err(e) => return e.into_response(),
            };
            storage.list_tracks()
        };

        match result {
            Ok(tracks) => Response::json(&TrackListResponse::from_domain(&tracks)),

            Err(e) => ApiError::from(e).into_response(),
        }
    }

    fn handle_add_track(request: &Request, storage: &Arc<Mutex<Storage>>) -> Response {
        let body: AddTrackRequest = match rouille::input::json_input(request) {
            Ok(body) => body,
            Err(_) => {
                return ApiError::BadRequest("invalid JSON body".into()).into_response();
            }
        };

        let (Some(title), Some(artist)) = (body.title, body.artist) else {
            return ApiError::BadRequest("missing title or artist".into()).into_response();
        };

        let result = {
            let mut storage = match Self::lock_storage(storage) {
                Ok(guard) => guard,
                Err(e) => return e.into_response(),
            };
            storage.add_track(&title, &artist)
        };

        match result {
            Ok(id) => {
                info!("created track {id}: {title} - {artist}");
                Response::json(&MessageResponse::new("Track created successfully"))
                    .with_status_code(201)
            }

            Err(e) => ApiError::from(e).into_response(),
        }
    }

    fn handle_remove_track(id: i64, storage: &Arc<Mutex<Storage>>) -> Response {
        use crate::domain::track::TrackId;

        let result = {
            let mut storage = match Self::lock_storage(storage) {
                Ok(guard) => guard,
                Err(e) => return e.into_response(),
            };
            storage.remove_track(TrackId(id))
        };

        match result {
            Ok(()) => Response::json(&MessageResponse::new("Track removed successfully")),

            Err(e) => ApiError::from(e).into_response(),
        }
    }

    /// returns Response with ok status, or ApiError
    fn recognize(&self, request: &Request) -> Result<Response, ApiError> {
        let mut audio = Vec::new();
        let mut body = request
            .data()
            .ok_or_else(|| ApiError::BadRequest("audio payload is missing or empty".into()))?;
        body.read_to_end(&mut audio)
            .map_err(|e| ApiError::Internal(format!("failed to read request body: {e}")))?;

        // the orchestrator locks storage only for resolution, so the provider
        // call does not block concurrent catalogue requests
        let outcome =
            orchestrator::recognize_fragment(self.provider.as_ref(), &self.storage, &audio)?;

        match outcome {
            RecognitionOutcome::Matched(track) => {
                info!("fragment matched track {}", track.id);
                Ok(Response::json(&RecognizedResponse::from_domain(&track)))
            }

            RecognitionOutcome::NotRecognized => {
                Err(ApiError::NotFound("Track not recognized".into()))
            }

            RecognitionOutcome::RecognizedNotCatalogued => {
                Err(ApiError::NotFound("No matching track in catalogue".into()))
            }
        }
    }

    fn handle_recognize(&self, request: &Request) -> Response {
        match self.recognize(request) {
            Ok(r) => r,
            Err(e) => e.into_response(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct AddTrackRequest {
    title: Option<String>,
    artist: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct TrackResponse {
    id: i64,
    title: String,
    artist: String,
}

impl TrackResponse {
    fn from_domain(track: &Track) -> Self {
        Self {
            id: track.id.as_i64(),
            title: track.title.clone(),
            artist: track.artist.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TrackListResponse {
    tracks: Vec<TrackResponse>,
}

impl TrackListResponse {
    fn from_domain(tracks: &[Track]) -> Self {
        Self {
            tracks: tracks.iter().map(TrackResponse::from_domain).collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RecognizedResponse {
    #[serde(rename = "trackId")]
    track_id: i64,
    title: String,
    artist: String,
}

impl RecognizedResponse {
    fn from_domain(track: &Track) -> Self {
        Self {
            track_id: track.id.as_i64(),
            title: track.title.clone(),
            artist: track.artist.clone(),
        }
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
