use rouille::Response;
use serde::Serialize;

use crate::{recognition::orchestrator::RecognitionError, storage::error::StorageError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TrackNotFound(id) => {
                ApiError::NotFound(format!("track {} not found", id))
            }

            StorageError::InvalidTrack(e) => ApiError::BadRequest(e.to_string()),

            StorageError::Database(_) | StorageError::Internal(_) => {
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::EmptyAudio => {
                ApiError::BadRequest("audio payload is missing or empty".into())
            }

            RecognitionError::Provider(e) => {
                log::error!("recognition provider failed: {e}");
                ApiError::Internal("error calling recognition provider".into())
            }

            RecognitionError::Storage(e) => ApiError::from(e),
        }
    }
}

impl ApiError {
    pub fn into_response(self) -> Response {
        let (message, status) = match self {
            ApiError::NotFound(msg) => (msg, 404),
            ApiError::BadRequest(msg) => (msg, 400),
            ApiError::Internal(msg) => (msg, 500),
        };

        Response::json(&MessageBody { message }).with_status_code(status)
    }
}
