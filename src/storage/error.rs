use thiserror::Error;

use crate::domain::track::{InvalidTrack, TrackId};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("track {0} not found")]
    TrackNotFound(TrackId),

    #[error("invalid track: {0}")]
    InvalidTrack(#[from] InvalidTrack),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
