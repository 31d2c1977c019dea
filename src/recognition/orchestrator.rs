use std::sync::Mutex;

use anyhow::anyhow;
use log::{debug, info};
use thiserror::Error;

use crate::{
    domain::track::Track,
    recognition::{
        provider::{ProviderError, RecognitionProvider},
        resolver,
    },
    storage::{error::StorageError, operations::Storage},
};

/// Result of one recognition request.
#[derive(Debug, PartialEq, Eq)]
pub enum RecognitionOutcome {
    Matched(Track),
    NotRecognized,
    RecognizedNotCatalogued,
}

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("audio payload is missing or empty")]
    EmptyAudio,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Runs the recognition pipeline for one audio fragment.
///
/// A strictly linear pass: validate payload, call the provider, resolve the
/// recognized pair against the catalogue. At most one attempt per stage; the
/// provider is never invoked for an empty payload. The catalogue lock is
/// taken only for the resolution stage, never across the provider call.
pub fn recognize_fragment(
    provider: &dyn RecognitionProvider,
    storage: &Mutex<Storage>,
    audio: &[u8],
) -> Result<RecognitionOutcome, RecognitionError> {
    if audio.is_empty() {
        return Err(RecognitionError::EmptyAudio);
    }

    let fragment = match provider.recognize(audio)? {
        Some(fragment) => fragment,
        None => {
            info!("provider found no recognizable track");
            return Ok(RecognitionOutcome::NotRecognized);
        }
    };

    debug!(
        "provider recognized title={:?} artist={:?}",
        fragment.title, fragment.artist
    );

    let resolved = {
        let mut storage = storage.lock().map_err(|e| {
            StorageError::Internal(anyhow!(
                "Could not access catalogue storage under lock: {e}"
            ))
        })?;
        resolver::resolve(&mut storage, &fragment)?
    };

    match resolved {
        Some(track) => Ok(RecognitionOutcome::Matched(track)),
        None => {
            info!("recognized fragment has no catalogue entry");
            Ok(RecognitionOutcome::RecognizedNotCatalogued)
        }
    }
}
