use crate::{
    domain::{identity::IdentityKey, track::Track},
    recognition::provider::RecognizedFragment,
    storage::{error::StorageError, operations::Storage},
};

/// Resolves a recognized fragment against the catalogue.
///
/// A single exact lookup on the normalized (title, artist) pair. When the
/// provider returned no usable title or artist, resolution short-circuits to
/// none without touching the store.
pub fn resolve(
    storage: &mut Storage,
    fragment: &RecognizedFragment,
) -> Result<Option<Track>, StorageError> {
    let (Some(title), Some(artist)) = (&fragment.title, &fragment.artist) else {
        return Ok(None);
    };

    storage.find_by_identity(&IdentityKey::new(title, artist))
}
