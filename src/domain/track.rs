use std::fmt::Display;

use thiserror::Error;

/// Catalogue-assigned track id.
///
/// Assigned by the store on insert, monotonically increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub i64);

impl TrackId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a catalogued music track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidTrack {
    #[error("title is empty")]
    EmptyTitle,

    #[error("artist is empty")]
    EmptyArtist,
}

/// A validated (title, artist) pair, ready to be inserted.
///
/// Both fields are trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    title: String,
    artist: String,
}

impl NewTrack {
    pub fn new(title: &str, artist: &str) -> Result<Self, InvalidTrack> {
        let title = title.trim();
        if title.is_empty() {
            return Err(InvalidTrack::EmptyTitle);
        }

        let artist = artist.trim();
        if artist.is_empty() {
            return Err(InvalidTrack::EmptyArtist);
        }

        Ok(Self {
            title: title.to_string(),
            artist: artist.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }
}
