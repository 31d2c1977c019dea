/// Case-folds a field for identity comparison.
///
/// Applied on both sides of every title/artist comparison so that case
/// differences never cause a false negative. Never persisted.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}

/// Normalized (title, artist) pair used as a comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub title: String,
    pub artist: String,
}

impl IdentityKey {
    pub fn new(title: &str, artist: &str) -> Self {
        Self {
            title: normalize(title),
            artist: normalize(artist),
        }
    }

    pub fn matches(&self, title: &str, artist: &str) -> bool {
        normalize(title) == self.title && normalize(artist) == self.artist
    }
}
