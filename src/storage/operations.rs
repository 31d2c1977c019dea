use crate::{
    config,
    domain::{
        identity::IdentityKey,
        track::{NewTrack, Track, TrackId},
    },
    storage::{
        db,
        error::StorageError,
        schema::{columns, tables},
    },
};

use columns::*;
use rusqlite::params;
use tables::*;

/// Main structure that implements all catalogue storage logic
pub struct Storage {
    pub(crate) db: rusqlite::Connection,
}

impl Storage {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db: rusqlite::Connection = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// Validates and inserts a new track, returning its freshly assigned id.
    ///
    /// Duplicate (title, artist) pairs are allowed; each insert gets its own id.
    pub fn add_track(&mut self, title: &str, artist: &str) -> Result<TrackId, StorageError> {
        let track = NewTrack::new(title, artist)?;

        self.db.execute(
            &format!("INSERT INTO {TRACKS} ({TITLE}, {ARTIST}) VALUES (?1, ?2)"),
            params![track.title(), track.artist()],
        )?;

        Ok(TrackId(self.db.last_insert_rowid()))
    }

    /// Deletes a track by id. The id is never handed out again.
    pub fn remove_track(&mut self, id: TrackId) -> Result<(), StorageError> {
        let tx = self.db.transaction()?;

        let deleted = tx.execute(
            &format!("DELETE FROM {TRACKS} WHERE {ID} = ?1"),
            params![id.as_i64()],
        )?;

        if deleted == 0 {
            return Err(StorageError::TrackNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    /// Lists every catalogued track in insertion order.
    pub fn list_tracks(&mut self) -> Result<Vec<Track>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {ID}, {TITLE}, {ARTIST} FROM {TRACKS} ORDER BY {ID}"
        ))?;

        let tracks = stmt
            .query_map([], |row| {
                Ok(Track {
                    id: TrackId(row.get(0)?),
                    title: row.get(1)?,
                    artist: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    /// Returns the first track whose normalized identity equals the given key.
    ///
    /// Comparison goes through the identity normalizer on both sides, so the
    /// lookup is case-insensitive regardless of how the track was stored.
    pub fn find_by_identity(&mut self, key: &IdentityKey) -> Result<Option<Track>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {ID}, {TITLE}, {ARTIST} FROM {TRACKS} ORDER BY {ID}"
        ))?;

        let found = stmt
            .query_map([], |row| {
                Ok(Track {
                    id: TrackId(row.get(0)?),
                    title: row.get(1)?,
                    artist: row.get(2)?,
                })
            })?
            .filter_map(|row| match row {
                Ok(track) if key.matches(&track.title, &track.artist) => Some(Ok(track)),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
            .next()
            .transpose()?;

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{identity::IdentityKey, track::TrackId},
        storage::{error::StorageError, operations::Storage, schema},
    };

    fn setup_storage() -> anyhow::Result<Storage> {
        let conn = rusqlite::Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(Storage::from_existing_conn(conn))
    }

    #[test]
    fn test_add_track_assigns_fresh_id() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let id = storage.add_track("Blinding Lights", "The Weeknd")?;

        let tracks = storage.list_tracks()?;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, id);
        assert_eq!(tracks[0].title, "Blinding Lights");
        assert_eq!(tracks[0].artist, "The Weeknd");

        Ok(())
    }

    #[test]
    fn test_add_track_trims_fields() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        storage.add_track("  Song A  ", " Artist A ")?;

        let tracks = storage.list_tracks()?;
        assert_eq!(tracks[0].title, "Song A");
        assert_eq!(tracks[0].artist, "Artist A");

        Ok(())
    }

    #[test]
    fn test_add_track_rejects_empty_fields() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        for (title, artist) in [("", "x"), ("x", ""), ("  ", "  ")] {
            let err = storage.add_track(title, artist).unwrap_err();
            assert!(matches!(err, StorageError::InvalidTrack(_)));
        }

        // no record was created by any failed attempt
        assert!(storage.list_tracks()?.is_empty());

        Ok(())
    }

    #[test]
    fn test_duplicate_title_artist_pairs_allowed() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let first = storage.add_track("Song A", "Artist A")?;
        let second = storage.add_track("Song A", "Artist A")?;

        assert_ne!(first, second);
        assert_eq!(storage.list_tracks()?.len(), 2);

        Ok(())
    }

    #[test]
    fn test_remove_track_not_found() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let err = storage.remove_track(TrackId(999)).unwrap_err();

        assert!(matches!(err, StorageError::TrackNotFound(TrackId(999))));

        Ok(())
    }

    #[test]
    fn test_remove_track_twice_fails_second_time() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let id = storage.add_track("Song A", "Artist A")?;

        storage.remove_track(id)?;
        let err = storage.remove_track(id).unwrap_err();

        assert!(matches!(err, StorageError::TrackNotFound(_)));

        Ok(())
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let first = storage.add_track("Song A", "Artist A")?;
        let second = storage.add_track("Song B", "Artist B")?;
        assert!(second > first);

        // deleting the newest row must not free its id for the next insert
        storage.remove_track(second)?;
        let third = storage.add_track("Song C", "Artist C")?;
        assert!(third > second);

        Ok(())
    }

    #[test]
    fn test_list_tracks_returns_all_in_insertion_order() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let a = storage.add_track("Song A", "Artist A")?;
        let b = storage.add_track("Song B", "Artist B")?;

        let tracks = storage.list_tracks()?;

        assert_eq!(
            tracks.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![a, b]
        );

        Ok(())
    }

    #[test]
    fn test_find_by_identity_is_case_insensitive() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let id = storage.add_track("Blinding Lights", "The Weeknd")?;

        let found = storage
            .find_by_identity(&IdentityKey::new("blinding lights", "the weeknd"))?
            .unwrap();

        assert_eq!(found.id, id);
        assert_eq!(found.title, "Blinding Lights");

        Ok(())
    }

    #[test]
    fn test_find_by_identity_no_match_in_non_empty_store() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        storage.add_track("Blinding Lights", "The Weeknd")?;

        let found = storage.find_by_identity(&IdentityKey::new("Levitating", "Dua Lipa"))?;

        assert!(found.is_none());

        Ok(())
    }

    #[test]
    fn test_find_by_identity_requires_both_fields_to_match() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        storage.add_track("Blinding Lights", "The Weeknd")?;

        let found = storage.find_by_identity(&IdentityKey::new("Blinding Lights", "Dua Lipa"))?;

        assert!(found.is_none());

        Ok(())
    }

    #[test]
    fn test_find_by_identity_picks_first_of_duplicates() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;

        let first = storage.add_track("Song A", "Artist A")?;
        storage.add_track("song a", "artist a")?;

        let found = storage
            .find_by_identity(&IdentityKey::new("SONG A", "ARTIST A"))?
            .unwrap();

        assert_eq!(found.id, first);

        Ok(())
    }
}
