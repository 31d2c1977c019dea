use std::path::Path;

use anyhow::anyhow;
use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let db = if config.in_memory {
        open_in_memory()?
    } else {
        let path = config
            .path
            .as_ref()
            .ok_or_else(|| anyhow!("database.path is required when in_memory = false"))?;
        open_from_file(path)?
    };
    schema::init(&db)?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Database,
        storage::{db::open, schema},
    };

    fn in_memory_config() -> Database {
        Database {
            in_memory: true,
            path: None,
        }
    }

    #[test]
    fn open_in_memory_db_initializes_schema() {
        let db = open(&in_memory_config()).unwrap();

        let mut stmt = db
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();

        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        for table in schema::tables::ALL_TABLES {
            assert!(tables.contains(&table.to_string()));
        }
    }

    #[test]
    fn open_on_disk_db_initializes_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tunedex.db");

        let config = Database {
            in_memory: false,
            path: Some(path.clone()),
        };

        let db = open(&config).unwrap();
        drop(db);

        assert!(path.exists());
    }

    #[test]
    fn open_on_disk_without_path_fails() {
        let config = Database {
            in_memory: false,
            path: None,
        };

        assert!(open(&config).is_err());
    }
}
