//! SQLite schema for the audio store.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

/// One row per cached audio file, keyed by the catalogue file name.
const AUDIO_FILES_TABLE_V1: Table = Table {
    name: "audio_files",
    columns: &[
        sqlite_column!("file_name", &SqlType::Text, is_primary_key = true),
        sqlite_column!("payload", &SqlType::Blob, non_null = true),
        sqlite_column!(
            "stored_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};

pub const AUDIO_STORE_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[AUDIO_FILES_TABLE_V1],
};

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_audio_files_table() {
        let conn = Connection::open_in_memory().unwrap();
        AUDIO_STORE_SCHEMA.create(&conn).unwrap();

        let table_exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='audio_files'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(table_exists, 1);
        AUDIO_STORE_SCHEMA.validate(&conn).unwrap();
    }

    #[test]
    fn test_stored_at_defaults_to_now() {
        let conn = Connection::open_in_memory().unwrap();
        AUDIO_STORE_SCHEMA.create(&conn).unwrap();
        conn.execute(
            "INSERT INTO audio_files (file_name, payload) VALUES ('a.mp3', x'00')",
            [],
        )
        .unwrap();

        let stored_at: i64 = conn
            .query_row(
                "SELECT stored_at FROM audio_files WHERE file_name = 'a.mp3'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(stored_at > 0);
    }
}
