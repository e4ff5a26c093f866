use super::schema::AUDIO_STORE_SCHEMA;
use super::{AudioStore, StorageFailure};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite-backed [`AudioStore`].
///
/// The connection is opened on the first operation and then kept for the
/// lifetime of the store. If opening fails, the next operation tries again.
pub struct SqliteAudioStore {
    location: Location,
    max_payload_bytes: Option<u64>,
    conn: Mutex<Option<Connection>>,
}

impl SqliteAudioStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            location: Location::File(db_path.as_ref().to_path_buf()),
            max_payload_bytes: None,
            conn: Mutex::new(None),
        }
    }

    /// Store that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            max_payload_bytes: None,
            conn: Mutex::new(None),
        }
    }

    /// Rejects payloads larger than `limit` bytes.
    pub fn with_max_payload_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    fn open(&self) -> Result<Connection, StorageFailure> {
        let conn = match &self.location {
            Location::File(path) => {
                info!("Opening audio store at {:?}", path);
                Connection::open(path)
            }
            Location::Memory => Connection::open_in_memory(),
        }
        .map_err(StorageFailure::Unavailable)?;

        AUDIO_STORE_SCHEMA
            .create_or_validate(&conn)
            .map_err(|e| StorageFailure::Schema(format!("{:#}", e)))?;
        Ok(conn)
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageFailure>,
    ) -> Result<T, StorageFailure> {
        let mut guard: MutexGuard<'_, Option<Connection>> =
            self.conn.lock().map_err(|_| StorageFailure::Poisoned)?;
        if guard.is_none() {
            *guard = Some(self.open()?);
        }
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(StorageFailure::Poisoned),
        }
    }
}

impl AudioStore for SqliteAudioStore {
    fn put(&self, file_name: &str, payload: &[u8]) -> Result<(), StorageFailure> {
        let size = payload.len() as u64;
        if let Some(limit) = self.max_payload_bytes {
            if size > limit {
                return Err(StorageFailure::QuotaExceeded { size, limit });
            }
        }

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO audio_files (file_name, payload) VALUES (?1, ?2)
                 ON CONFLICT(file_name) DO UPDATE SET
                    payload = excluded.payload,
                    stored_at = cast(strftime('%s','now') as int)",
                params![file_name, payload],
            )?;
            debug!("Stored {} bytes for {:?}", size, file_name);
            Ok(())
        })
    }

    fn get(&self, file_name: &str) -> Result<Option<Vec<u8>>, StorageFailure> {
        self.with_conn(|conn| {
            let payload = conn
                .query_row(
                    "SELECT payload FROM audio_files WHERE file_name = ?1",
                    params![file_name],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()?;
            Ok(payload)
        })
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageFailure> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT file_name FROM audio_files")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(keys)
        })
    }
}
