//! Durable storage for locally supplied audio payloads.
//!
//! Payloads are keyed by the catalogue file name they stand in for. The store
//! is opaque to the bytes it holds and never deletes anything on its own.

mod schema;
mod sqlite_audio_store;

pub use schema::AUDIO_STORE_SCHEMA;
pub use sqlite_audio_store::SqliteAudioStore;

use thiserror::Error;

/// Errors raised by the persistence backend.
#[derive(Debug, Error)]
pub enum StorageFailure {
    #[error("Audio store is unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),

    #[error("Audio store schema error: {0}")]
    Schema(String),

    #[error("Payload of {size} bytes exceeds the storage quota of {limit} bytes")]
    QuotaExceeded { size: u64, limit: u64 },

    #[error("Audio store transaction failed: {0}")]
    Transaction(#[from] rusqlite::Error),

    #[error("Audio store connection is poisoned")]
    Poisoned,
}

/// Key/value store mapping catalogue file names to audio payloads.
///
/// Implementations are shared between controllers, so every call must be
/// safe to issue from any of them.
pub trait AudioStore: Send + Sync {
    /// Inserts or overwrites the payload stored under `file_name`.
    fn put(&self, file_name: &str, payload: &[u8]) -> Result<(), StorageFailure>;

    /// Returns the payload stored under `file_name`, or `None` if nothing was
    /// ever written there.
    fn get(&self, file_name: &str) -> Result<Option<Vec<u8>>, StorageFailure>;

    /// Returns every stored key. The order is unspecified.
    fn list_keys(&self) -> Result<Vec<String>, StorageFailure>;
}
