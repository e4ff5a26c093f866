//! Ephemeral handles that make in-memory audio payloads playable.
//!
//! A handle is a `blob:` URL minted by the process-wide [`ObjectUrlRegistry`].
//! It stays valid until revoked and never outlives the process. Each view owns
//! its handles through a [`ViewHandles`] set, which revokes all of them when
//! the view goes away.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

pub const OBJECT_URL_SCHEME: &str = "blob:";
const OBJECT_URL_PREFIX: &str = "blob:musikepoker/";

/// Shared table of live object URLs. Cloning yields another handle to the
/// same table.
#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    urls: Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `payload` in a fresh URL.
    pub fn create(&self, payload: Arc<[u8]>) -> String {
        let url = format!("{}{}", OBJECT_URL_PREFIX, Uuid::new_v4());
        self.lock().insert(url.clone(), payload);
        url
    }

    /// Invalidates `url`. Returns false if it was not live.
    pub fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    /// Payload behind a live URL.
    pub fn fetch(&self, url: &str) -> Option<Arc<[u8]>> {
        self.lock().get(url).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<[u8]>>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The handles one view has created, keyed by catalogue file name.
///
/// Holds at most one live URL per file name. Dropping the set revokes every
/// URL it still holds.
pub struct ViewHandles {
    registry: ObjectUrlRegistry,
    by_file_name: HashMap<String, String>,
}

impl ViewHandles {
    pub fn new(registry: ObjectUrlRegistry) -> Self {
        Self {
            registry,
            by_file_name: HashMap::new(),
        }
    }

    /// Creates a handle for `file_name`, revoking the one it supersedes.
    pub fn register(&mut self, file_name: &str, payload: Arc<[u8]>) -> String {
        let url = self.registry.create(payload);
        if let Some(previous) = self.by_file_name.insert(file_name.to_string(), url.clone()) {
            self.registry.revoke(&previous);
            debug!("Superseded handle for {:?}", file_name);
        }
        url
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.by_file_name.get(file_name).map(String::as_str)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.by_file_name.contains_key(file_name)
    }

    pub fn len(&self) -> usize {
        self.by_file_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file_name.is_empty()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.by_file_name.keys().map(String::as_str)
    }

    /// Revokes every handle in the set. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for (file_name, url) in self.by_file_name.drain() {
            if self.registry.revoke(&url) {
                released += 1;
            } else {
                warn!("Handle for {:?} was already revoked", file_name);
            }
        }
        released
    }
}

impl Drop for ViewHandles {
    fn drop(&mut self) {
        let released = self.release_all();
        if released > 0 {
            debug!("Released {} handles on teardown", released);
        }
    }
}
