//! The library of works shown on the timeline and used by the quiz.
//!
//! The catalogue is immutable once loaded; controllers share it behind an
//! `Arc`.

mod load;
mod models;

pub use load::remote_audio_url;
pub use models::{CatalogueEntry, MusicalPeriod};

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// Bucket the original library streams from.
pub const DEFAULT_REMOTE_BASE_URL: &str =
    "https://firebasestorage.googleapis.com/v0/b/musictrainer-6ddbe.firebasestorage.app/o/";

#[derive(Debug, Clone)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
}

impl Catalogue {
    pub fn from_entries(entries: Vec<CatalogueEntry>) -> Self {
        Self { entries }
    }

    /// The default library bundled with the crate.
    pub fn builtin(remote_base_url: &str) -> Result<Self> {
        load::load_builtin(remote_base_url)
    }

    /// Loads a library from a TOML file with the same layout as the built-in one.
    pub fn load<P: AsRef<Path>>(path: P, remote_base_url: &str) -> Result<Self> {
        load::load_file(path.as_ref(), remote_base_url)
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogueEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_by_file_name(&self, file_name: &str) -> Option<&CatalogueEntry> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    /// Entries ordered by year. Works from the same year keep catalogue order.
    pub fn timeline(&self) -> Vec<&CatalogueEntry> {
        let mut sorted: Vec<&CatalogueEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.year);
        sorted
    }

    /// Distinct composers, alphabetically.
    pub fn composers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.composer.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn periods(&self) -> &'static [MusicalPeriod] {
        &MusicalPeriod::ALL
    }
}
