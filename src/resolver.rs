//! Chooses between a local handle and the remote URL for a piece, and keeps a
//! view's handle set in sync with the audio store.

use crate::audio_store::{AudioStore, StorageFailure};
use crate::catalogue::{Catalogue, CatalogueEntry};
use crate::object_url::ViewHandles;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The source a piece should be played from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayableSource<'a> {
    /// An object URL over a locally stored payload.
    Local(&'a str),
    /// The catalogue's remote fallback.
    Remote(&'a str),
}

impl<'a> PlayableSource<'a> {
    pub fn url(&self) -> &'a str {
        match self {
            PlayableSource::Local(url) | PlayableSource::Remote(url) => url,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, PlayableSource::Local(_))
    }
}

/// A file handed in by the learner.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub payload: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Outcome of a batch ingestion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// `(uploaded name, catalogue id)` for every stored file.
    pub matched: Vec<(String, String)>,
    /// Uploaded names that matched no catalogue entry.
    pub unmatched: Vec<String>,
}

/// Local handle if the view has one for the piece, remote URL otherwise.
pub fn resolve<'a>(piece: &'a CatalogueEntry, handles: &'a ViewHandles) -> PlayableSource<'a> {
    match handles.get(&piece.file_name) {
        Some(url) => PlayableSource::Local(url),
        None => PlayableSource::Remote(&piece.remote_url),
    }
}

/// Registers a handle for every payload in the store. Returns the number of
/// handles created.
pub fn prime_from_store(
    store: &dyn AudioStore,
    handles: &mut ViewHandles,
) -> Result<usize, StorageFailure> {
    let keys = store.list_keys()?;
    let mut primed = 0;
    for key in keys {
        match store.get(&key)? {
            Some(payload) => {
                handles.register(&key, Arc::from(payload));
                primed += 1;
            }
            None => debug!("Key {:?} disappeared while priming", key),
        }
    }
    info!("Primed {} local audio handles", primed);
    Ok(primed)
}

/// First entry, in catalogue order, whose title, composer or file name occurs
/// in `uploaded_name`, ignoring case.
///
/// Short or generic titles can produce false positives; the tie-break only
/// makes the outcome deterministic.
pub fn match_upload<'a>(
    catalogue: &'a Catalogue,
    uploaded_name: &str,
) -> Option<&'a CatalogueEntry> {
    let normalized = uploaded_name.to_lowercase();
    catalogue.entries().iter().find(|piece| {
        [&piece.title, &piece.composer, &piece.file_name]
            .iter()
            .any(|needle| !needle.is_empty() && normalized.contains(&needle.to_lowercase()))
    })
}

/// Writes `file` through the store under `piece`'s file name and registers a
/// fresh handle for it.
pub fn store_for_piece(
    piece: &CatalogueEntry,
    store: &dyn AudioStore,
    handles: &mut ViewHandles,
    file: UploadedFile,
) -> Result<String, StorageFailure> {
    store.put(&piece.file_name, &file.payload)?;
    let url = handles.register(&piece.file_name, Arc::from(file.payload));
    info!("Stored {:?} locally as {:?}", file.name, piece.file_name);
    Ok(url)
}

/// Matches each uploaded file against the catalogue and stores the matches.
///
/// Files that match nothing are listed in the report and otherwise ignored.
/// A storage failure stops the batch; files stored before it stay stored.
pub fn ingest(
    catalogue: &Catalogue,
    store: &dyn AudioStore,
    handles: &mut ViewHandles,
    files: Vec<UploadedFile>,
) -> Result<IngestReport, StorageFailure> {
    let mut report = IngestReport::default();
    for file in files {
        match match_upload(catalogue, &file.name) {
            Some(piece) => {
                let uploaded_name = file.name.clone();
                store_for_piece(piece, store, handles, file)?;
                report.matched.push((uploaded_name, piece.id.clone()));
            }
            None => {
                warn!("Uploaded file {:?} matches no catalogue entry", file.name);
                report.unmatched.push(file.name);
            }
        }
    }
    Ok(report)
}
