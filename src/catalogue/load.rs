//! Catalogue loading from TOML documents.

use super::{Catalogue, CatalogueEntry, MusicalPeriod};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

const BUILTIN_LIBRARY: &str = include_str!("../../assets/library.toml");

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Deserialize)]
struct EntryRecord {
    id: String,
    title: String,
    composer: String,
    year: i32,
    period: MusicalPeriod,
    description: String,
    file_name: String,
    /// Overrides the URL derived from the remote base.
    remote_url: Option<String>,
}

/// Builds the fallback URL for a file held in the remote bucket.
pub fn remote_audio_url(remote_base_url: &str, file_name: &str) -> String {
    format!(
        "{}{}?alt=media",
        remote_base_url,
        urlencoding::encode(file_name)
    )
}

pub(super) fn parse_catalogue(content: &str, remote_base_url: &str) -> Result<Catalogue> {
    let file: CatalogueFile = toml::from_str(content).context("Failed to parse catalogue")?;

    let mut seen_ids = HashSet::new();
    let mut entries = Vec::with_capacity(file.entries.len());
    for record in file.entries {
        if record.file_name.is_empty() {
            bail!("Catalogue entry {} has an empty file_name", record.id);
        }
        if !seen_ids.insert(record.id.clone()) {
            bail!("Duplicate catalogue id: {}", record.id);
        }
        let remote_url = record
            .remote_url
            .unwrap_or_else(|| remote_audio_url(remote_base_url, &record.file_name));
        entries.push(CatalogueEntry {
            id: record.id,
            title: record.title,
            composer: record.composer,
            year: record.year,
            period: record.period,
            description: record.description,
            file_name: record.file_name,
            remote_url,
        });
    }
    Ok(Catalogue::from_entries(entries))
}

pub(super) fn load_builtin(remote_base_url: &str) -> Result<Catalogue> {
    parse_catalogue(BUILTIN_LIBRARY, remote_base_url).context("Built-in library is invalid")
}

pub(super) fn load_file(path: &Path, remote_base_url: &str) -> Result<Catalogue> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalogue file: {:?}", path))?;
    let catalogue = parse_catalogue(&content, remote_base_url)
        .with_context(|| format!("Failed to load catalogue file: {:?}", path))?;
    info!(
        "Loaded {} catalogue entries from {:?}",
        catalogue.len(),
        path
    );
    Ok(catalogue)
}
