mod file_config;

pub use file_config::FileConfig;

use crate::catalogue::DEFAULT_REMOTE_BASE_URL;
use crate::playback::AutoplayPolicy;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub remote_base_url: String,
    pub catalogue_path: Option<PathBuf>,
    pub autoplay: AutoplayPolicy,
    pub max_payload_bytes: Option<u64>,
    pub request_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            catalogue_path: None,
            autoplay: AutoplayPolicy::default(),
            max_payload_bytes: None,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub remote_base_url: String,
    /// Library file to use instead of the built-in one.
    pub catalogue_path: Option<PathBuf>,
    pub autoplay: AutoplayPolicy,
    pub max_payload_bytes: Option<u64>,
    pub request_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let remote_base_url = file
            .remote_base_url
            .unwrap_or_else(|| cli.remote_base_url.clone());

        let catalogue_path = file
            .catalogue_path
            .map(PathBuf::from)
            .or_else(|| cli.catalogue_path.clone());
        if let Some(path) = &catalogue_path {
            if !path.is_file() {
                bail!("Catalogue file not found: {:?}", path);
            }
        }

        let autoplay = match file.autoplay {
            Some(value) => match parse_autoplay(&value) {
                Some(policy) => policy,
                None => bail!("Unknown autoplay policy: {:?}", value),
            },
            None => cli.autoplay,
        };

        let max_payload_bytes = file.max_payload_bytes.or(cli.max_payload_bytes);
        let request_timeout_sec = file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);

        Ok(Self {
            db_dir,
            remote_base_url,
            catalogue_path,
            autoplay,
            max_payload_bytes,
            request_timeout_sec,
        })
    }

    pub fn audio_db_path(&self) -> PathBuf {
        self.db_dir.join("audio_store.db")
    }
}

fn parse_autoplay(s: &str) -> Option<AutoplayPolicy> {
    AutoplayPolicy::from_str(s, true).ok()
}
