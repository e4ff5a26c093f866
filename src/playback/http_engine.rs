//! Engine that fetches remote sources over HTTP and reads local ones from the
//! object URL registry.
//!
//! No audio is rendered: "playing" means the source was fetched, recognised
//! as audio and is held on the transport.

use super::{MediaErrorKind, PlayTrigger, PlaybackEngine, PlaybackFailure};
use crate::object_url::{ObjectUrlRegistry, OBJECT_URL_SCHEME};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Whether the host lets playback start without a user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AutoplayPolicy {
    Allow,
    #[default]
    RequireGesture,
}

impl AutoplayPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoplayPolicy::Allow => "allow",
            AutoplayPolicy::RequireGesture => "require-gesture",
        }
    }

    fn permits(&self, trigger: PlayTrigger) -> bool {
        match self {
            AutoplayPolicy::Allow => true,
            AutoplayPolicy::RequireGesture => trigger == PlayTrigger::UserGesture,
        }
    }
}

#[derive(Default)]
struct Transport {
    bound: Option<(String, Arc<[u8]>)>,
    playing: bool,
}

pub struct HttpPlaybackEngine {
    client: reqwest::Client,
    registry: ObjectUrlRegistry,
    autoplay: AutoplayPolicy,
    transport: Mutex<Transport>,
}

impl HttpPlaybackEngine {
    pub fn new(
        registry: ObjectUrlRegistry,
        autoplay: AutoplayPolicy,
        timeout_sec: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            registry,
            autoplay,
            transport: Mutex::new(Transport::default()),
        })
    }

    /// Source currently held on the transport.
    pub async fn bound_source(&self) -> Option<String> {
        self.transport
            .lock()
            .await
            .bound
            .as_ref()
            .map(|(source, _)| source.clone())
    }

    pub async fn is_playing(&self) -> bool {
        self.transport.lock().await.playing
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, PlaybackFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlaybackFailure::media(MediaErrorKind::Network, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackFailure::media(
                MediaErrorKind::Network,
                format!("HTTP {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PlaybackFailure::media(MediaErrorKind::Network, e.to_string()))?;
        Ok(body.to_vec())
    }

    async fn read_source(&self, source: &str) -> Result<Arc<[u8]>, PlaybackFailure> {
        if source.starts_with(OBJECT_URL_SCHEME) {
            return self.registry.fetch(source).ok_or_else(|| {
                PlaybackFailure::media(
                    MediaErrorKind::SourceNotSupported,
                    format!("{} has been revoked", source),
                )
            });
        }

        if source.starts_with("http://") || source.starts_with("https://") {
            return Ok(Arc::from(self.fetch_remote(source).await?));
        }

        Err(PlaybackFailure::media(
            MediaErrorKind::SourceNotSupported,
            format!("Unsupported source {:?}", source),
        ))
    }
}

#[async_trait]
impl PlaybackEngine for HttpPlaybackEngine {
    async fn load(&self, source: &str) -> Result<(), PlaybackFailure> {
        self.stop().await;

        let payload = self.read_source(source).await?;
        if !infer::is_audio(&payload) {
            return Err(PlaybackFailure::media(
                MediaErrorKind::Decode,
                format!("{} is not a recognised audio format", source),
            ));
        }

        debug!("Loaded {} ({} bytes)", source, payload.len());
        self.transport.lock().await.bound = Some((source.to_string(), payload));
        Ok(())
    }

    async fn play(&self, trigger: PlayTrigger) -> Result<(), PlaybackFailure> {
        let mut transport = self.transport.lock().await;
        let Some((source, _)) = &transport.bound else {
            return Err(PlaybackFailure::media(
                MediaErrorKind::SourceNotSupported,
                "no source is bound",
            ));
        };

        if !self.autoplay.permits(trigger) {
            return Err(PlaybackFailure::Blocked(format!(
                "autoplay policy {} refused to start {}",
                self.autoplay.as_str(),
                source
            )));
        }

        info!("Playing {}", source);
        transport.playing = true;
        Ok(())
    }

    async fn pause(&self) {
        self.transport.lock().await.playing = false;
    }

    async fn stop(&self) {
        let mut transport = self.transport.lock().await;
        transport.bound = None;
        transport.playing = false;
    }
}
