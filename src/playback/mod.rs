//! Single-slot playback: the engine abstraction and the per-view session state
//! machine that drives it.

mod http_engine;
mod session;
#[cfg(test)]
pub(crate) mod test_support;

pub use http_engine::{AutoplayPolicy, HttpPlaybackEngine};
pub use session::{PlaybackSession, PlaybackState};

use async_trait::async_trait;
use thiserror::Error;

/// What went wrong with a media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    /// The source could not be fetched.
    Network,
    /// The bytes are not decodable audio.
    Decode,
    /// The source is of a kind the engine cannot open, or it was revoked.
    SourceNotSupported,
}

impl MediaErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaErrorKind::Network => "network",
            MediaErrorKind::Decode => "decode",
            MediaErrorKind::SourceNotSupported => "source_not_supported",
        }
    }
}

/// Why a piece ended up in the failed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackFailure {
    #[error("Media error ({}): {detail}", .kind.as_str())]
    Media { kind: MediaErrorKind, detail: String },

    #[error("Playback blocked by host: {0}")]
    Blocked(String),
}

impl PlaybackFailure {
    pub fn media(kind: MediaErrorKind, detail: impl Into<String>) -> Self {
        PlaybackFailure::Media {
            kind,
            detail: detail.into(),
        }
    }

    /// Advice shown to the learner.
    pub fn advisory(&self) -> &'static str {
        match self {
            PlaybackFailure::Media { .. } => {
                "Could not load the audio source. Check that the remote bucket allows public read access, or upload the file manually."
            }
            PlaybackFailure::Blocked(_) => {
                "Playback was blocked before it could start. Press play again to start it yourself."
            }
        }
    }
}

/// What initiated a play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTrigger {
    /// A direct user action such as pressing play.
    UserGesture,
    /// Anything else, e.g. automatic playback of a new round.
    Programmatic,
}

/// The transport a session binds sources to. One source at a time.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Binds `source` to the transport, replacing whatever was bound before.
    async fn load(&self, source: &str) -> Result<(), PlaybackFailure>;

    /// Starts or resumes output of the bound source.
    async fn play(&self, trigger: PlayTrigger) -> Result<(), PlaybackFailure>;

    /// Pauses output, keeping the source bound.
    async fn pause(&self);

    /// Pauses and unbinds the current source.
    async fn stop(&self);
}
