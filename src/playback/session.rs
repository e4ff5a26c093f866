//! Per-view playback session.
//!
//! A session owns one transport slot: at most one piece is bound to the
//! engine at a time, and binding a new piece first stops the current one.

use super::{MediaErrorKind, PlayTrigger, PlaybackEngine, PlaybackFailure};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// Source bound, output not started yet.
    Loading { piece_id: String },
    Playing { piece_id: String },
    Paused { piece_id: String },
    Failed {
        piece_id: String,
        failure: PlaybackFailure,
    },
}

impl PlaybackState {
    pub fn piece_id(&self) -> Option<&str> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Loading { piece_id }
            | PlaybackState::Playing { piece_id }
            | PlaybackState::Paused { piece_id }
            | PlaybackState::Failed { piece_id, .. } => Some(piece_id),
        }
    }

    /// True while a piece is bound to the transport.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackState::Loading { .. }
                | PlaybackState::Playing { .. }
                | PlaybackState::Paused { .. }
        )
    }
}

pub struct PlaybackSession {
    engine: Arc<dyn PlaybackEngine>,
    state: PlaybackState,
    failed: HashSet<String>,
}

impl PlaybackSession {
    pub fn new(engine: Arc<dyn PlaybackEngine>) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            failed: HashSet::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Piece currently bound to the transport, if any.
    pub fn active_piece(&self) -> Option<&str> {
        if self.state.is_active() {
            self.state.piece_id()
        } else {
            None
        }
    }

    pub fn is_playing(&self, piece_id: &str) -> bool {
        matches!(&self.state, PlaybackState::Playing { piece_id: p } if p == piece_id)
    }

    pub fn failed_ids(&self) -> &HashSet<String> {
        &self.failed
    }

    pub fn has_failed(&self, piece_id: &str) -> bool {
        self.failed.contains(piece_id)
    }

    /// Stops whatever is bound and binds `source` for `piece_id`.
    ///
    /// On success the session is `Loading`; a load error moves it to `Failed`.
    pub async fn select(&mut self, piece_id: &str, source: &str) -> Result<(), PlaybackFailure> {
        self.stop().await;
        debug!("Binding {:?} to {}", piece_id, source);
        self.state = PlaybackState::Loading {
            piece_id: piece_id.to_string(),
        };

        if let Err(failure) = self.engine.load(source).await {
            self.engine.stop().await;
            self.fail(piece_id, failure.clone());
            return Err(failure);
        }
        Ok(())
    }

    /// Starts output of the bound piece.
    ///
    /// Does nothing if the piece is already playing. Without a bound piece the
    /// request is rejected and the state left untouched.
    pub async fn play(&mut self, trigger: PlayTrigger) -> Result<(), PlaybackFailure> {
        let piece_id = match &self.state {
            PlaybackState::Loading { piece_id } | PlaybackState::Paused { piece_id } => {
                piece_id.clone()
            }
            PlaybackState::Playing { .. } => return Ok(()),
            PlaybackState::Idle | PlaybackState::Failed { .. } => {
                return Err(PlaybackFailure::media(
                    MediaErrorKind::SourceNotSupported,
                    "no source is bound",
                ))
            }
        };

        match self.engine.play(trigger).await {
            Ok(()) => {
                self.failed.remove(&piece_id);
                self.state = PlaybackState::Playing { piece_id };
                Ok(())
            }
            Err(failure) => {
                self.engine.stop().await;
                self.fail(&piece_id, failure.clone());
                Err(failure)
            }
        }
    }

    /// Binds and plays in one step.
    pub async fn start(
        &mut self,
        piece_id: &str,
        source: &str,
        trigger: PlayTrigger,
    ) -> Result<(), PlaybackFailure> {
        self.select(piece_id, source).await?;
        self.play(trigger).await
    }

    /// Pauses the playing piece. Returns false if nothing was playing.
    pub async fn pause(&mut self) -> bool {
        let PlaybackState::Playing { piece_id } = &self.state else {
            return false;
        };
        let piece_id = piece_id.clone();
        self.engine.pause().await;
        self.state = PlaybackState::Paused { piece_id };
        true
    }

    /// Unbinds the current piece and returns to `Idle`.
    pub async fn stop(&mut self) {
        if self.state.is_active() {
            self.engine.stop().await;
        }
        self.state = PlaybackState::Idle;
    }

    /// The playing piece reached its end.
    pub fn on_ended(&mut self) {
        if matches!(self.state, PlaybackState::Playing { .. }) {
            self.state = PlaybackState::Idle;
        }
    }

    /// The engine reported an error for the bound source after it was loaded.
    /// Returns false if no piece was loading or playing.
    pub async fn on_media_error(&mut self, failure: PlaybackFailure) -> bool {
        let piece_id = match &self.state {
            PlaybackState::Loading { piece_id } | PlaybackState::Playing { piece_id } => {
                piece_id.clone()
            }
            _ => return false,
        };
        self.engine.stop().await;
        self.fail(&piece_id, failure);
        true
    }

    /// Forgets that `piece_id` failed, e.g. after a replacement upload.
    pub fn clear_failure(&mut self, piece_id: &str) {
        self.failed.remove(piece_id);
        if matches!(&self.state, PlaybackState::Failed { piece_id: p, .. } if p == piece_id) {
            self.state = PlaybackState::Idle;
        }
    }

    fn fail(&mut self, piece_id: &str, failure: PlaybackFailure) {
        warn!("Playback failed for {:?}: {}", piece_id, failure);
        self.failed.insert(piece_id.to_string());
        self.state = PlaybackState::Failed {
            piece_id: piece_id.to_string(),
            failure,
        };
    }
}
