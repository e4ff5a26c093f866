use super::{synced_status, ViewContext, STORAGE_ERROR_STATUS};
use crate::audio_store::AudioStore;
use crate::catalogue::{Catalogue, CatalogueEntry, MusicalPeriod};
use crate::object_url::ViewHandles;
use crate::playback::{PlayTrigger, PlaybackFailure, PlaybackSession, PlaybackState};
use crate::resolver::{self, IngestReport, UploadedFile};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, error, info};

const SAVING_STATUS: &str = "Saving to local storage...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Wrong,
}

pub struct QuizView {
    catalogue: Arc<Catalogue>,
    store: Arc<dyn AudioStore>,
    handles: ViewHandles,
    session: PlaybackSession,
    status: String,
    current: Option<usize>,
    selected_period: Option<MusicalPeriod>,
    selected_composer: Option<String>,
    feedback: Option<Feedback>,
    load_error: Option<String>,
    score: u32,
    attempts: u32,
}

impl QuizView {
    pub fn mount(ctx: &ViewContext) -> Self {
        let mut handles = ViewHandles::new(ctx.registry.clone());
        let status = match resolver::prime_from_store(ctx.store.as_ref(), &mut handles) {
            Ok(count) => synced_status(count),
            Err(err) => {
                error!("Failed to initialize local storage: {}", err);
                STORAGE_ERROR_STATUS.to_string()
            }
        };

        Self {
            catalogue: ctx.catalogue.clone(),
            store: ctx.store.clone(),
            handles,
            session: PlaybackSession::new(ctx.engine.clone()),
            status,
            current: None,
            selected_period: None,
            selected_composer: None,
            feedback: None,
            load_error: None,
            score: 0,
            attempts: 0,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn current_piece(&self) -> Option<&CatalogueEntry> {
        self.current.and_then(|i| self.catalogue.entries().get(i))
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn is_answered(&self) -> bool {
        self.feedback.is_some()
    }

    /// Advice from the most recent playback failure in this round.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn selected_period(&self) -> Option<MusicalPeriod> {
        self.selected_period
    }

    pub fn selected_composer(&self) -> Option<&str> {
        self.selected_composer.as_deref()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> &PlaybackState {
        self.session.state()
    }

    /// Stores every upload that matches a catalogue entry.
    ///
    /// Returns `None` if the store failed; the status then reports the error.
    pub fn upload_files(&mut self, files: Vec<UploadedFile>) -> Option<IngestReport> {
        self.status = SAVING_STATUS.to_string();
        match resolver::ingest(&self.catalogue, self.store.as_ref(), &mut self.handles, files) {
            Ok(report) => {
                for (_, piece_id) in &report.matched {
                    self.session.clear_failure(piece_id);
                }
                self.status = synced_status(self.handles.len());
                Some(report)
            }
            Err(err) => {
                error!("Failed to store uploads: {}", err);
                self.status = STORAGE_ERROR_STATUS.to_string();
                None
            }
        }
    }

    /// Picks a random piece and binds its source without starting output.
    ///
    /// Returns false if the catalogue is empty.
    pub async fn start_next_round<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.catalogue.is_empty() {
            return false;
        }
        let index = rng.random_range(0..self.catalogue.len());
        self.current = Some(index);
        self.selected_period = None;
        self.selected_composer = None;
        self.feedback = None;
        self.load_error = None;

        self.bind_current().await;
        true
    }

    /// Pauses the round's piece if it is playing and starts it otherwise.
    ///
    /// Does nothing once the round has been answered.
    pub async fn toggle_playback(&mut self) -> &PlaybackState {
        if self.current.is_none() || self.is_answered() {
            return self.session.state();
        }

        if matches!(self.session.state(), PlaybackState::Playing { .. }) {
            self.session.pause().await;
            return self.session.state();
        }

        if matches!(self.session.state(), PlaybackState::Idle | PlaybackState::Failed { .. })
            && !self.bind_current().await
        {
            return self.session.state();
        }

        match self.session.play(PlayTrigger::UserGesture).await {
            Ok(()) => self.load_error = None,
            Err(failure) => self.load_error = Some(failure.advisory().to_string()),
        }
        self.session.state()
    }

    pub async fn handle_media_error(&mut self, failure: PlaybackFailure) {
        let advisory = failure.advisory();
        if self.session.on_media_error(failure).await {
            self.load_error = Some(advisory.to_string());
        }
    }

    pub fn handle_ended(&mut self) {
        self.session.on_ended();
    }

    pub fn select_period(&mut self, period: MusicalPeriod) {
        if !self.is_answered() {
            self.selected_period = Some(period);
        }
    }

    pub fn select_composer(&mut self, composer: &str) {
        if !self.is_answered() {
            self.selected_composer = Some(composer.to_string());
        }
    }

    /// Scores the current selection. Both period and composer must match.
    ///
    /// A round is scored once; asking again returns the same feedback.
    /// Returns `None` without counting an attempt until both a period and a
    /// composer have been selected.
    pub async fn check_answer(&mut self) -> Option<Feedback> {
        if self.feedback.is_some() {
            return self.feedback;
        }
        let piece = self.current_piece()?;
        let (Some(period), Some(composer)) =
            (self.selected_period, self.selected_composer.as_deref())
        else {
            return None;
        };
        let correct = period == piece.period && composer == piece.composer;
        let piece_id = piece.id.clone();

        let feedback = if correct {
            self.score += 1;
            Feedback::Correct
        } else {
            Feedback::Wrong
        };
        self.attempts += 1;
        self.feedback = Some(feedback);
        self.session.pause().await;

        info!(
            "Answer for {:?}: {:?} ({}/{})",
            piece_id, feedback, self.score, self.attempts
        );
        Some(feedback)
    }

    /// Stops playback and releases every handle.
    pub async fn unmount(mut self) -> usize {
        self.session.stop().await;
        self.handles.release_all()
    }

    async fn bind_current(&mut self) -> bool {
        let catalogue = self.catalogue.clone();
        let Some(piece) = self.current.and_then(|i| catalogue.entries().get(i)) else {
            return false;
        };
        let source = resolver::resolve(piece, &self.handles).url().to_string();
        debug!("Round piece {:?} from {}", piece.id, source);

        match self.session.select(&piece.id, &source).await {
            Ok(()) => true,
            Err(failure) => {
                self.load_error = Some(failure.advisory().to_string());
                false
            }
        }
    }
}
