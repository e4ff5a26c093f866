use super::{ViewContext, STORAGE_ERROR_STATUS};
use crate::audio_store::AudioStore;
use crate::catalogue::{Catalogue, CatalogueEntry};
use crate::object_url::ViewHandles;
use crate::playback::{PlayTrigger, PlaybackFailure, PlaybackSession, PlaybackState};
use crate::resolver::{self, PlayableSource, UploadedFile};
use std::sync::Arc;
use tracing::{error, info, warn};

/// One work on the timeline together with its playback flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineCard<'a> {
    pub entry: &'a CatalogueEntry,
    pub is_playing: bool,
    pub has_failed: bool,
    pub is_local: bool,
}

pub struct TimelineView {
    catalogue: Arc<Catalogue>,
    store: Arc<dyn AudioStore>,
    handles: ViewHandles,
    session: PlaybackSession,
    status: Option<String>,
    advisory: Option<String>,
}

impl TimelineView {
    /// Creates the view and registers handles for everything already stored.
    pub fn mount(ctx: &ViewContext) -> Self {
        let mut handles = ViewHandles::new(ctx.registry.clone());
        let status = match resolver::prime_from_store(ctx.store.as_ref(), &mut handles) {
            Ok(_) => None,
            Err(err) => {
                error!("Failed to initialize local storage: {}", err);
                Some(STORAGE_ERROR_STATUS.to_string())
            }
        };

        Self {
            catalogue: ctx.catalogue.clone(),
            store: ctx.store.clone(),
            handles,
            session: PlaybackSession::new(ctx.engine.clone()),
            status,
            advisory: None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Advice from the most recent playback failure, if it still applies.
    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> &PlaybackState {
        self.session.state()
    }

    pub fn cards(&self) -> Vec<TimelineCard<'_>> {
        self.catalogue
            .timeline()
            .into_iter()
            .map(|entry| TimelineCard {
                entry,
                is_playing: self.session.is_playing(&entry.id),
                has_failed: self.session.has_failed(&entry.id),
                is_local: self.handles.contains(&entry.file_name),
            })
            .collect()
    }

    pub fn source_for(&self, piece_id: &str) -> Option<PlayableSource<'_>> {
        self.catalogue
            .get(piece_id)
            .map(|piece| resolver::resolve(piece, &self.handles))
    }

    /// Pauses `piece_id` if it is playing, resumes it if paused, and starts
    /// it otherwise.
    pub async fn toggle(&mut self, piece_id: &str) -> &PlaybackState {
        let Some(source) = self.source_for(piece_id).map(|s| s.url().to_string()) else {
            warn!("Unknown piece {:?}", piece_id);
            return self.session.state();
        };

        let state = self.session.state();
        let is_current = state.piece_id() == Some(piece_id);
        let result = if is_current && matches!(state, PlaybackState::Playing { .. }) {
            self.session.pause().await;
            Ok(())
        } else if is_current && matches!(state, PlaybackState::Paused { .. }) {
            self.session.play(PlayTrigger::UserGesture).await
        } else {
            self.session
                .start(piece_id, &source, PlayTrigger::UserGesture)
                .await
        };

        match result {
            Ok(()) => self.advisory = None,
            Err(failure) => self.advisory = Some(failure.advisory().to_string()),
        }
        self.session.state()
    }

    /// Stores `file` as the local copy of `piece_id` and makes it the
    /// preferred source. Returns false if nothing was stored.
    pub fn manual_upload(&mut self, piece_id: &str, file: UploadedFile) -> bool {
        let catalogue = self.catalogue.clone();
        let Some(piece) = catalogue.get(piece_id) else {
            warn!("Upload for unknown piece {:?}", piece_id);
            return false;
        };

        match resolver::store_for_piece(piece, self.store.as_ref(), &mut self.handles, file) {
            Ok(_) => {
                self.session.clear_failure(piece_id);
                self.advisory = None;
                info!("Local file for {:?} saved", piece.title);
                true
            }
            Err(err) => {
                error!("Failed to store upload for {:?}: {}", piece_id, err);
                self.status = Some(STORAGE_ERROR_STATUS.to_string());
                false
            }
        }
    }

    pub async fn handle_media_error(&mut self, failure: PlaybackFailure) {
        let advisory = failure.advisory();
        if self.session.on_media_error(failure).await {
            self.advisory = Some(advisory.to_string());
        }
    }

    pub fn handle_ended(&mut self) {
        self.session.on_ended();
    }

    /// Stops playback and releases every handle. Returns how many handles
    /// were released.
    pub async fn unmount(mut self) -> usize {
        self.session.stop().await;
        self.handles.release_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_store::SqliteAudioStore;
    use crate::playback::test_support::FakeEngine;
    use crate::playback::MediaErrorKind;
    use crate::views::test_support::{context, context_with, MP3_BYTES};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mount_primes_local_handles() {
        let store = Arc::new(SqliteAudioStore::in_memory());
        store.put("bach-toccata.mp3", MP3_BYTES).unwrap();
        let (ctx, registry) = context_with(store, Arc::new(FakeEngine::new()));

        let view = TimelineView::mount(&ctx);

        assert_eq!(view.status(), None);
        assert_eq!(registry.live_count(), 1);
        let cards = view.cards();
        assert_eq!(cards.len(), 3);
        let toccata = cards.iter().find(|c| c.entry.id == "bach-toccata").unwrap();
        assert!(toccata.is_local);
        assert!(cards.iter().filter(|c| c.is_local).count() == 1);
    }

    #[tokio::test]
    async fn test_mount_with_broken_store_degrades_to_remote() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteAudioStore::new(
            temp_dir.path().join("missing").join("audio.db"),
        ));
        let engine = Arc::new(FakeEngine::new());
        let (ctx, _registry) = context_with(store, engine.clone());

        let mut view = TimelineView::mount(&ctx);
        assert_eq!(view.status(), Some(STORAGE_ERROR_STATUS));

        let state = view.toggle("mozart-night").await.clone();
        assert!(matches!(state, PlaybackState::Playing { .. }));
        assert_eq!(
            engine.bound().await.as_deref(),
            Some("https://store/mozart-night.mp3")
        );
    }

    #[tokio::test]
    async fn test_toggle_plays_pauses_and_resumes() {
        let engine = Arc::new(FakeEngine::new());
        let (ctx, _registry) = context(engine.clone());
        let mut view = TimelineView::mount(&ctx);

        view.toggle("bach-toccata").await;
        assert!(view.session().is_playing("bach-toccata"));

        view.toggle("bach-toccata").await;
        assert!(matches!(view.state(), PlaybackState::Paused { .. }));

        view.toggle("bach-toccata").await;
        assert!(view.session().is_playing("bach-toccata"));
        assert!(engine.is_playing().await);
    }

    #[tokio::test]
    async fn test_only_one_card_plays_at_a_time() {
        let engine = Arc::new(FakeEngine::new());
        let (ctx, _registry) = context(engine);
        let mut view = TimelineView::mount(&ctx);

        view.toggle("bach-toccata").await;
        view.toggle("debussy-clair").await;

        let playing: Vec<_> = view
            .cards()
            .into_iter()
            .filter(|c| c.is_playing)
            .map(|c| c.entry.id.clone())
            .collect();
        assert_eq!(playing, vec!["debussy-clair".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_remote_then_manual_upload_recovers() {
        let engine = Arc::new(FakeEngine::new().failing_source(
            "https://store/bach-toccata.mp3",
            PlaybackFailure::media(MediaErrorKind::Network, "HTTP 403 Forbidden"),
        ));
        let (ctx, _registry) = context(engine.clone());
        let mut view = TimelineView::mount(&ctx);

        let state = view.toggle("bach-toccata").await.clone();
        assert!(matches!(state, PlaybackState::Failed { .. }));
        assert!(view.advisory().unwrap().contains("public read access"));
        let card = view
            .cards()
            .into_iter()
            .find(|c| c.entry.id == "bach-toccata")
            .unwrap();
        assert!(card.has_failed);

        assert!(view.manual_upload(
            "bach-toccata",
            UploadedFile::new("my-toccata.mp3", MP3_BYTES.to_vec())
        ));
        assert!(!view.session().has_failed("bach-toccata"));
        assert_eq!(view.advisory(), None);
        assert!(view.source_for("bach-toccata").unwrap().is_local());

        view.toggle("bach-toccata").await;
        assert!(view.session().is_playing("bach-toccata"));
        assert!(engine.bound().await.unwrap().starts_with("blob:"));
    }

    #[tokio::test]
    async fn test_media_error_while_playing_sets_advisory() {
        let engine = Arc::new(FakeEngine::new());
        let (ctx, _registry) = context(engine);
        let mut view = TimelineView::mount(&ctx);
        view.toggle("mozart-night").await;

        view.handle_media_error(PlaybackFailure::media(MediaErrorKind::Decode, "bad frame"))
            .await;

        assert!(view.session().has_failed("mozart-night"));
        assert!(view.advisory().is_some());
    }

    #[tokio::test]
    async fn test_ended_returns_to_idle() {
        let engine = Arc::new(FakeEngine::new());
        let (ctx, _registry) = context(engine);
        let mut view = TimelineView::mount(&ctx);
        view.toggle("mozart-night").await;

        view.handle_ended();

        assert_eq!(view.state(), &PlaybackState::Idle);
    }

    #[tokio::test]
    async fn test_upload_for_unknown_piece_is_ignored() {
        let (ctx, registry) = context(Arc::new(FakeEngine::new()));
        let mut view = TimelineView::mount(&ctx);

        assert!(!view.manual_upload("nope", UploadedFile::new("x.mp3", vec![1])));
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn test_unmount_releases_handles_and_stops() {
        let store = Arc::new(SqliteAudioStore::in_memory());
        store.put("bach-toccata.mp3", MP3_BYTES).unwrap();
        store.put("orphan.mp3", MP3_BYTES).unwrap();
        let engine = Arc::new(FakeEngine::new());
        let (ctx, registry) = context_with(store, engine.clone());
        let mut view = TimelineView::mount(&ctx);
        view.toggle("bach-toccata").await;

        assert_eq!(view.unmount().await, 2);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(engine.bound().await, None);
    }
}
