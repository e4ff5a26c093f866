use super::constants::*;
use super::server::TestBucket;
use musikepoker::catalogue::remote_audio_url;
use musikepoker::{
    AudioStore, AutoplayPolicy, Catalogue, CatalogueEntry, HttpPlaybackEngine, MusicalPeriod,
    ObjectUrlRegistry, QuizView, SqliteAudioStore, TimelineView, ViewContext,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn entry(
    id: &str,
    title: &str,
    composer: &str,
    year: i32,
    period: MusicalPeriod,
    file_name: &str,
    base_url: &str,
) -> CatalogueEntry {
    CatalogueEntry {
        id: id.to_string(),
        title: title.to_string(),
        composer: composer.to_string(),
        year,
        period,
        description: String::new(),
        file_name: file_name.to_string(),
        remote_url: remote_audio_url(base_url, file_name),
    }
}

fn create_test_catalogue(base_url: &str) -> Catalogue {
    Catalogue::from_entries(vec![
        entry(
            FORBIDDEN_PIECE_ID,
            "Toccata",
            "J. S. Bach",
            1704,
            MusicalPeriod::Baroque,
            FORBIDDEN_FILE_NAME,
            base_url,
        ),
        entry(
            OPEN_PIECE_ID,
            "Eine kleine Nachtmusik",
            "W. A. Mozart",
            1787,
            MusicalPeriod::Classical,
            OPEN_FILE_NAME,
            base_url,
        ),
        entry(
            GARBAGE_PIECE_ID,
            "Gymnopédie No.1",
            "Erik Satie",
            1888,
            MusicalPeriod::Impressionist,
            GARBAGE_FILE_NAME,
            base_url,
        ),
    ])
}

/// Everything a view needs, backed by an on-disk store in a temp dir.
pub struct TestApp {
    pub ctx: ViewContext,
    pub registry: ObjectUrlRegistry,
    pub db_path: PathBuf,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new(bucket: &TestBucket, autoplay: AutoplayPolicy) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("audio_store.db");
        let store: Arc<dyn AudioStore> = Arc::new(SqliteAudioStore::new(&db_path));
        let registry = ObjectUrlRegistry::new();
        let engine = Arc::new(
            HttpPlaybackEngine::new(registry.clone(), autoplay, 5)
                .expect("Failed to create playback engine"),
        );
        let ctx = ViewContext::new(
            Arc::new(create_test_catalogue(&bucket.base_url)),
            store,
            registry.clone(),
            engine,
        );

        Self {
            ctx,
            registry,
            db_path,
            _temp_dir: temp_dir,
        }
    }

    pub fn timeline(&self) -> TimelineView {
        TimelineView::mount(&self.ctx)
    }

    pub fn quiz(&self) -> QuizView {
        QuizView::mount(&self.ctx)
    }

    /// A second, independent connection to the same database file.
    pub fn reopen_store(&self) -> SqliteAudioStore {
        SqliteAudioStore::new(&self.db_path)
    }
}
