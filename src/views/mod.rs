//! Controllers for the two screens: the timeline and the listening quiz.
//!
//! Both own a handle set and a playback session for as long as they are
//! mounted. Errors never escape a controller; they end up in its status or
//! advisory text.

mod quiz;
mod timeline;

pub use quiz::{Feedback, QuizView};
pub use timeline::{TimelineCard, TimelineView};

use crate::audio_store::AudioStore;
use crate::catalogue::Catalogue;
use crate::object_url::ObjectUrlRegistry;
use crate::playback::PlaybackEngine;
use std::sync::Arc;

/// Shown when the local store cannot be read.
pub const STORAGE_ERROR_STATUS: &str = "Storage error";

/// Collaborators shared by every view.
#[derive(Clone)]
pub struct ViewContext {
    pub catalogue: Arc<Catalogue>,
    pub store: Arc<dyn AudioStore>,
    pub registry: ObjectUrlRegistry,
    pub engine: Arc<dyn PlaybackEngine>,
}

impl ViewContext {
    pub fn new(
        catalogue: Arc<Catalogue>,
        store: Arc<dyn AudioStore>,
        registry: ObjectUrlRegistry,
        engine: Arc<dyn PlaybackEngine>,
    ) -> Self {
        Self {
            catalogue,
            store,
            registry,
            engine,
        }
    }
}

fn synced_status(file_count: usize) -> String {
    format!("Local storage synced: {} files", file_count)
}
