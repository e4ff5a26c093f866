//! Musikepoker library
//!
//! Local audio cache, source resolution and playback control for the
//! music-history timeline and listening quiz.

pub mod audio_store;
pub mod catalogue;
pub mod config;
pub mod object_url;
pub mod playback;
pub mod resolver;
pub mod sqlite_persistence;
pub mod views;

pub use audio_store::{AudioStore, SqliteAudioStore, StorageFailure};
pub use catalogue::{Catalogue, CatalogueEntry, MusicalPeriod};
pub use object_url::{ObjectUrlRegistry, ViewHandles};
pub use playback::{
    AutoplayPolicy, HttpPlaybackEngine, PlayTrigger, PlaybackEngine, PlaybackFailure,
    PlaybackSession, PlaybackState,
};
pub use views::{QuizView, TimelineView, ViewContext};
