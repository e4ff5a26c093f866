//! Common test infrastructure
//!
//! Tests import from this module only.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestBucket, TestApp, OPEN_PIECE_ID};
//!
//! #[tokio::test]
//! async fn test_remote_playback() {
//!     let bucket = TestBucket::spawn().await;
//!     let app = TestApp::new(&bucket, AutoplayPolicy::RequireGesture);
//!     let mut view = app.timeline();
//!     view.toggle(OPEN_PIECE_ID).await;
//! }
//! ```

mod constants;
mod fixtures;
mod server;

pub use constants::*;
pub use fixtures::TestApp;
pub use server::TestBucket;
