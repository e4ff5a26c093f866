//! End-to-end tests for the local store and upload matching.

mod common;

use common::{TestApp, TestBucket, FORBIDDEN_FILE_NAME, FORBIDDEN_PIECE_ID, TEST_AUDIO_BYTES};
use musikepoker::resolver::UploadedFile;
use musikepoker::{AudioStore, AutoplayPolicy};

#[tokio::test]
async fn test_fresh_store_lists_no_keys() {
    let bucket = TestBucket::spawn().await;
    let app = TestApp::new(&bucket, AutoplayPolicy::RequireGesture);

    assert!(app.ctx.store.list_keys().unwrap().is_empty());
    assert_eq!(app.quiz().status(), "Local storage synced: 0 files");
}

#[tokio::test]
async fn test_upload_by_title_switches_piece_to_local() {
    let bucket = TestBucket::spawn().await;
    let app = TestApp::new(&bucket, AutoplayPolicy::RequireGesture);
    let mut quiz = app.quiz();

    let piece = app.ctx.catalogue.get(FORBIDDEN_PIECE_ID).unwrap();
    let timeline = app.timeline();
    assert_eq!(
        timeline.source_for(FORBIDDEN_PIECE_ID).unwrap().url(),
        piece.remote_url
    );

    let report = quiz
        .upload_files(vec![UploadedFile::new(
            "JS-Bach-Toccata.mp3",
            TEST_AUDIO_BYTES.to_vec(),
        )])
        .unwrap();

    assert_eq!(
        report.matched,
        vec![(
            "JS-Bach-Toccata.mp3".to_string(),
            FORBIDDEN_PIECE_ID.to_string()
        )]
    );
    assert_eq!(
        app.ctx.store.get(FORBIDDEN_FILE_NAME).unwrap(),
        Some(TEST_AUDIO_BYTES.to_vec())
    );

    // Views mounted afterwards pick the stored copy up.
    let remounted = app.timeline();
    assert!(remounted.source_for(FORBIDDEN_PIECE_ID).unwrap().is_local());
}

#[tokio::test]
async fn test_uploads_survive_a_new_connection() {
    let bucket = TestBucket::spawn().await;
    let app = TestApp::new(&bucket, AutoplayPolicy::RequireGesture);
    let mut quiz = app.quiz();
    quiz.upload_files(vec![UploadedFile::new(
        "toccata (remaster).mp3",
        b"first".to_vec(),
    )]);
    quiz.upload_files(vec![UploadedFile::new(
        "Toccata live.mp3",
        b"second".to_vec(),
    )]);

    let reopened = app.reopen_store();

    assert_eq!(reopened.list_keys().unwrap(), vec![FORBIDDEN_FILE_NAME]);
    assert_eq!(
        reopened.get(FORBIDDEN_FILE_NAME).unwrap(),
        Some(b"second".to_vec())
    );
}

#[tokio::test]
async fn test_unmatched_upload_is_reported_not_stored() {
    let bucket = TestBucket::spawn().await;
    let app = TestApp::new(&bucket, AutoplayPolicy::RequireGesture);
    let mut quiz = app.quiz();

    let report = quiz
        .upload_files(vec![UploadedFile::new(
            "voice-memo-2024.m4a",
            TEST_AUDIO_BYTES.to_vec(),
        )])
        .unwrap();

    assert!(report.matched.is_empty());
    assert_eq!(report.unmatched, vec!["voice-memo-2024.m4a".to_string()]);
    assert!(app.ctx.store.list_keys().unwrap().is_empty());
}
