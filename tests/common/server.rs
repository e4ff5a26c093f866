//! A stand-in for the remote object bucket.

use super::constants::*;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

async fn serve_object(Path(file_name): Path<String>) -> Response {
    match file_name.as_str() {
        FORBIDDEN_FILE_NAME => (StatusCode::FORBIDDEN, "Permission denied").into_response(),
        GARBAGE_FILE_NAME => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            GARBAGE_BODY,
        )
            .into_response(),
        _ => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            TEST_AUDIO_BYTES,
        )
            .into_response(),
    }
}

/// HTTP server on a random port. Shuts down when dropped.
pub struct TestBucket {
    /// Prefix the catalogue builds remote URLs from, e.g. "http://127.0.0.1:1234/o/".
    pub base_url: String,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestBucket {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = Router::new().route("/o/{file_name}", get(serve_object));

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/o/", port),
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}
