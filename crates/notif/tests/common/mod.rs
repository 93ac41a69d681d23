//! Shared helpers: a local webhook receiver and a log capture sink.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use axum::routing::post;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;

/// One request seen by the receiver.
#[derive(Debug, Clone)]
pub struct Received {
    pub content_type: Option<String>,
    pub body: Value,
}

/// How the receiver answers.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub status: StatusCode,
    pub delay: Duration,
    /// The first `fail_first` requests get `fail_status` instead of `status`.
    pub fail_first: usize,
    pub fail_status: StatusCode,
    /// Response body sent with every answer.
    pub body: String,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            delay: Duration::ZERO,
            fail_first: 0,
            fail_status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
    }
}

struct ReceiverState {
    behavior: Behavior,
    hits: AtomicUsize,
    received: Mutex<Vec<Received>>,
}

/// Webhook receiver bound to an ephemeral local port.
pub struct Receiver {
    pub url: String,
    state: Arc<ReceiverState>,
}

impl Receiver {
    pub async fn start(behavior: Behavior) -> Self {
        let state = Arc::new(ReceiverState {
            behavior,
            hits: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/webhook", post(webhook))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind receiver");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("receiver crashed");
        });

        Self {
            url: format!("http://{addr}/webhook"),
            state,
        }
    }

    pub async fn ok() -> Self {
        Self::start(Behavior::default()).await
    }

    pub async fn with_status(status: StatusCode) -> Self {
        Self::start(Behavior {
            status,
            ..Default::default()
        })
        .await
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Received> {
        self.state.received.lock().clone()
    }
}

async fn webhook(
    State(state): State<Arc<ReceiverState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst);

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.received.lock().push(Received { content_type, body });

    if !state.behavior.delay.is_zero() {
        tokio::time::sleep(state.behavior.delay).await;
    }

    let status = if hit < state.behavior.fail_first {
        state.behavior.fail_status
    } else {
        state.behavior.status
    };
    (status, state.behavior.body.clone())
}

/// A URL nothing listens on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("http://{addr}/webhook")
}

#[derive(Clone, Default)]
pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl CaptureWriter {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A dispatcher whose formatted output lands in the returned writer.
pub fn capture_logs() -> (CaptureWriter, Dispatch) {
    let writer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (writer, Dispatch::new(subscriber))
}
