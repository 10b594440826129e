//! In-process stand-in for the remote scoring service.
//!
//! [`StubScorer`] serves `POST /compare` on an ephemeral loopback port from a
//! dedicated thread, so both async tests and blocking CLI tests can talk to it
//! over real HTTP.

use std::io;
use std::net::TcpListener as StdTcpListener;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;

/// Answer the stub gives for one comparison.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// `200 OK` with `{"final_score": <score>}`.
    Score(f64),
    /// `200 OK` with an arbitrary JSON body.
    Json(Value),
    /// Empty response with the given status code.
    Status(u16),
    /// `200 OK` with a raw body labelled as JSON.
    Raw(String),
    /// Wait before answering with `{"final_score": <score>}`.
    Delayed(Duration, f64),
}

type Rule = dyn Fn(&str, &str) -> StubReply + Send + Sync;

#[derive(Clone)]
struct StubState {
    rule: Arc<Rule>,
    received: Arc<Mutex<Vec<(String, String)>>>,
}

#[derive(Deserialize)]
struct ComparePayload {
    #[serde(default)]
    code1: String,
    #[serde(default)]
    code2: String,
}

/// Running stub scoring service; stops when dropped.
pub struct StubScorer {
    base_url: String,
    received: Arc<Mutex<Vec<(String, String)>>>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl StubScorer {
    /// Starts a stub answering each comparison with `rule(code1, code2)`.
    ///
    /// # Errors
    /// Returns an I/O error when the listener or runtime cannot be created.
    pub fn spawn<F>(rule: F) -> io::Result<Self>
    where
        F: Fn(&str, &str) -> StubReply + Send + Sync + 'static,
    {
        let listener = StdTcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let received = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            rule: Arc::new(rule),
            received: Arc::clone(&received),
        };
        let (shutdown, stopped) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let app = Router::new()
                    .route("/compare", post(compare))
                    .with_state(state);
                let server = axum::serve(listener, app).into_future();
                tokio::select! {
                    _ = server => {}
                    _ = stopped => {}
                }
            });
        });

        Ok(Self {
            base_url: format!("http://{address}"),
            received,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    /// Returns the base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the `(code1, code2)` payloads received so far.
    #[must_use]
    pub fn received(&self) -> Vec<(String, String)> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many comparisons were requested.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.received().len()
    }
}

impl Drop for StubScorer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn compare(State(state): State<StubState>, Json(payload): Json<ComparePayload>) -> Response {
    state
        .received
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((payload.code1.clone(), payload.code2.clone()));

    match (state.rule)(&payload.code1, &payload.code2) {
        StubReply::Score(score) => Json(json!({ "final_score": score })).into_response(),
        StubReply::Json(body) => Json(body).into_response(),
        StubReply::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        StubReply::Raw(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        StubReply::Delayed(delay, score) => {
            tokio::time::sleep(delay).await;
            Json(json!({ "final_score": score })).into_response()
        }
    }
}
