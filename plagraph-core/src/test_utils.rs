//! Shared test utilities for `plagraph-core`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::ScorerError,
    scorer::{Scorer, SimilarityReport},
    submission::Submission,
};

/// Builds `count` submissions whose code is `s<index>`.
///
/// [`MatrixScorer`] recovers the index from the code text.
pub(crate) fn indexed_submissions(count: usize) -> Vec<Submission> {
    (0..count)
        .map(|index| Submission::new(format!("id-{index}"), format!("user-{index}"), format!("s{index}")))
        .collect()
}

/// Builds a symmetric score matrix filled with `fill` plus the listed pairs.
pub(crate) fn score_matrix(count: usize, fill: f64, pairs: &[(usize, usize, f64)]) -> Vec<Vec<f64>> {
    let mut scores = vec![vec![fill; count]; count];
    for &(left, right, score) in pairs {
        scores[left][right] = score;
        scores[right][left] = score;
    }
    scores
}

/// [`Scorer`] answering from a score matrix and recording each call.
pub(crate) struct MatrixScorer {
    scores: Vec<Vec<f64>>,
    calls: Mutex<Vec<(usize, usize)>>,
    failure: Option<((usize, usize), ScorerError)>,
    delay: Option<Duration>,
}

impl MatrixScorer {
    pub(crate) fn new(scores: Vec<Vec<f64>>) -> Self {
        Self {
            scores,
            calls: Mutex::new(Vec::new()),
            failure: None,
            delay: None,
        }
    }

    /// Fails the comparison of `pair` with `error`.
    pub(crate) fn failing_on(mut self, pair: (usize, usize), error: ScorerError) -> Self {
        self.failure = Some((pair, error));
        self
    }

    /// Sleeps for `delay` before answering each call.
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the `(left, right)` index pairs scored so far.
    pub(crate) fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

fn index_of(code: &str) -> Result<usize, ScorerError> {
    code.strip_prefix('s')
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| ScorerError::MalformedResponse {
            message: format!("unexpected code text `{code}`"),
        })
}

#[async_trait]
impl Scorer for MatrixScorer {
    fn name(&self) -> &str {
        "matrix"
    }

    async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError> {
        let pair = (index_of(left)?, index_of(right)?);
        self.calls.lock().expect("calls lock poisoned").push(pair);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((failing, error)) = &self.failure {
            if *failing == pair {
                return Err(error.clone());
            }
        }
        Ok(SimilarityReport::from_score(self.scores[pair.0][pair.1]))
    }
}

/// Runs `future` to completion on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime must build")
        .block_on(future)
}
