use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use plagraph_core::{Scorer, ScorerError, SimilarityReport, Submission};

/// Scorer answering from a table keyed by unordered code pairs.
///
/// Pairs missing from the table score `0.0`.
#[derive(Default)]
pub struct ScriptedScorer {
    answers: HashMap<(String, String), Result<f64, ScorerError>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedScorer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_score(mut self, left: &str, right: &str, score: f64) -> Self {
        self.answers.insert(key(left, right), Ok(score));
        self
    }

    #[must_use]
    pub fn with_error(mut self, left: &str, right: &str, error: ScorerError) -> Self {
        self.answers.insert(key(left, right), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

fn key(left: &str, right: &str) -> (String, String) {
    if left <= right {
        (left.to_owned(), right.to_owned())
    } else {
        (right.to_owned(), left.to_owned())
    }
}

#[async_trait]
impl Scorer for ScriptedScorer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((left.to_owned(), right.to_owned()));
        match self.answers.get(&key(left, right)) {
            Some(Ok(score)) => Ok(SimilarityReport::from_score(*score)),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(SimilarityReport::from_score(0.0)),
        }
    }
}

/// Submissions whose id, name and code are all derived from `names`.
#[must_use]
pub fn submissions(names: &[&str]) -> Vec<Submission> {
    names
        .iter()
        .map(|name| Submission::new(*name, name.to_uppercase(), format!("code of {name}")))
        .collect()
}
