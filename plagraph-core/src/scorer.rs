//! Scorer abstraction for the similarity service consulted by the builder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScorerError;

/// Named sub-metrics reported alongside the final score.
///
/// Every metric is a percentage in `[0, 100]`. The builder never inspects
/// them; they travel with the emitted edges for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubMetrics {
    /// Similarity of the parsed syntax trees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast: Option<f64>,
    /// Cosine similarity over token counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosine: Option<f64>,
    /// Cosine similarity over TF-IDF vectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tfidf_cosine: Option<f64>,
    /// Normalised Levenshtein similarity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levenshtein: Option<f64>,
    /// Jaccard similarity over token sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jaccard: Option<f64>,
}

impl SubMetrics {
    /// Returns whether no sub-metric was reported.
    ///
    /// # Examples
    /// ```
    /// use plagraph_core::SubMetrics;
    ///
    /// assert!(SubMetrics::default().is_empty());
    /// let metrics = SubMetrics { ast: Some(91.0), ..SubMetrics::default() };
    /// assert!(!metrics.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of comparing two code texts.
///
/// # Examples
/// ```
/// use plagraph_core::SimilarityReport;
///
/// let report = SimilarityReport::from_score(87.5);
/// assert_eq!(report.final_score, 87.5);
/// assert!(report.metrics.is_empty());
/// assert_eq!(report.plagiarised, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    /// Weighted similarity percentage used for thresholding.
    pub final_score: f64,
    /// Optional per-metric breakdown.
    #[serde(default, skip_serializing_if = "SubMetrics::is_empty")]
    pub metrics: SubMetrics,
    /// Optional binary classification from the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plagiarised: Option<bool>,
}

impl SimilarityReport {
    /// Builds a report carrying only a final score.
    #[must_use]
    pub fn from_score(final_score: f64) -> Self {
        Self {
            final_score,
            metrics: SubMetrics::default(),
            plagiarised: None,
        }
    }
}

/// Compares two code texts and reports their similarity.
///
/// Implementations usually wrap a remote service, so every call is a
/// suspend point. The builder awaits one call at a time.
///
/// # Examples
/// ```
/// use async_trait::async_trait;
/// use plagraph_core::{Scorer, ScorerError, SimilarityReport};
///
/// struct SameLength;
///
/// #[async_trait]
/// impl Scorer for SameLength {
///     fn name(&self) -> &str { "same-length" }
///     async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError> {
///         let score = if left.len() == right.len() { 100.0 } else { 0.0 };
///         Ok(SimilarityReport::from_score(score))
///     }
/// }
///
/// assert_eq!(SameLength.name(), "same-length");
/// ```
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Scores the similarity of `left` and `right`.
    ///
    /// # Errors
    /// Returns [`ScorerError`] when the comparison cannot be completed or the
    /// service answer cannot be interpreted.
    async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError>;
}

#[async_trait]
impl<S: Scorer + ?Sized> Scorer for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError> {
        (**self).score(left, right).await
    }
}

#[async_trait]
impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError> {
        (**self).score(left, right).await
    }
}
