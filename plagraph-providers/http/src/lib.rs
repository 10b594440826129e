//! HTTP scorer for the remote code-similarity service.
//!
//! The service exposes `POST <base>/compare`, accepting
//! `{"code1": .., "code2": ..}` and answering with at least
//! `{"final_score": <percentage>}`. Optional sub-metrics and a
//! `plagiarised` flag are forwarded when present.

use std::time::Duration;

use async_trait::async_trait;
use plagraph_core::{Scorer, ScorerError, SimilarityReport, SubMetrics};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Base URL of a locally running scoring service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Time allowed for one HTTP exchange by default.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while constructing an [`HttpScorer`].
#[derive(Debug, Error)]
pub enum HttpScorerError {
    /// The base URL could not be parsed or cannot carry a path.
    #[error("invalid scoring service URL `{url}`: {reason}")]
    InvalidUrl {
        /// URL as supplied.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for [`HttpScorer`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use plagraph_providers_http::{DEFAULT_BASE_URL, HttpScorerConfig};
///
/// let config = HttpScorerConfig::default().with_request_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), DEFAULT_BASE_URL);
/// assert_eq!(config.request_timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpScorerConfig {
    base_url: String,
    request_timeout: Duration,
}

impl Default for HttpScorerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl HttpScorerConfig {
    /// Creates a configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[derive(Serialize)]
struct CompareRequest<'a> {
    code1: &'a str,
    code2: &'a str,
}

#[derive(Deserialize)]
struct CompareResponse {
    final_score: f64,
    #[serde(default)]
    metrics: SubMetrics,
    #[serde(default)]
    plagiarised: Option<bool>,
}

/// [`Scorer`] that posts each pair to the remote `/compare` endpoint.
#[derive(Debug, Clone)]
pub struct HttpScorer {
    client: Client,
    endpoint: Url,
}

impl HttpScorer {
    /// Builds a scorer from `config`.
    ///
    /// # Errors
    /// Returns [`HttpScorerError::InvalidUrl`] when the base URL is not an
    /// absolute HTTP(S) URL and [`HttpScorerError::Client`] when the client
    /// cannot be created.
    ///
    /// # Examples
    /// ```
    /// use plagraph_providers_http::{HttpScorer, HttpScorerConfig};
    ///
    /// let scorer = HttpScorer::new(&HttpScorerConfig::new("http://scorer.internal:5001"))
    ///     .expect("URL is valid");
    /// assert_eq!(scorer.endpoint().as_str(), "http://scorer.internal:5001/compare");
    /// ```
    pub fn new(config: &HttpScorerConfig) -> Result<Self, HttpScorerError> {
        let endpoint = compare_endpoint(config.base_url())?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Returns the URL comparisons are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn compare_endpoint(base_url: &str) -> Result<Url, HttpScorerError> {
    let invalid = |reason: String| HttpScorerError::InvalidUrl {
        url: base_url.to_owned(),
        reason,
    };

    let mut base = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", base.scheme())));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("compare").map_err(|err| invalid(err.to_string()))
}

fn transport(err: &reqwest::Error) -> ScorerError {
    ScorerError::Transport {
        message: err.to_string(),
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(
        name = "http.score",
        level = "debug",
        skip_all,
        fields(endpoint = %self.endpoint),
    )]
    async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError> {
        if left.is_empty() || right.is_empty() {
            return Err(ScorerError::EmptyCode);
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&CompareRequest {
                code1: left,
                code2: right,
            })
            .send()
            .await
            .map_err(|err| transport(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScorerError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|err| transport(&err))?;
        let decoded: CompareResponse =
            serde_json::from_slice(&body).map_err(|err| ScorerError::MalformedResponse {
                message: err.to_string(),
            })?;
        debug!(similarity = decoded.final_score, "service answered");

        Ok(SimilarityReport {
            final_score: decoded.final_score,
            metrics: decoded.metrics,
            plagiarised: decoded.plagiarised,
        })
    }
}
