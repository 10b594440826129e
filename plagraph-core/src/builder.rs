//! Configuration surface for [`ClusterGraphBuilder`].
//!
//! Collects the threshold and time limits and validates them before a
//! builder is handed out.

use std::time::Duration;

use crate::{Result, error::GraphError, graph_builder::ClusterGraphBuilder};

/// Similarity percentage at which two submissions are linked by default.
pub const DEFAULT_THRESHOLD: f64 = 85.0;

/// Time allowed for one scorer call by default.
pub const DEFAULT_COMPARISON_TIMEOUT: Duration = Duration::from_secs(30);

/// Configures and constructs [`ClusterGraphBuilder`] instances.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use plagraph_core::ClusterGraphConfig;
///
/// let builder = ClusterGraphConfig::new()
///     .with_threshold(90.0)
///     .with_deadline(Some(Duration::from_secs(120)))
///     .into_builder()
///     .expect("configuration is valid");
/// assert_eq!(builder.threshold(), 90.0);
/// assert_eq!(builder.deadline(), Some(Duration::from_secs(120)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterGraphConfig {
    threshold: f64,
    comparison_timeout: Option<Duration>,
    deadline: Option<Duration>,
}

impl Default for ClusterGraphConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            comparison_timeout: Some(DEFAULT_COMPARISON_TIMEOUT),
            deadline: None,
        }
    }
}

impl ClusterGraphConfig {
    /// Creates a configuration populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use plagraph_core::{ClusterGraphConfig, DEFAULT_COMPARISON_TIMEOUT};
    ///
    /// let config = ClusterGraphConfig::new();
    /// assert_eq!(config.threshold(), 85.0);
    /// assert_eq!(config.comparison_timeout(), Some(DEFAULT_COMPARISON_TIMEOUT));
    /// assert_eq!(config.deadline(), None);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the similarity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sets the limit for a single scorer call; `None` waits indefinitely.
    #[must_use]
    pub fn with_comparison_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.comparison_timeout = timeout;
        self
    }

    /// Returns the per-comparison timeout.
    #[must_use]
    pub fn comparison_timeout(&self) -> Option<Duration> {
        self.comparison_timeout
    }

    /// Sets the limit for the whole build; `None` waits indefinitely.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns the overall build deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Validates the configuration and constructs a [`ClusterGraphBuilder`].
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidThreshold`] when the threshold is not a
    /// finite value in `[0, 100]`, and [`GraphError::InvalidTimeout`] when a
    /// configured limit is zero.
    ///
    /// # Examples
    /// ```
    /// use plagraph_core::{ClusterGraphConfig, GraphError};
    ///
    /// let err = ClusterGraphConfig::new()
    ///     .with_threshold(120.0)
    ///     .into_builder()
    ///     .expect_err("threshold above 100 is rejected");
    /// assert!(matches!(err, GraphError::InvalidThreshold { .. }));
    /// ```
    pub fn into_builder(self) -> Result<ClusterGraphBuilder> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(GraphError::InvalidThreshold {
                got: self.threshold,
            });
        }
        if self.comparison_timeout.is_some_and(|limit| limit.is_zero()) {
            return Err(GraphError::InvalidTimeout {
                setting: "comparison_timeout",
            });
        }
        if self.deadline.is_some_and(|limit| limit.is_zero()) {
            return Err(GraphError::InvalidTimeout {
                setting: "deadline",
            });
        }

        Ok(ClusterGraphBuilder::new(
            self.threshold,
            self.comparison_timeout,
            self.deadline,
        ))
    }
}
