//! Pairwise comparison loop that turns submissions into a similarity graph.
//!
//! Pairs `(i, j)` with `i < j` are visited in input order. A pair whose two
//! sides already share a cluster is not scored: once linked, a further score
//! cannot change cluster membership. This treats similarity as transitive
//! through clustering, which raw pairwise similarity is not, and saves a
//! remote call per pruned pair.

use std::{sync::Arc, time::Duration};

use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, instrument, warn};

use crate::{
    Result,
    error::{GraphError, ScorerError},
    graph::{BuildStats, ClusterMember, Graph, GraphEdge, GraphNode},
    scorer::{Scorer, SimilarityReport},
    submission::Submission,
    union_find::DisjointSetForest,
};

/// Builds similarity graphs by scoring submission pairs.
///
/// Obtain one through [`crate::ClusterGraphConfig::into_builder`].
///
/// # Examples
/// ```
/// use async_trait::async_trait;
/// use plagraph_core::{ClusterGraphConfig, Scorer, ScorerError, SimilarityReport, Submission};
///
/// struct Identical;
///
/// #[async_trait]
/// impl Scorer for Identical {
///     fn name(&self) -> &str { "identical" }
///     async fn score(&self, left: &str, right: &str) -> Result<SimilarityReport, ScorerError> {
///         Ok(SimilarityReport::from_score(if left == right { 100.0 } else { 0.0 }))
///     }
/// }
///
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let submissions = vec![
///     Submission::new("1", "alice", "print(1)"),
///     Submission::new("2", "bob", "print(1)"),
///     Submission::new("3", "carol", "print(2)"),
/// ];
/// let builder = ClusterGraphConfig::new().into_builder().expect("defaults are valid");
/// let graph = builder.build(&submissions, &Identical).await.expect("build succeeds");
/// assert_eq!(graph.edges().len(), 1);
/// assert_eq!(graph.clusters().len(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClusterGraphBuilder {
    threshold: f64,
    comparison_timeout: Option<Duration>,
    deadline: Option<Duration>,
}

#[derive(Clone, Copy)]
struct Deadline {
    at: Instant,
    limit: Duration,
}

enum Limit {
    Unbounded,
    Comparison(Duration),
    Deadline(Deadline),
}

impl ClusterGraphBuilder {
    pub(crate) fn new(
        threshold: f64,
        comparison_timeout: Option<Duration>,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            threshold,
            comparison_timeout,
            deadline,
        }
    }

    /// Returns the similarity percentage at which pairs are linked.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the per-comparison timeout.
    #[must_use]
    pub fn comparison_timeout(&self) -> Option<Duration> {
        self.comparison_timeout
    }

    /// Returns the overall build deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Scores submission pairs and assembles the similarity graph.
    ///
    /// With fewer than two submissions the graph lists the nodes only and the
    /// scorer is never called. Otherwise every submission lands in exactly
    /// one cluster, singletons included.
    ///
    /// # Errors
    /// Returns [`GraphError::Scorer`] when any comparison fails or yields a
    /// score outside `[0, 100]`, [`GraphError::ComparisonTimedOut`] when one
    /// call exceeds the per-comparison timeout, and
    /// [`GraphError::DeadlineExceeded`] when the build runs past its
    /// deadline. No partial graph is returned.
    #[instrument(
        name = "core.build_graph",
        err,
        skip(self, submissions, scorer),
        fields(
            scorer = %scorer.name(),
            submissions = submissions.len(),
            threshold = self.threshold,
        ),
    )]
    pub async fn build<S>(&self, submissions: &[Submission], scorer: &S) -> Result<Graph>
    where
        S: Scorer + ?Sized,
    {
        let count = submissions.len();
        if count < 2 {
            info!(
                submissions = count,
                "not enough submissions to build a graph"
            );
            return Ok(Graph::nodes_only(submissions));
        }

        let deadline = self.deadline.map(|limit| Deadline {
            at: Instant::now() + limit,
            limit,
        });
        let mut forest = DisjointSetForest::new(count);
        let mut edges = Vec::new();
        let mut stats = BuildStats::default();

        for (left_index, left) in submissions.iter().enumerate() {
            for (right_index, right) in submissions.iter().enumerate().skip(left_index + 1) {
                if forest.same_set(left_index, right_index) {
                    stats.pruned += 1;
                    debug!(
                        left = %left.id(),
                        right = %right.id(),
                        "pair already clustered, skipping comparison"
                    );
                    continue;
                }

                let report = self
                    .compare(scorer, left, right, deadline, stats.compared)
                    .await?;
                stats.compared += 1;

                if report.final_score >= self.threshold {
                    link(
                        &mut forest,
                        &mut edges,
                        submissions,
                        (left_index, right_index),
                        report,
                    );
                }
            }
        }

        let clusters: Vec<Vec<ClusterMember>> = forest
            .groups()
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|index| ClusterMember::from(&submissions[index]))
                    .collect()
            })
            .collect();
        let nodes: Vec<GraphNode> = submissions.iter().map(GraphNode::from).collect();

        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            clusters = clusters.len(),
            compared = stats.compared,
            pruned = stats.pruned,
            "graph build completed"
        );
        Ok(Graph::new(nodes, edges, clusters, stats))
    }

    #[instrument(
        name = "core.compare",
        level = "debug",
        skip_all,
        fields(left = %left.id(), right = %right.id()),
    )]
    async fn compare<S>(
        &self,
        scorer: &S,
        left: &Submission,
        right: &Submission,
        deadline: Option<Deadline>,
        compared: usize,
    ) -> Result<SimilarityReport>
    where
        S: Scorer + ?Sized,
    {
        let call = scorer.score(left.code(), right.code());
        let outcome = match self.limit(deadline, compared)? {
            Limit::Unbounded => call.await,
            Limit::Comparison(limit) => timeout(limit, call).await.map_err(|_| {
                GraphError::ComparisonTimedOut {
                    left: left.id().shared(),
                    right: right.id().shared(),
                    timeout: limit,
                }
            })?,
            Limit::Deadline(deadline) => timeout_at(deadline.at, call).await.map_err(|_| {
                GraphError::DeadlineExceeded {
                    deadline: deadline.limit,
                    compared,
                }
            })?,
        };

        let report = outcome
            .and_then(|report| {
                if (0.0..=100.0).contains(&report.final_score) {
                    Ok(report)
                } else {
                    Err(ScorerError::ScoreOutOfRange {
                        score: report.final_score,
                    })
                }
            })
            .map_err(|error| GraphError::Scorer {
                scorer: Arc::from(scorer.name()),
                left: left.id().shared(),
                right: right.id().shared(),
                error,
            })?;

        debug!(similarity = report.final_score, "pair scored");
        Ok(report)
    }

    fn limit(&self, deadline: Option<Deadline>, compared: usize) -> Result<Limit> {
        let Some(deadline) = deadline else {
            return Ok(self
                .comparison_timeout
                .map_or(Limit::Unbounded, Limit::Comparison));
        };

        let remaining = deadline.at.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(GraphError::DeadlineExceeded {
                deadline: deadline.limit,
                compared,
            });
        }

        Ok(match self.comparison_timeout {
            Some(limit) if limit <= remaining => Limit::Comparison(limit),
            _ => Limit::Deadline(deadline),
        })
    }
}

/// Records a threshold-qualifying pair.
///
/// The pruning check means the pair is never already linked here; if it is,
/// the inconsistency is logged and no duplicate edge is stored.
fn link(
    forest: &mut DisjointSetForest,
    edges: &mut Vec<GraphEdge>,
    submissions: &[Submission],
    (left_index, right_index): (usize, usize),
    report: SimilarityReport,
) {
    let left = &submissions[left_index];
    let right = &submissions[right_index];
    if forest.union(left_index, right_index) {
        edges.push(GraphEdge::new(left, right, report));
    } else {
        warn!(
            left = %left.id(),
            right = %right.id(),
            similarity = report.final_score,
            "union found pair already clustered after pruning check; edge not recorded"
        );
    }
}
