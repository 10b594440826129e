//! Output types for a completed graph build.
//!
//! The serialised shape is `{nodes, edges, clusters}`, matching what the
//! presentation layer renders.

use serde::{Deserialize, Serialize};

use crate::{
    scorer::{SimilarityReport, SubMetrics},
    submission::{Submission, SubmissionId},
};

/// One vertex of the similarity graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Display label, the author's name.
    pub label: String,
}

impl From<&Submission> for GraphNode {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id().clone(),
            label: submission.name().to_owned(),
        }
    }
}

/// A threshold-qualifying link between two submissions.
///
/// `from` is always the submission that precedes `to` in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Earlier submission of the pair.
    pub from: SubmissionId,
    /// Later submission of the pair.
    pub to: SubmissionId,
    /// Final similarity percentage.
    pub similarity: f64,
    /// Sub-metrics forwarded from the scorer, when it reported any.
    #[serde(default, skip_serializing_if = "SubMetrics::is_empty")]
    pub metrics: SubMetrics,
    /// Classification forwarded from the scorer, when it reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plagiarised: Option<bool>,
}

impl GraphEdge {
    pub(crate) fn new(from: &Submission, to: &Submission, report: SimilarityReport) -> Self {
        Self {
            from: from.id().clone(),
            to: to.id().clone(),
            similarity: report.final_score,
            metrics: report.metrics,
            plagiarised: report.plagiarised,
        }
    }
}

/// Member entry of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Author name.
    pub name: String,
}

impl From<&Submission> for ClusterMember {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id().clone(),
            name: submission.name().to_owned(),
        }
    }
}

/// Counters describing how much scoring work a build performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Pairs sent to the scorer.
    pub compared: usize,
    /// Pairs skipped because both sides already shared a cluster.
    pub pruned: usize,
}

/// Similarity graph over the submissions of one test.
///
/// # Examples
/// ```
/// use plagraph_core::Graph;
///
/// let graph = Graph::default();
/// assert!(graph.nodes().is_empty());
/// assert!(graph.edges().is_empty());
/// assert!(graph.clusters().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    clusters: Vec<Vec<ClusterMember>>,
    #[serde(skip)]
    stats: BuildStats,
}

impl Graph {
    pub(crate) fn new(
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        clusters: Vec<Vec<ClusterMember>>,
        stats: BuildStats,
    ) -> Self {
        Self {
            nodes,
            edges,
            clusters,
            stats,
        }
    }

    /// Graph with nodes only, produced when there is nothing to compare.
    pub(crate) fn nodes_only(submissions: &[Submission]) -> Self {
        Self {
            nodes: submissions.iter().map(GraphNode::from).collect(),
            ..Self::default()
        }
    }

    /// Returns one node per submission in input order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Returns the recorded edges in comparison order.
    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Returns the clusters in first-encounter order.
    #[must_use]
    pub fn clusters(&self) -> &[Vec<ClusterMember>] {
        &self.clusters
    }

    /// Returns the scoring counters for the build that produced this graph.
    #[must_use]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }
}
