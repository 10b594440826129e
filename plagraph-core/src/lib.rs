//! Plagraph core library.
//!
//! Builds a similarity graph over the code submissions of one test: pairs are
//! scored by an external [`Scorer`], pairs meeting the threshold are linked
//! through a [`DisjointSetForest`], and the result is emitted as nodes, edges
//! and clusters.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod error;
mod graph;
mod graph_builder;
mod scorer;
mod submission;
#[cfg(test)]
mod test_utils;
mod union_find;

pub use crate::{
    builder::{ClusterGraphConfig, DEFAULT_COMPARISON_TIMEOUT, DEFAULT_THRESHOLD},
    error::{GraphError, GraphErrorCode, Result, ScorerError, ScorerErrorCode},
    graph::{BuildStats, ClusterMember, Graph, GraphEdge, GraphNode},
    graph_builder::ClusterGraphBuilder,
    scorer::{Scorer, SimilarityReport, SubMetrics},
    submission::{Submission, SubmissionId},
    union_find::DisjointSetForest,
};
