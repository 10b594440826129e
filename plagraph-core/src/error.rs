//! Error types for the plagraph core library.
//!
//! Defines the scorer and graph-build error enums, their stable error codes,
//! and a convenient result alias.

use std::{fmt, sync::Arc, time::Duration};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by a [`crate::Scorer`] while comparing two code texts.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScorerError {
    /// The scoring service could not be reached or the exchange failed.
    #[error("scoring service unreachable: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
    /// The scoring service answered with a non-success status.
    #[error("scoring service responded with status {status}")]
    Status {
        /// HTTP-style status code returned by the service.
        status: u16,
    },
    /// The scoring service returned a payload that could not be decoded.
    #[error("scoring service returned a malformed payload: {message}")]
    MalformedResponse {
        /// Description of the decoding failure.
        message: String,
    },
    /// The returned similarity is not a finite percentage in `[0, 100]`.
    #[error("similarity score {score} is not a percentage in [0, 100]")]
    ScoreOutOfRange {
        /// Score returned by the service.
        score: f64,
    },
    /// One of the compared code texts was empty.
    #[error("cannot score an empty code text")]
    EmptyCode,
}

define_error_codes! {
    /// Stable codes describing [`ScorerError`] variants.
    enum ScorerErrorCode for ScorerError {
        /// The scoring service could not be reached.
        Transport => Transport { .. } => "SCORER_TRANSPORT",
        /// The scoring service answered with a non-success status.
        Status => Status { .. } => "SCORER_STATUS",
        /// The scoring service returned a malformed payload.
        MalformedResponse => MalformedResponse { .. } => "SCORER_MALFORMED_RESPONSE",
        /// The returned similarity fell outside `[0, 100]`.
        ScoreOutOfRange => ScoreOutOfRange { .. } => "SCORER_SCORE_OUT_OF_RANGE",
        /// One of the compared code texts was empty.
        EmptyCode => EmptyCode => "SCORER_EMPTY_CODE",
    }
}

/// Error type produced when configuring or running [`crate::ClusterGraphBuilder`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// Threshold must be a finite percentage.
    #[error("threshold must be a percentage in [0, 100] (got {got})")]
    InvalidThreshold {
        /// The rejected threshold.
        got: f64,
    },
    /// A configured timeout was zero.
    #[error("{setting} must be greater than zero")]
    InvalidTimeout {
        /// Name of the offending setting.
        setting: &'static str,
    },
    /// The scorer failed while comparing a pair of submissions.
    #[error("scorer `{scorer}` failed comparing `{left}` with `{right}`: {error}")]
    Scorer {
        /// Name reported by the scorer.
        scorer: Arc<str>,
        /// Identifier of the earlier submission in the pair.
        left: Arc<str>,
        /// Identifier of the later submission in the pair.
        right: Arc<str>,
        #[source]
        /// Underlying scorer error.
        error: ScorerError,
    },
    /// A single comparison did not finish within the per-comparison timeout.
    #[error("comparing `{left}` with `{right}` exceeded {timeout:?}")]
    ComparisonTimedOut {
        /// Identifier of the earlier submission in the pair.
        left: Arc<str>,
        /// Identifier of the later submission in the pair.
        right: Arc<str>,
        /// The per-comparison timeout that elapsed.
        timeout: Duration,
    },
    /// The build as a whole ran past its deadline.
    #[error("graph build exceeded its {deadline:?} deadline after {compared} comparisons")]
    DeadlineExceeded {
        /// The configured overall deadline.
        deadline: Duration,
        /// Comparisons completed before the deadline elapsed.
        compared: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// Threshold must be a finite percentage.
        InvalidThreshold => InvalidThreshold { .. } => "GRAPH_INVALID_THRESHOLD",
        /// A configured timeout was zero.
        InvalidTimeout => InvalidTimeout { .. } => "GRAPH_INVALID_TIMEOUT",
        /// The scorer failed while comparing a pair.
        ScorerFailure => Scorer { .. } => "GRAPH_SCORER_FAILURE",
        /// A single comparison timed out.
        ComparisonTimedOut => ComparisonTimedOut { .. } => "GRAPH_COMPARISON_TIMED_OUT",
        /// The overall deadline elapsed.
        DeadlineExceeded => DeadlineExceeded { .. } => "GRAPH_DEADLINE_EXCEEDED",
    }
}

impl GraphError {
    /// Retrieve the inner [`ScorerErrorCode`] when the error originated in a [`crate::Scorer`].
    pub const fn scorer_code(&self) -> Option<ScorerErrorCode> {
        match self {
            Self::Scorer { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GraphError>;
