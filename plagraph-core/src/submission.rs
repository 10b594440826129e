//! Submission records compared by the graph builder.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a submission.
///
/// # Examples
/// ```
/// use plagraph_core::SubmissionId;
///
/// let id = SubmissionId::new("64f1c0");
/// assert_eq!(id.as_str(), "64f1c0");
/// assert_eq!(id.to_string(), "64f1c0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Arc<str>);

impl SubmissionId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn shared(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SubmissionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One participant's code for a test.
///
/// Submissions are read-only for the duration of a graph build.
///
/// # Examples
/// ```
/// use plagraph_core::Submission;
///
/// let submission = Submission::new("a1", "alice", "print(1)");
/// assert_eq!(submission.id().as_str(), "a1");
/// assert_eq!(submission.name(), "alice");
/// assert_eq!(submission.code(), "print(1)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    id: SubmissionId,
    name: String,
    code: String,
}

impl Submission {
    /// Creates a submission from its identifier, display name and code.
    #[must_use]
    pub fn new(id: impl Into<SubmissionId>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: code.into(),
        }
    }

    /// Returns the submission identifier.
    #[must_use]
    pub fn id(&self) -> &SubmissionId {
        &self.id
    }

    /// Returns the display name of the author.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the submitted source code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}
