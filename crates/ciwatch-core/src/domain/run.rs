//! Observed CI runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque run identifier, stable across polls within one watch session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RunId {
    fn from(id: u64) -> Self {
        RunId(id.to_string())
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        RunId(id.to_string())
    }
}

/// Lifecycle state of a run.
///
/// Backends use slightly different vocabularies; anything that is not
/// `completed` is kept verbatim in `Other` and counts as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Other(String),
}

impl RunStatus {
    /// Whether no further transition is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Other(s) => s,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            _ => RunStatus::Other(s),
        }
    }
}

impl From<&str> for RunStatus {
    fn from(s: &str) -> Self {
        RunStatus::from(s.to_string())
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a terminated run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    TimedOut,
    Neutral,
    Skipped,
    Other(String),
}

impl Conclusion {
    pub fn is_success(&self) -> bool {
        matches!(self, Conclusion::Success)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Cancelled => "cancelled",
            Conclusion::TimedOut => "timed_out",
            Conclusion::Neutral => "neutral",
            Conclusion::Skipped => "skipped",
            Conclusion::Other(s) => s,
        }
    }

    /// Parse a backend conclusion, mapping empty strings to `None`.
    ///
    /// `gh run list` reports `""` rather than `null` for unfinished runs.
    pub fn parse_optional(raw: Option<&str>) -> Option<Conclusion> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Conclusion::from)
    }
}

impl From<String> for Conclusion {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "cancelled" => Conclusion::Cancelled,
            "timed_out" => Conclusion::TimedOut,
            "neutral" => Conclusion::Neutral,
            "skipped" => Conclusion::Skipped,
            _ => Conclusion::Other(s),
        }
    }
}

impl From<&str> for Conclusion {
    fn from(s: &str) -> Self {
        Conclusion::from(s.to_string())
    }
}

impl From<Conclusion> for String {
    fn from(conclusion: Conclusion) -> Self {
        conclusion.as_str().to_string()
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed unit of CI execution for a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique per run, stable across polls.
    pub id: RunId,

    /// Current lifecycle state.
    pub status: RunStatus,

    /// Only meaningful once `status` is terminal.
    pub conclusion: Option<Conclusion>,

    /// Workflow name, display only.
    pub name: String,

    /// Link to the run, display only.
    pub url: String,
}

impl RunRecord {
    pub fn new(
        id: impl Into<RunId>,
        status: RunStatus,
        conclusion: Option<Conclusion>,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            conclusion,
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the run concluded with `success`.
    ///
    /// A missing conclusion counts as unsuccessful. Only meaningful once the
    /// run is terminal.
    pub fn is_successful(&self) -> bool {
        self.conclusion.as_ref().is_some_and(Conclusion::is_success)
    }
}
