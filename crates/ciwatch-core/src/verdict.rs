//! Verdict evaluation for a final snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::{RunRecord, Snapshot};

/// Process exit code: every run succeeded.
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code: at least one run finished without success.
pub const EXIT_FAILURE: i32 = 1;

/// Process exit code: no run appeared within the appearance budget.
pub const EXIT_NOT_FOUND: i32 = 2;

/// Process exit code: the watch could not start (bad config, unknown commit).
pub const EXIT_SETUP_ERROR: i32 = 3;

/// Overall classification of a finished watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => EXIT_SUCCESS,
            Outcome::Failure => EXIT_FAILURE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Verdict for a terminal snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// `Success` iff `non_successful` is empty.
    pub outcome: Outcome,

    /// Runs whose conclusion is anything but `success`, in snapshot order.
    pub non_successful: Vec<RunRecord>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}

/// Classify a final snapshot.
///
/// A run counts as non-successful when its conclusion is anything other than
/// `success`, including a missing conclusion. Pure: the same snapshot always
/// yields the same verdict.
pub fn summarize(snapshot: &Snapshot) -> Verdict {
    let non_successful: Vec<RunRecord> = snapshot
        .runs()
        .iter()
        .filter(|run| !run.is_successful())
        .cloned()
        .collect();

    let outcome = if non_successful.is_empty() {
        Outcome::Success
    } else {
        Outcome::Failure
    };

    Verdict {
        outcome,
        non_successful,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Conclusion, RunStatus};

    fn completed(id: &str, conclusion: Option<Conclusion>, name: &str, url: &str) -> RunRecord {
        RunRecord::new(id, RunStatus::Completed, conclusion, name, url)
    }

    #[test]
    fn test_single_success() {
        let snap = Snapshot::capture(
            "abc",
            vec![completed("1", Some(Conclusion::Success), "build", "")],
        );
        let verdict = summarize(&snap);
        assert_eq!(verdict.outcome, Outcome::Success);
        assert!(verdict.non_successful.is_empty());
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn test_one_failure_listed_with_details() {
        let snap = Snapshot::capture(
            "abc",
            vec![
                completed("1", Some(Conclusion::Success), "build", ""),
                completed("2", Some(Conclusion::Failure), "lint", "https://x/y"),
            ],
        );
        let verdict = summarize(&snap);

        assert_eq!(verdict.outcome, Outcome::Failure);
        assert_eq!(verdict.exit_code(), 1);
        assert_eq!(verdict.non_successful.len(), 1);
        let failed = &verdict.non_successful[0];
        assert_eq!(failed.name, "lint");
        assert_eq!(failed.conclusion, Some(Conclusion::Failure));
        assert_eq!(failed.url, "https://x/y");
    }

    #[test]
    fn test_counts_every_non_success_conclusion() {
        let snap = Snapshot::capture(
            "abc",
            vec![
                completed("1", Some(Conclusion::Success), "a", ""),
                completed("2", Some(Conclusion::Cancelled), "b", ""),
                completed("3", Some(Conclusion::Skipped), "c", ""),
                completed("4", None, "d", ""),
                completed("5", Some(Conclusion::Success), "e", ""),
                completed("6", Some(Conclusion::TimedOut), "f", ""),
            ],
        );
        let verdict = summarize(&snap);
        let names: Vec<&str> = verdict.non_successful.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "d", "f"]);
        assert!(!verdict.passed());
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let snap = Snapshot::capture(
            "abc",
            vec![
                completed("1", Some(Conclusion::Neutral), "a", "u1"),
                completed("2", Some(Conclusion::Success), "b", "u2"),
            ],
        );
        assert_eq!(summarize(&snap), summarize(&snap));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_SETUP_ERROR];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
