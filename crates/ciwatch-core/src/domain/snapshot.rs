//! Point-in-time view of every run known for a commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::run::{RunId, RunRecord};

/// Runs for one commit as observed at one poll instant.
///
/// Snapshots are never mutated once captured; reconciling with an earlier
/// snapshot produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    commit: String,
    captured_at: DateTime<Utc>,
    runs: Vec<RunRecord>,
}

/// Differences found when reconciling a fresh snapshot against the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Terminal runs missing from the fresh query, carried forward.
    pub disappeared: Vec<RunId>,

    /// Non-terminal runs missing from the fresh query, dropped from the merge.
    pub dropped: Vec<RunId>,

    /// Runs that were terminal before and are non-terminal now.
    pub regressed: Vec<RunId>,
}

impl Snapshot {
    /// Capture a snapshot now, keeping the order the backend returned.
    pub fn capture(commit: impl Into<String>, runs: Vec<RunRecord>) -> Self {
        Self::captured_at(commit, Utc::now(), runs)
    }

    pub fn captured_at(
        commit: impl Into<String>,
        captured_at: DateTime<Utc>,
        runs: Vec<RunRecord>,
    ) -> Self {
        Self {
            commit: commit.into(),
            captured_at,
            runs,
        }
    }

    pub fn commit(&self) -> &str {
        &self.commit
    }

    pub fn captured_at_time(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// True when the snapshot is non-empty and every run is terminal.
    pub fn all_terminal(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(RunRecord::is_terminal)
    }

    pub fn pending_count(&self) -> usize {
        self.runs.iter().filter(|r| !r.is_terminal()).count()
    }

    /// Merge this fresh snapshot with the previous one.
    ///
    /// Terminal runs that vanished from the backend response keep their last
    /// known state and are appended after the fresh runs, so a finished
    /// failure still reaches the verdict. Vanished runs that were still
    /// pending are dropped: a run pushed out of the query window must not
    /// hold the watch open. Runs that went from terminal back to
    /// non-terminal are reported but the fresh state wins.
    pub fn reconcile(self, previous: &Snapshot) -> (Snapshot, Reconciliation) {
        let mut report = Reconciliation::default();

        for run in &self.runs {
            let was_terminal = previous
                .runs
                .iter()
                .any(|p| p.id == run.id && p.is_terminal());
            if was_terminal && !run.is_terminal() {
                report.regressed.push(run.id.clone());
            }
        }

        let seen: HashSet<&RunId> = self.runs.iter().map(|r| &r.id).collect();
        let (carried, dropped): (Vec<&RunRecord>, Vec<&RunRecord>) = previous
            .runs
            .iter()
            .filter(|p| !seen.contains(&p.id))
            .partition(|p| p.is_terminal());
        report.disappeared = carried.iter().map(|r| r.id.clone()).collect();
        report.dropped = dropped.iter().map(|r| r.id.clone()).collect();

        let mut runs = self.runs;
        runs.extend(carried.into_iter().cloned());

        (
            Snapshot {
                commit: self.commit,
                captured_at: self.captured_at,
                runs,
            },
            report,
        )
    }
}
