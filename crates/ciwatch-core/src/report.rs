//! Human-readable rendering of progress and verdicts.
//!
//! Everything here returns text; the binary decides where to print it.

use std::fmt::Write as _;

use crate::domain::Snapshot;
use crate::verdict::Verdict;
use crate::watch::WatchOutcome;

/// Shown in place of a conclusion for runs that have not finished.
pub const NO_CONCLUSION: &str = "-";

/// One progress block: a timestamp marker, then status, conclusion and name per run.
pub fn render_progress(snapshot: &Snapshot) -> String {
    let mut out = format!(
        "[{}]\n",
        snapshot.captured_at_time().format("%Y-%m-%d %H:%M:%S UTC")
    );
    if snapshot.is_empty() {
        out.push_str("  (no runs reported)\n");
    }
    for run in snapshot.runs() {
        let conclusion = run
            .conclusion
            .as_ref()
            .map(|c| c.as_str())
            .unwrap_or(NO_CONCLUSION);
        let _ = writeln!(out, "  {:<12} {:<12} {}", run.status.as_str(), conclusion, run.name);
    }
    out
}

/// Final verdict: a confirmation line, or one block per non-successful run.
pub fn render_verdict(verdict: &Verdict, total_runs: usize) -> String {
    if verdict.passed() {
        return format!("All {total_runs} run(s) completed successfully.\n");
    }

    let mut out = format!(
        "{} of {} run(s) did not succeed:\n",
        verdict.non_successful.len(),
        total_runs
    );
    for run in &verdict.non_successful {
        let conclusion = run
            .conclusion
            .as_ref()
            .map(|c| c.as_str())
            .unwrap_or(NO_CONCLUSION);
        let _ = write!(
            out,
            "\n  {}\n    conclusion: {}\n    url: {}\n",
            run.name, conclusion, run.url
        );
    }
    out
}

/// Closing text for any watch outcome.
pub fn render_outcome(outcome: &WatchOutcome) -> String {
    match outcome {
        WatchOutcome::NotFound { commit, attempts } => format!(
            "No CI runs found for commit {commit} after {attempts} attempt(s).\n"
        ),
        WatchOutcome::Finished {
            verdict, snapshot, ..
        } => render_verdict(verdict, snapshot.len()),
    }
}
