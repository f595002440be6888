//! Structured observability hooks for watch sessions.
//!
//! Every phase transition is emitted as a tracing event with an `event`
//! field, so JSON logs can be filtered on e.g. `event=watch.cycle`.

use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::RunId;

/// RAII guard that enters a session-scoped span for the duration of a watch.
///
/// # Example
///
/// ```ignore
/// let span = WatchSpan::enter("3f2a...");
/// // every event logged now carries session_id and commit
/// ```
pub struct WatchSpan {
    session_id: Uuid,
    _span: tracing::span::EnteredSpan,
}

impl WatchSpan {
    /// Create and enter a span tagged with a fresh session id and the commit.
    pub fn enter(commit: &str) -> Self {
        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("ciwatch.session", session_id = %session_id, commit = %commit);
        Self {
            session_id,
            _span: span.entered(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Emit event: watch started.
pub fn emit_watch_started(commit: &str, limit: usize, poll_interval: Duration) {
    info!(
        event = "watch.started",
        commit = %commit,
        limit = limit,
        poll_interval_secs = poll_interval.as_secs(),
    );
}

/// Emit event: one appearance query came back empty.
pub fn emit_appearance_attempt(attempt: u32, max_attempts: u32) {
    debug!(event = "watch.appearance_attempt", attempt = attempt, max_attempts = max_attempts);
}

/// Emit event: first runs showed up.
pub fn emit_appeared(attempt: u32, runs: usize) {
    info!(event = "watch.appeared", attempt = attempt, runs = runs);
}

/// Emit event: no runs within the appearance budget.
pub fn emit_not_found(attempts: u32) {
    warn!(event = "watch.not_found", attempts = attempts);
}

/// Emit event: one completion cycle evaluated.
pub fn emit_cycle(cycle: u32, runs: usize, pending: usize) {
    info!(event = "watch.cycle", cycle = cycle, runs = runs, pending = pending);
}

/// Emit event: a status query failed and was treated as no new information.
pub fn emit_query_failed(phase: &str, error: &dyn std::fmt::Display) {
    warn!(event = "watch.query_failed", phase = %phase, error = %error);
}

/// Emit event: a run left the backend response.
///
/// `carried` is true when the run was terminal and kept at its last state,
/// false when it was still pending and dropped.
pub fn emit_run_disappeared(run_id: &RunId, carried: bool) {
    warn!(event = "watch.run_disappeared", run_id = %run_id, carried = carried);
}

/// Emit event: a terminal run was reported as non-terminal again.
pub fn emit_status_regressed(run_id: &RunId) {
    warn!(event = "watch.status_regressed", run_id = %run_id);
}

/// Emit event: session finished with the given outcome and exit code.
pub fn emit_watch_finished(outcome: &str, exit_code: i32, non_successful: usize) {
    info!(
        event = "watch.finished",
        outcome = %outcome,
        exit_code = exit_code,
        non_successful = non_successful,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_span_has_unique_session_ids() {
        let a = WatchSpan::enter("abc");
        let a_id = a.session_id();
        drop(a);
        let b = WatchSpan::enter("abc");
        assert_ne!(a_id, b.session_id());
    }
}
