//! Appearance phase: wait until the CI system has scheduled at least one run.

use std::time::Duration;

use crate::domain::Snapshot;
use crate::obs;
use crate::source::StatusSource;

/// Result of waiting for runs to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Appearance {
    /// A query returned at least one run.
    Found {
        snapshot: Snapshot,
        /// 1-based attempt that saw the runs.
        attempts: u32,
    },
    /// Every attempt came back empty (or failed).
    NotFound { attempts: u32 },
}

/// Query `source` until it reports a run for `commit`, at most `max_attempts` times.
///
/// Sleeps `poll_delay` between attempts but not after the last one. Failed
/// queries count as empty attempts and never end the wait early.
pub async fn wait_for_appearance(
    source: &dyn StatusSource,
    commit: &str,
    limit: usize,
    max_attempts: u32,
    poll_delay: Duration,
) -> Appearance {
    for attempt in 1..=max_attempts {
        match source.fetch(commit, limit).await {
            Ok(runs) if !runs.is_empty() => {
                obs::emit_appeared(attempt, runs.len());
                return Appearance::Found {
                    snapshot: Snapshot::capture(commit, runs),
                    attempts: attempt,
                };
            }
            Ok(_) => obs::emit_appearance_attempt(attempt, max_attempts),
            Err(e) => obs::emit_query_failed("appearance", &e),
        }

        if attempt < max_attempts {
            tokio::time::sleep(poll_delay).await;
        }
    }

    obs::emit_not_found(max_attempts);
    Appearance::NotFound {
        attempts: max_attempts,
    }
}
