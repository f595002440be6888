//! Completion phase: poll until every known run is terminal.
//!
//! The loop has no iteration cap and no deadline. CI duration is controlled
//! by the remote system; a caller that wants a deadline terminates the process.

use std::time::Duration;

use crate::domain::Snapshot;
use crate::obs;
use crate::source::StatusSource;

/// Receives one progress report per completion cycle.
pub trait ProgressSink {
    /// Called after every cycle, in cycle order, with that cycle's snapshot.
    fn on_cycle(&mut self, cycle: u32, snapshot: &Snapshot);
}

impl<F> ProgressSink for F
where
    F: FnMut(u32, &Snapshot),
{
    fn on_cycle(&mut self, cycle: u32, snapshot: &Snapshot) {
        self(cycle, snapshot)
    }
}

/// Sink that drops every report.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_cycle(&mut self, _cycle: u32, _snapshot: &Snapshot) {}
}

/// Final state of the completion phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Snapshot of the cycle on which every run was terminal.
    pub snapshot: Snapshot,

    /// Number of cycles executed, including the final one.
    pub cycles: u32,
}

/// Poll `source` every `poll_interval` until all runs for `commit` are terminal.
///
/// `seed` is the last snapshot seen before polling started (normally the one
/// from the appearance phase). Each cycle reconciles the fresh query against
/// the previous snapshot: terminal runs missing from the response keep their
/// last known state, pending ones are dropped, and a failed query reuses the
/// previous runs unchanged.
pub async fn poll_until_complete(
    source: &dyn StatusSource,
    commit: &str,
    limit: usize,
    poll_interval: Duration,
    seed: Option<Snapshot>,
    progress: &mut dyn ProgressSink,
) -> Completion {
    let mut latest = seed;
    let mut cycle: u32 = 0;

    loop {
        cycle += 1;
        let current = match source.fetch(commit, limit).await {
            Ok(runs) => {
                let fresh = Snapshot::capture(commit, runs);
                match &latest {
                    Some(previous) => {
                        let (merged, report) = fresh.reconcile(previous);
                        for id in &report.disappeared {
                            obs::emit_run_disappeared(id, true);
                        }
                        for id in &report.dropped {
                            obs::emit_run_disappeared(id, false);
                        }
                        report.regressed.iter().for_each(obs::emit_status_regressed);
                        merged
                    }
                    None => fresh,
                }
            }
            Err(e) => {
                obs::emit_query_failed("completion", &e);
                let runs = latest.as_ref().map(|s| s.runs().to_vec()).unwrap_or_default();
                Snapshot::capture(commit, runs)
            }
        };

        progress.on_cycle(cycle, &current);
        obs::emit_cycle(cycle, current.len(), current.pending_count());

        if current.all_terminal() {
            return Completion {
                snapshot: current,
                cycles: cycle,
            };
        }

        latest = Some(current);
        tokio::time::sleep(poll_interval).await;
    }
}
