//! Watch session: appearance wait, completion polling, verdict.
//!
//! Transitions only move forward:
//! `WaitingForAppearance -> {NotFound | Polling} -> AllTerminal -> Verdict`.

use serde::Serialize;

use crate::config::WatchConfig;
use crate::domain::{RunRecord, Snapshot};
use crate::obs;
use crate::poller::{poll_until_complete, ProgressSink};
use crate::source::StatusSource;
use crate::verdict::{summarize, Verdict, EXIT_NOT_FOUND};
use crate::waiter::{wait_for_appearance, Appearance};

/// The single terminal outcome of a watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// No run appeared within the appearance budget. No polling happened.
    NotFound { commit: String, attempts: u32 },

    /// Every run reached a terminal state.
    Finished {
        verdict: Verdict,
        snapshot: Snapshot,
        /// Completion cycles executed.
        cycles: u32,
    },
}

impl WatchOutcome {
    /// 0 success, 1 failure, 2 nothing appeared.
    pub fn exit_code(&self) -> i32 {
        match self {
            WatchOutcome::NotFound { .. } => EXIT_NOT_FOUND,
            WatchOutcome::Finished { verdict, .. } => verdict.exit_code(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WatchOutcome::NotFound { .. } => "not_found",
            WatchOutcome::Finished { verdict, .. } => verdict.outcome.as_str(),
        }
    }

    /// Machine-readable summary of this outcome.
    pub fn to_report(&self) -> WatchReport {
        match self {
            WatchOutcome::NotFound { commit, attempts } => WatchReport {
                commit: commit.clone(),
                outcome: self.label(),
                exit_code: self.exit_code(),
                appearance_attempts: Some(*attempts),
                cycles: 0,
                runs: Vec::new(),
                non_successful: Vec::new(),
            },
            WatchOutcome::Finished {
                verdict,
                snapshot,
                cycles,
            } => WatchReport {
                commit: snapshot.commit().to_string(),
                outcome: self.label(),
                exit_code: self.exit_code(),
                appearance_attempts: None,
                cycles: *cycles,
                runs: snapshot.runs().to_vec(),
                non_successful: verdict.non_successful.clone(),
            },
        }
    }
}

/// JSON document printed by `ciwatch --json`.
#[derive(Debug, Clone, Serialize)]
pub struct WatchReport {
    pub commit: String,
    pub outcome: &'static str,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance_attempts: Option<u32>,
    pub cycles: u32,
    pub runs: Vec<RunRecord>,
    pub non_successful: Vec<RunRecord>,
}

/// Run one full watch session for `config.commit`.
///
/// Never returns an error: query failures are absorbed by both phases, and
/// the session always ends in exactly one [`WatchOutcome`].
pub async fn run_watch(
    source: &dyn StatusSource,
    config: &WatchConfig,
    progress: &mut dyn ProgressSink,
) -> WatchOutcome {
    let commit = config.commit.as_str();
    obs::emit_watch_started(commit, config.limit, config.poll_interval);

    let appearance = wait_for_appearance(
        source,
        commit,
        config.limit,
        config.appearance_attempts,
        config.appearance_delay,
    )
    .await;

    let seed = match appearance {
        Appearance::Found { snapshot, .. } => snapshot,
        Appearance::NotFound { attempts } => {
            let outcome = WatchOutcome::NotFound {
                commit: commit.to_string(),
                attempts,
            };
            obs::emit_watch_finished(outcome.label(), outcome.exit_code(), 0);
            return outcome;
        }
    };

    let completion = poll_until_complete(
        source,
        commit,
        config.limit,
        config.poll_interval,
        Some(seed),
        progress,
    )
    .await;

    let verdict = summarize(&completion.snapshot);
    let failed = verdict.non_successful.len();
    let outcome = WatchOutcome::Finished {
        verdict,
        snapshot: completion.snapshot,
        cycles: completion.cycles,
    };
    obs::emit_watch_finished(outcome.label(), outcome.exit_code(), failed);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Conclusion, RunStatus};
    use crate::fakes::ScriptedSource;
    use crate::poller::NoProgress;
    use std::time::Duration;

    fn config() -> WatchConfig {
        WatchConfig {
            appearance_attempts: 3,
            appearance_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(5),
            ..WatchConfig::new("abc")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_report() {
        let source = ScriptedSource::always_empty();
        let outcome = run_watch(&source, &config(), &mut NoProgress).await;

        assert_eq!(outcome.exit_code(), 2);
        let report = outcome.to_report();
        assert_eq!(report.outcome, "not_found");
        assert_eq!(report.appearance_attempts, Some(3));
        assert_eq!(report.cycles, 0);
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["exit_code"], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_report_lists_failures() {
        let failed = RunRecord::new(
            "2",
            RunStatus::Completed,
            Some(Conclusion::Failure),
            "lint",
            "https://x/y",
        );
        let ok = RunRecord::new("1", RunStatus::Completed, Some(Conclusion::Success), "build", "");
        let source = ScriptedSource::from_runs(vec![vec![ok, failed]]);

        let outcome = run_watch(&source, &config(), &mut NoProgress).await;
        let report = outcome.to_report();

        assert_eq!(report.outcome, "failure");
        assert_eq!(report.exit_code, 1);
        assert_eq!(report.runs.len(), 2);
        assert_eq!(report.non_successful[0].name, "lint");
        let json = serde_json::to_value(&report).expect("serialize");
        assert!(json.get("appearance_attempts").is_none());
    }
}
