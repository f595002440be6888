//! In-memory status source for tests
//!
//! `ScriptedSource` replays a fixed sequence of responses and counts how
//! many times it was queried, so the watch loops can be exercised without
//! a network or the `gh` binary.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Result, RunRecord, WatchError};
use crate::source::StatusSource;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Runs(Vec<RunRecord>),
    /// Simulates a backend that exited non-zero.
    Fail(String),
}

#[derive(Debug, Default)]
struct ScriptState {
    pending: VecDeque<ScriptedResponse>,
    last: Option<ScriptedResponse>,
    calls: usize,
    commits: Vec<String>,
    limits: Vec<usize>,
}

/// Status source replaying scripted responses in order.
///
/// Once the script is exhausted the final response is repeated; an empty
/// script answers with no runs forever.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    state: Mutex<ScriptState>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                pending: responses.into(),
                ..ScriptState::default()
            }),
        }
    }

    /// Script made only of run lists.
    pub fn from_runs(cycles: Vec<Vec<RunRecord>>) -> Self {
        Self::new(cycles.into_iter().map(ScriptedResponse::Runs).collect())
    }

    /// A backend that never reports any run.
    pub fn always_empty() -> Self {
        Self::default()
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    /// Commits passed to `fetch`, in call order.
    pub fn commits(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    /// Limits passed to `fetch`, in call order.
    pub fn limits(&self) -> Vec<usize> {
        self.state.lock().unwrap().limits.clone()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, commit: &str, limit: usize) -> Result<Vec<RunRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.commits.push(commit.to_string());
        state.limits.push(limit);

        let response = match state.pending.pop_front() {
            Some(next) => {
                state.last = Some(next.clone());
                Some(next)
            }
            None => state.last.clone(),
        };

        match response {
            Some(ScriptedResponse::Runs(mut runs)) => {
                runs.truncate(limit);
                Ok(runs)
            }
            Some(ScriptedResponse::Fail(stderr)) => Err(WatchError::SourceFailed {
                code: Some(1),
                stderr,
            }),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RunStatus;

    fn queued(id: &str) -> RunRecord {
        RunRecord::new(id, RunStatus::Queued, None, "ci", "")
    }

    #[tokio::test]
    async fn test_replays_in_order_then_repeats_last() {
        let source = ScriptedSource::new(vec![
            ScriptedResponse::Runs(vec![]),
            ScriptedResponse::Fail("boom".to_string()),
            ScriptedResponse::Runs(vec![queued("1")]),
        ]);

        assert!(source.fetch("abc", 10).await.unwrap().is_empty());
        assert!(source.fetch("abc", 10).await.is_err());
        assert_eq!(source.fetch("abc", 10).await.unwrap().len(), 1);
        assert_eq!(source.fetch("abc", 10).await.unwrap().len(), 1);
        assert_eq!(source.calls(), 4);
        assert_eq!(source.commits(), vec!["abc"; 4]);
    }

    #[tokio::test]
    async fn test_respects_limit() {
        let source = ScriptedSource::from_runs(vec![vec![queued("1"), queued("2"), queued("3")]]);
        let runs = source.fetch("abc", 2).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(source.limits(), vec![2]);
    }

    #[tokio::test]
    async fn test_always_empty() {
        let source = ScriptedSource::always_empty();
        for _ in 0..3 {
            assert!(source.fetch("abc", 5).await.unwrap().is_empty());
        }
        assert_eq!(source.calls(), 3);
    }
}
