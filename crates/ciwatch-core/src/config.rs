//! Watch configuration.
//!
//! Every value has a default; `from_env` lets a post-push hook tune the
//! watcher without touching its command line, and CLI flags override both.

use std::time::Duration;

use crate::domain::{Result, WatchError};

/// Default cap on how many runs to request per query.
pub const DEFAULT_LIMIT: usize = 20;

/// Default delay between completion polls (30 seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default number of queries while waiting for the first run to show up.
pub const DEFAULT_APPEARANCE_ATTEMPTS: u32 = 60;

/// Default delay between appearance queries (2 seconds).
///
/// Scheduling latency is seconds, a full run takes minutes, so this is much
/// shorter than the completion interval.
pub const DEFAULT_APPEARANCE_DELAY_SECS: u64 = 2;

/// Configuration for one watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Commit whose runs are watched.
    pub commit: String,

    /// Maximum number of runs requested per query.
    pub limit: usize,

    /// Delay between completion polls.
    pub poll_interval: Duration,

    /// Queries made before giving up on runs appearing.
    pub appearance_attempts: u32,

    /// Delay between appearance queries.
    pub appearance_delay: Duration,
}

impl WatchConfig {
    /// Creates a config for `commit` with default values.
    pub fn new(commit: impl Into<String>) -> Self {
        WatchConfig {
            commit: commit.into(),
            limit: DEFAULT_LIMIT,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            appearance_attempts: DEFAULT_APPEARANCE_ATTEMPTS,
            appearance_delay: Duration::from_secs(DEFAULT_APPEARANCE_DELAY_SECS),
        }
    }

    /// Creates a config for `commit`, reading overrides from the environment.
    ///
    /// Reads `CIWATCH_LIMIT`, `CIWATCH_POLL_INTERVAL_SECS`,
    /// `CIWATCH_APPEARANCE_ATTEMPTS` and `CIWATCH_APPEARANCE_DELAY_SECS`.
    /// Missing or unparsable values keep their defaults.
    pub fn from_env(commit: impl Into<String>) -> Self {
        Self::from_lookup(commit, |key| std::env::var(key).ok())
    }

    /// Same as [`WatchConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(commit: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::new(commit);
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        WatchConfig {
            limit: parse("CIWATCH_LIMIT")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(defaults.limit),
            poll_interval: parse("CIWATCH_POLL_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            appearance_attempts: parse("CIWATCH_APPEARANCE_ATTEMPTS")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.appearance_attempts),
            appearance_delay: parse("CIWATCH_APPEARANCE_DELAY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.appearance_delay),
            ..defaults
        }
    }

    /// Reject values that would make the watch meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.commit.trim().is_empty() {
            return Err(WatchError::InvalidConfig("commit must not be empty".to_string()));
        }
        if self.limit == 0 {
            return Err(WatchError::InvalidConfig(
                "run limit must be at least 1".to_string(),
            ));
        }
        if self.appearance_attempts == 0 {
            return Err(WatchError::InvalidConfig(
                "appearance attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
