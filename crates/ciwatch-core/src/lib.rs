//! ciwatch core library
//!
//! Watches the CI runs attached to one commit until every run is terminal,
//! then classifies the result:
//! - `waiter`: bounded wait for the first run to be scheduled
//! - `poller`: fixed-interval polling until all runs are terminal
//! - `verdict`: success/failure classification and exit codes
//! - `watch`: the three phases chained into one session

pub mod config;
pub mod domain;
pub mod fakes;
pub mod git;
pub mod obs;
pub mod poller;
pub mod report;
pub mod source;
pub mod telemetry;
pub mod verdict;
pub mod waiter;
pub mod watch;

pub use config::WatchConfig;
pub use domain::{
    Conclusion, Reconciliation, Result, RunId, RunRecord, RunStatus, Snapshot, WatchError,
};
pub use git::{capture_head_sha, resolve_commit};
pub use obs::WatchSpan;
pub use poller::{poll_until_complete, Completion, NoProgress, ProgressSink};
pub use report::{render_outcome, render_progress, render_verdict};
pub use source::{GhCliSource, GithubApiConfig, GithubApiSource, StatusSource};
pub use telemetry::{default_level, init_tracing};
pub use verdict::{
    summarize, Outcome, Verdict, EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_SETUP_ERROR, EXIT_SUCCESS,
};
pub use waiter::{wait_for_appearance, Appearance};
pub use watch::{run_watch, WatchOutcome, WatchReport};

/// ciwatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
