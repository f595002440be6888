//! Status backends that report the CI runs attached to a commit.
//!
//! The watch loops only see the [`StatusSource`] trait, so tests can swap in
//! the scripted fake from [`crate::fakes`] instead of a live backend.

use async_trait::async_trait;

use crate::domain::{Result, RunRecord};

pub mod api;
pub mod gh;

pub use api::{GithubApiConfig, GithubApiSource};
pub use gh::GhCliSource;

/// Read-only query for the runs of a commit.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Return at most `limit` runs for `commit`, in backend order.
    ///
    /// An empty vector means nothing has been scheduled yet.
    async fn fetch(&self, commit: &str, limit: usize) -> Result<Vec<RunRecord>>;
}
