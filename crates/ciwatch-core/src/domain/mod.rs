//! Domain models for ciwatch.
//!
//! - `RunRecord`: one CI run observed for a commit
//! - `Snapshot`: every known run for a commit at one poll instant
//! - `WatchError`: error taxonomy shared by sources and the CLI

pub mod error;
pub mod run;
pub mod snapshot;

pub use error::{Result, WatchError};
pub use run::{Conclusion, RunId, RunRecord, RunStatus};
pub use snapshot::{Reconciliation, Snapshot};
