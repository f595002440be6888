//! Error taxonomy for ciwatch.

/// Errors produced while talking to a status backend or preparing a watch.
///
/// Query errors (`SourceSpawn`, `SourceFailed`, `Parse`, `Http`) are transient
/// from the watch loops' point of view: they are logged and the cycle is
/// treated as carrying no new information.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("failed to launch status command {command}: {source}")]
    SourceSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("status command exited with {code:?}: {stderr}")]
    SourceFailed { code: Option<i32>, stderr: String },

    #[error("failed to parse status response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("git error: {0}")]
    GitError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Whether the watch loops should swallow this error and keep polling.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WatchError::SourceSpawn { .. }
                | WatchError::SourceFailed { .. }
                | WatchError::Parse(_)
                | WatchError::Http(_)
        )
    }
}

/// Result type for ciwatch operations.
pub type Result<T> = std::result::Result<T, WatchError>;
