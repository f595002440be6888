//! Log setup for the `ciwatch` binary.
//!
//! Every log line goes to stderr. Stdout carries the progress blocks and the
//! closing verdict, or only the report document under `--json`, so piping
//! stdout into `jq` keeps working with logging turned all the way up.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default verbosity for the `--verbose` flag: per-attempt appearance events
/// are logged at debug, everything else at info.
pub fn default_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the subscriber for the watch session's `watch.*` events.
///
/// `json` follows `--log-json` and switches stderr to one JSON object per
/// event. `RUST_LOG`, when set, overrides `level`. A second call is a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let plain = (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let structured = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(plain)
        .with(structured)
        .try_init()
        .ok();
}
