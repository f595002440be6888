//! ciwatch - wait for the CI runs of a commit and report the verdict
//!
//! Exit codes:
//! - `0`: every run completed successfully
//! - `1`: at least one run completed without success
//! - `2`: no run appeared for the commit within the appearance budget
//! - `3`: the watch could not start (unknown commit, bad configuration)

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use ciwatch_core::{
    default_level, render_outcome, render_progress, resolve_commit, run_watch, GhCliSource,
    GithubApiConfig, GithubApiSource, Snapshot, StatusSource, WatchConfig, WatchSpan,
    EXIT_SETUP_ERROR,
};

#[derive(Parser, Debug)]
#[command(name = "ciwatch")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Block until every CI run for a commit finishes, then report pass/fail", long_about = None)]
struct Cli {
    /// Commit to watch: SHA, short SHA or any git revision (default: HEAD)
    #[arg(short, long, env = "CIWATCH_COMMIT")]
    commit: Option<String>,

    /// Repository directory used to resolve the commit
    #[arg(short = 'C', long, default_value = ".")]
    dir: PathBuf,

    /// Maximum number of runs to consider (default: 20)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Seconds between completion polls (default: 30)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Queries made while waiting for the first run (default: 60)
    #[arg(long)]
    appearance_attempts: Option<u32>,

    /// Seconds between appearance queries (default: 2)
    #[arg(long)]
    appearance_delay: Option<u64>,

    /// Status backend
    #[arg(long, value_enum, default_value_t = Backend::Gh)]
    backend: Backend,

    /// Repository as owner/name (required for the api backend)
    #[arg(short = 'R', long, env = "CIWATCH_REPO")]
    repo: Option<String>,

    /// Path to the gh binary
    #[arg(long, default_value = "gh")]
    gh_path: String,

    /// Print the final report as JSON on stdout (progress goes to stderr)
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    log_json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// `gh run list` (uses gh's own authentication)
    Gh,
    /// GitHub REST API (token from GH_TOKEN or GITHUB_TOKEN)
    Api,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    ciwatch_core::init_tracing(cli.log_json, default_level(cli.verbose));
    exit_code(run(&cli).await)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}

/// Full session: setup, then the watch. Setup failures map to exit code 3.
async fn run(cli: &Cli) -> i32 {
    let result = match setup(cli) {
        Ok((config, source)) => run_with_source(cli, &config, source.as_ref()).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ciwatch: {e:#}");
            EXIT_SETUP_ERROR
        }
    }
}

fn setup(cli: &Cli) -> Result<(WatchConfig, Box<dyn StatusSource>)> {
    let commit = resolve_commit(&cli.dir, cli.commit.as_deref())
        .with_context(|| format!("Failed to resolve commit in {:?}", cli.dir))?;
    let config = build_config(cli, commit);
    config.validate().context("Invalid watch configuration")?;
    let source = build_source(cli)?;
    Ok((config, source))
}

/// Watch `config.commit` through `source`, print progress and the verdict,
/// and return the watch's exit code.
async fn run_with_source(
    cli: &Cli,
    config: &WatchConfig,
    source: &dyn StatusSource,
) -> Result<i32> {
    let span = WatchSpan::enter(&config.commit);
    info!(session_id = %span.session_id(), backend = ?cli.backend, "watching CI runs");

    let json = cli.json;
    let mut progress = |_cycle: u32, snapshot: &Snapshot| {
        let text = render_progress(snapshot);
        if json {
            eprint!("{text}");
        } else {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
    };

    let outcome = run_watch(source, config, &mut progress).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_report())?);
    } else {
        print!("{}", render_outcome(&outcome));
    }

    Ok(outcome.exit_code())
}

/// Environment defaults first, then explicit flags.
fn build_config(cli: &Cli, commit: String) -> WatchConfig {
    let mut config = WatchConfig::from_env(commit);
    if let Some(limit) = cli.limit {
        config.limit = limit;
    }
    if let Some(secs) = cli.interval {
        config.poll_interval = Duration::from_secs(secs);
    }
    if let Some(attempts) = cli.appearance_attempts {
        config.appearance_attempts = attempts;
    }
    if let Some(secs) = cli.appearance_delay {
        config.appearance_delay = Duration::from_secs(secs);
    }
    config
}

fn build_source(cli: &Cli) -> Result<Box<dyn StatusSource>> {
    match cli.backend {
        Backend::Gh => Ok(Box::new(gh_source(cli))),
        Backend::Api => {
            let repo = cli
                .repo
                .as_deref()
                .context("--repo owner/name is required with --backend api")?;
            let source = GithubApiSource::new(GithubApiConfig::from_env(repo))
                .context("Failed to set up GitHub API client")?;
            Ok(Box::new(source))
        }
    }
}

/// gh runs inside `--dir` so it infers the same repository the commit came from.
fn gh_source(cli: &Cli) -> GhCliSource {
    GhCliSource {
        binary_path: cli.gh_path.clone(),
        repo: cli.repo.clone(),
        working_dir: Some(cli.dir.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciwatch_core::fakes::ScriptedSource;
    use ciwatch_core::{
        Conclusion, RunRecord, RunStatus, EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_SUCCESS,
    };
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "ciwatch",
            "--limit",
            "5",
            "--interval",
            "10",
            "--appearance-attempts",
            "4",
            "--appearance-delay",
            "1",
        ]);
        let config = build_config(&cli, "abc".to_string());
        assert_eq!(config.limit, 5);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.appearance_attempts, 4);
        assert_eq!(config.appearance_delay, Duration::from_secs(1));
    }

    #[test]
    fn api_backend_requires_repo() {
        let mut cli = Cli::parse_from(["ciwatch", "--backend", "api"]);
        cli.repo = None;
        let Err(err) = build_source(&cli) else {
            panic!("api backend without a repo must not build");
        };
        assert!(err.to_string().contains("--repo"));
    }

    #[test]
    fn gh_backend_passes_repo_through() {
        let cli = Cli::parse_from(["ciwatch", "--repo", "octo/widgets", "--gh-path", "/opt/gh"]);
        assert!(build_source(&cli).is_ok());
        assert_eq!(cli.backend, Backend::Gh);
    }

    #[test]
    fn gh_backend_runs_in_repo_dir() {
        let cli = Cli::parse_from(["ciwatch", "-C", "/src/widgets", "--gh-path", "/opt/gh"]);
        let source = gh_source(&cli);
        assert_eq!(source.working_dir, Some(PathBuf::from("/src/widgets")));
        assert_eq!(source.binary_path, "/opt/gh");
    }

    fn session_config() -> WatchConfig {
        WatchConfig {
            appearance_attempts: 3,
            ..WatchConfig::new("abc")
        }
    }

    fn finished(id: &str, conclusion: Conclusion) -> RunRecord {
        RunRecord::new(id, RunStatus::Completed, Some(conclusion), "build", format!("https://ci/{id}"))
    }

    #[tokio::test(start_paused = true)]
    async fn successful_watch_exits_zero() {
        let cli = Cli::parse_from(["ciwatch"]);
        let source = ScriptedSource::from_runs(vec![vec![finished("1", Conclusion::Success)]]);

        let code = run_with_source(&cli, &session_config(), &source).await;

        assert_eq!(code.ok(), Some(EXIT_SUCCESS));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_run_exits_one() {
        let cli = Cli::parse_from(["ciwatch", "--json"]);
        let source = ScriptedSource::from_runs(vec![vec![
            finished("1", Conclusion::Success),
            finished("2", Conclusion::Failure),
        ]]);

        let code = run_with_source(&cli, &session_config(), &source).await;

        assert_eq!(code.ok(), Some(EXIT_FAILURE));
    }

    #[tokio::test(start_paused = true)]
    async fn no_runs_exits_two() {
        let cli = Cli::parse_from(["ciwatch"]);
        let source = ScriptedSource::always_empty();

        let code = run_with_source(&cli, &session_config(), &source).await;

        assert_eq!(code.ok(), Some(EXIT_NOT_FOUND));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn unresolvable_commit_exits_three() {
        let cli = Cli::parse_from([
            "ciwatch",
            "--commit",
            "no-such-branch",
            "-C",
            "/nonexistent/ciwatch-checkout",
        ]);
        assert_eq!(run(&cli).await, EXIT_SETUP_ERROR);
    }

    #[tokio::test]
    async fn invalid_limit_exits_three() {
        let cli = Cli::parse_from([
            "ciwatch",
            "--commit",
            "0123456789abcdef0123456789abcdef01234567",
            "--limit",
            "0",
        ]);
        assert_eq!(run(&cli).await, EXIT_SETUP_ERROR);
    }
}
