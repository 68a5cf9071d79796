//! `Taskboard` — run task commands against an in-memory task board.
//!
//! Reads a JSON-lines command script from a file or stdin and prints one
//! JSON result per command. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # Run a script
//! cargo run --bin taskboard -- commands.jsonl
//!
//! # Pin the clock for overdue checks and enforce the sequential workflow
//! cargo run --bin taskboard -- --now 2024-06-01T00:00:00Z --workflow sequential < commands.jsonl
//! ```

use std::io::{self, BufReader};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::clock::{Clock, ManualClock, SystemClock};
use taskboard::config::{AppConfig, CliArgs};
use taskboard::script::ScriptRunner;
use taskboard::tasks::TaskStore;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let clock: Arc<dyn Clock> = match config.now {
        Some(now) => Arc::new(ManualClock::new(now)),
        None => Arc::new(SystemClock),
    };
    let store = TaskStore::with_config(config.store).with_clock(clock);
    let mut runner = ScriptRunner::new(store).with_pretty(config.pretty);

    let store_config = runner.store().config();
    tracing::info!(
        workflow = %store_config.workflow,
        max_title_len = store_config.max_title_len,
        pinned_now = ?config.now,
        "taskboard starting"
    );

    let stdout = io::stdout().lock();
    let stderr = io::stderr().lock();
    let result = match cli.script.as_deref() {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => runner.run(BufReader::new(file), stdout, stderr),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to open script");
                eprintln!("Error opening {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => runner.run(io::stdin().lock(), stdout, stderr),
    };

    match result {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "script run aborted");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging.
///
/// Logs go to stderr by default, or to `file_path` through a non-blocking
/// writer. A path without a UTF-8 file name falls back to stderr with a
/// warning. The returned [`WorkerGuard`] must be held until shutdown so
/// buffered file entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let target = file_path.and_then(|path| {
        let target = split_log_path(path);
        if target.is_none() {
            eprintln!(
                "Warning: log file {} has no usable file name; logging to stderr",
                path.display()
            );
        }
        target
    });

    let Some((log_dir, file_name)) = target else {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Splits a log file path into its directory (`.` when bare) and UTF-8 file
/// name.
fn split_log_path(path: &Path) -> Option<(&Path, &str)> {
    let file_name = path.file_name()?.to_str()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Some((dir, file_name))
}
