// src/logging.rs

//! Logging setup for `execshim` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `EXECSHIM_LOG` environment variable (e.g. "info", "debug")
//! 3. default: `info` for the CLI, `warn` for the executor
//!
//! The executor also honours `EXECSHIM_VERBOSE`, which raises it to `debug`
//! and so enables per-stage timing output.
//!
//! Logs are sent to STDERR so that stdout belongs to the proxied command.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "EXECSHIM_LOG";
pub const VERBOSE_ENV: &str = "EXECSHIM_VERBOSE";

/// Initialise global logging subscriber for the CLI.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_level().unwrap_or(tracing::Level::INFO),
    };
    install(level, true);
    Ok(())
}

/// Initialise logging for the executor.
///
/// Quiet by default: a service that cannot be reached must not add noise to
/// the user's command output.
pub fn init_executor_logging() {
    let level = if verbose_enabled() {
        tracing::Level::DEBUG
    } else {
        env_level().unwrap_or(tracing::Level::WARN)
    };
    install(level, false);
}

fn install(level: tracing::Level, with_target: bool) {
    // Send logs to stderr; keep stdout free for command output.
    // `try_init` so a second call (tests) is not fatal.
    let _ = fmt()
        .with_max_level(level)
        .with_target(with_target)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn env_level() -> Option<tracing::Level> {
    std::env::var(LOG_ENV).ok().and_then(|s| parse_level_str(&s))
}

/// `EXECSHIM_VERBOSE` set to anything but empty, `0` or `false`.
pub fn verbose_enabled() -> bool {
    match std::env::var(VERBOSE_ENV) {
        Ok(v) => {
            let v = v.trim().to_lowercase();
            !(v.is_empty() || v == "0" || v == "false")
        }
        Err(_) => false,
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
