// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! This is the management surface used by the activation flow. The executor
//! binary (`execshim-exec`) does not go through here: it must pass every
//! argument to the target untouched.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `execshim`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "execshim",
    version,
    about = "Generate and manage executors that proxy a runtime's binaries.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `EXECSHIM_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create or refresh executors for an activation file.
    Apply {
        /// Path to the activation file (TOML).
        ///
        /// Default: `$EXECSHIM_CONFIG`, else `Execshim.toml` in the current
        /// working directory.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Validate and print the planned executors without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove executors from a bin directory.
    Clean {
        #[arg(long, value_name = "DIR")]
        bin_dir: PathBuf,

        /// Executor file names to keep. Without any, all executors go.
        #[arg(long, value_name = "NAME")]
        keep: Vec<String>,
    },

    /// Send a raw wire message (e.g. `heart<123</rt/bin/python3`) to the service.
    Send {
        #[arg(long, value_name = "PATH")]
        socket: PathBuf,

        /// Timeout for each of dial, write and read, in milliseconds.
        #[arg(long, value_name = "MS", default_value_t = 500)]
        timeout_ms: u64,

        message: String,
    },

    /// Exit 0 if the file is an executor we generated, 1 otherwise.
    IsExecutor { path: PathBuf },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
