// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod errors;
pub mod escape;
pub mod fs;
pub mod generator;
pub mod logging;
pub mod meta;
pub mod platform;
pub mod runtime;
pub mod wire;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::fs::RealFileSystem;
use crate::generator::{Generator, is_executor};
use crate::meta::Meta;
use crate::platform::Platform;
use crate::wire::{Message, Transport, WireMessage};

/// High-level entry point used by `main.rs`.
///
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        Command::Apply { config, dry_run } => {
            let config_path = config.unwrap_or_else(default_config_path);
            apply(&config_path, dry_run)?;
            Ok(0)
        }
        Command::Clean { bin_dir, keep } => {
            // Cleaning never renders executors, so no executor binary is needed.
            let generator = Generator::new(RealFileSystem, PathBuf::new());
            let removed = generator.clean(&bin_dir, &keep)?;
            for path in &removed {
                println!("removed {}", path.display());
            }
            info!(removed = removed.len(), bin_dir = %bin_dir.display(), "clean complete");
            Ok(0)
        }
        Command::Send {
            socket,
            timeout_ms,
            message,
        } => {
            let msg = Message::parse(&message)?;
            let transport =
                Transport::new(socket).with_timeout(Duration::from_millis(timeout_ms));
            let ack_len = transport.send(&msg).await?;
            println!("sent {} message ({ack_len} byte acknowledgement)", msg.tag());
            Ok(0)
        }
        Command::IsExecutor { path } => {
            let owned = is_executor(&RealFileSystem, &path)?;
            println!("{}", if owned { "yes" } else { "no" });
            Ok(if owned { 0 } else { 1 })
        }
    }
}

/// Load an activation file and bring its bin directory in line with it.
pub fn apply(config_path: &Path, dry_run: bool) -> Result<()> {
    let cfg = load_and_validate(config_path)?;
    let fs = RealFileSystem;
    let meta = cfg.to_meta(&fs, Platform::current())?;
    let generator = Generator::new(fs, cfg.executor_path()?);

    if dry_run {
        print_dry_run(&cfg, &meta, &generator);
        return Ok(());
    }

    let report = generator.apply(cfg.bin_dir(), &meta)?;
    println!(
        "{} executors in {} ({} created, {} replaced, {} refreshed, {} removed)",
        report.created.len()
            + report.replaced.len()
            + report.refreshed.len()
            + report.unchanged.len(),
        cfg.bin_dir().display(),
        report.created.len(),
        report.replaced.len(),
        report.refreshed.len(),
        report.removed.len(),
    );
    Ok(())
}

/// Simple dry-run output: print the metadata and planned executors.
fn print_dry_run(cfg: &ConfigFile, meta: &Meta, generator: &Generator<RealFileSystem>) {
    println!("execshim dry-run");
    println!("  bin_dir = {}", cfg.bin_dir().display());
    println!("  socket_path = {}", meta.socket_path);
    println!("  report_exit_code = {}", meta.report_exit_code);
    for (key, value) in meta.env.iter() {
        println!("  env.{key} = {value}");
    }
    println!();

    let planned = generator.plan(meta);
    println!("executors ({}):", planned.len());
    for executor in planned.iter() {
        println!("  - {} -> {}", executor.name, executor.target.display());
    }

    debug!("dry-run complete (nothing written)");
}
