// src/runtime/dispatch.rs

//! Running the target binary.
//!
//! The target inherits stdin/stdout/stderr untouched and gets exactly the
//! composed environment. While it runs, termination and interrupt signals
//! sent to the executor are passed on to it. An interrupt is not forwarded
//! when the executor sits in the terminal's foreground process group, since
//! the terminal has already delivered Ctrl-C to the target as well.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::errors::Result;

/// Spawn `target`, wait for it and return its exit code.
pub async fn run_target(
    target: &Path,
    args: &[OsString],
    env: &BTreeMap<String, OsString>,
) -> Result<i32> {
    let mut cmd = Command::new(target);
    add_args(&mut cmd, args)?;
    cmd.env_clear()
        .envs(env)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let signals = SignalForwarder::install()?;

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning target process {:?}", target))?;
    debug!(target = %target.display(), pid = ?child.id(), "target process started");

    let status = signals
        .wait(&mut child)
        .await
        .with_context(|| format!("waiting for target process {:?}", target))?;

    let code = exit_code(status);
    info!(target = %target.display(), exit_code = code, "target process exited");
    Ok(code)
}

#[cfg(not(windows))]
fn add_args(cmd: &mut Command, args: &[OsString]) -> Result<()> {
    cmd.args(args);
    Ok(())
}

/// `CreateProcess` takes a single string; build it ourselves so cmd
/// metacharacters are always quoted.
#[cfg(windows)]
fn add_args(cmd: &mut Command, args: &[OsString]) -> Result<()> {
    if !args.is_empty() {
        cmd.raw_arg(crate::escape::quote_os(args)?);
    }
    Ok(())
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(unix)]
struct SignalForwarder {
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalForwarder {
    /// Installed before the spawn so no signal slips through in between.
    fn install() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            terminate: signal(SignalKind::terminate()).context("installing SIGTERM handler")?,
            hangup: signal(SignalKind::hangup()).context("installing SIGHUP handler")?,
            interrupt: signal(SignalKind::interrupt()).context("installing SIGINT handler")?,
        })
    }

    async fn wait(mut self, child: &mut Child) -> std::io::Result<ExitStatus> {
        let pid = child.id();
        loop {
            tokio::select! {
                status = child.wait() => return status,
                Some(()) = self.terminate.recv() => forward(pid, libc::SIGTERM),
                Some(()) = self.hangup.recv() => forward(pid, libc::SIGHUP),
                Some(()) = self.interrupt.recv() => {
                    if in_foreground_group() {
                        debug!("interrupt received; target gets it from the terminal");
                    } else {
                        forward(pid, libc::SIGINT);
                    }
                }
            }
        }
    }
}

/// Whether our process group is the foreground group of the terminal on
/// stdin. The target shares our group, so it sees terminal signals too.
#[cfg(unix)]
fn in_foreground_group() -> bool {
    // SAFETY: both calls only read process state; tcgetpgrp fails with -1
    // when stdin is not a terminal.
    let (foreground, own) = unsafe { (libc::tcgetpgrp(libc::STDIN_FILENO), libc::getpgrp()) };
    foreground != -1 && foreground == own
}

#[cfg(unix)]
fn forward(pid: Option<u32>, sig: libc::c_int) {
    let Some(pid) = pid else {
        return;
    };
    debug!(pid, sig, "forwarding signal to target");
    // SAFETY: kill(2) has no memory-safety preconditions; a stale pid only
    // yields ESRCH.
    unsafe {
        libc::kill(pid as libc::pid_t, sig);
    }
}

#[cfg(not(unix))]
struct SignalForwarder;

#[cfg(not(unix))]
impl SignalForwarder {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn wait(self, child: &mut Child) -> std::io::Result<ExitStatus> {
        loop {
            tokio::select! {
                status = child.wait() => return status,
                res = tokio::signal::ctrl_c() => {
                    if res.is_err() {
                        return child.wait().await;
                    }
                    debug!("ctrl-c received; target gets it from the console");
                }
            }
        }
    }
}
