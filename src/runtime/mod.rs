// src/runtime/mod.rs

//! The executor runtime, run once per user invocation of an executor.
//!
//! The pipeline is linear:
//!
//! ```text
//! load metadata -> select target -> compose env -> heartbeat -> exec
//! ```
//!
//! Every step before exec is fatal on error except the heartbeat: if the
//! background service cannot be reached the command still runs.
//!
//! - [`select`] picks the target binary for the invoked executor name.
//! - [`env`] builds the target's environment.
//! - [`dispatch`] spawns the target and passes its exit code through.

pub mod dispatch;
pub mod env;
pub mod select;

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::errors::{ExecshimError, Result};
use crate::meta::{self, Meta};
use crate::platform::{self, Platform};
use crate::wire::{DEFAULT_TIMEOUT, ExitCode, Heartbeat, Transport, WireMessage};

pub use env::compose_env;
pub use select::select_target;

/// Headline printed for any failure before the target starts.
///
/// End users cannot act on the details, so they come second.
pub const USER_FACING_HEADER: &str = "The executor failed to start your command. This is not user serviceable; please contact support and include the details below.";

/// Everything needed to start the target.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub meta: Meta,
    pub target: PathBuf,
    pub env: BTreeMap<String, OsString>,
}

/// Runs executors. Defaults to the current platform and process environment.
#[derive(Debug, Clone)]
pub struct Executor {
    platform: Platform,
    inherited_env: Option<Vec<(OsString, OsString)>>,
    report_timeout: Duration,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
            inherited_env: None,
            report_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Use a fixed environment instead of the process environment.
    pub fn with_inherited_env(mut self, env: Vec<(OsString, OsString)>) -> Self {
        self.inherited_env = Some(env);
        self
    }

    pub fn with_report_timeout(mut self, timeout: Duration) -> Self {
        self.report_timeout = timeout;
        self
    }

    /// Run the executor at `executor_path` with the user's `args`.
    ///
    /// Returns the target's exit code.
    pub async fn run(&self, executor_path: &Path, args: &[OsString]) -> Result<i32> {
        let prepared = self.prepare(executor_path)?;
        let target = prepared.target.to_string_lossy().into_owned();
        let transport =
            Transport::new(&prepared.meta.socket_path).with_timeout(self.report_timeout);

        let started = Instant::now();
        report(&transport, &Heartbeat::new(std::process::id(), target.as_str())).await;
        debug!(stage = "report_heartbeat", elapsed_us = elapsed_us(started), "stage done");

        let started = Instant::now();
        let code = dispatch::run_target(&prepared.target, args, &prepared.env).await?;
        debug!(stage = "exec", elapsed_us = elapsed_us(started), "stage done");

        if prepared.meta.report_exit_code {
            report(&transport, &ExitCode::new(target.as_str(), code)).await;
        }

        Ok(code)
    }

    /// Load metadata, select the target and compose its environment.
    pub fn prepare(&self, executor_path: &Path) -> Result<Prepared> {
        let started = Instant::now();
        let meta = self.load_meta(executor_path)?;
        debug!(stage = "load_meta", elapsed_us = elapsed_us(started), "stage done");

        let started = Instant::now();
        let name = platform::file_name(executor_path, self.platform);
        let target = select_target(&meta.bins, &name, self.platform)
            .map(Path::to_path_buf)
            .ok_or_else(|| ExecshimError::NoTarget { name: name.clone() })?;
        debug!(
            stage = "select_target",
            elapsed_us = elapsed_us(started),
            executor = %name,
            target = %target.display(),
            "stage done"
        );

        let started = Instant::now();
        let inherited = match &self.inherited_env {
            Some(env) => env.clone(),
            None => std::env::vars_os().collect(),
        };
        let env = compose_env(inherited, &meta.env, self.platform);
        debug!(stage = "compose_env", elapsed_us = elapsed_us(started), "stage done");

        Ok(Prepared { meta, target, env })
    }

    fn load_meta(&self, executor_path: &Path) -> Result<Meta> {
        let dir = match executor_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        meta::load(&meta::meta_path(dir))
    }
}

/// Send one message; failures are only logged.
async fn report<M: WireMessage>(transport: &Transport, msg: &M) {
    if let Err(err) = transport.send(msg).await {
        debug!(
            tag = msg.tag(),
            error = %describe(&err),
            "could not report to background service"
        );
    }
}

fn elapsed_us(started: Instant) -> u128 {
    started.elapsed().as_micros()
}

/// An error and its causes on one line, skipping causes already quoted by
/// their parent's message.
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut cause = err.source();
    while let Some(e) = cause {
        let msg = e.to_string();
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        cause = e.source();
    }
    out
}

/// The two-line report printed when the executor cannot start the target.
pub fn fatal_report(err: &ExecshimError) -> String {
    format!("{USER_FACING_HEADER}\n{}", describe(err))
}
