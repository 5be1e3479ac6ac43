// src/generator/mod.rs

//! Executor generation and cleanup.
//!
//! Runs once per activation. [`Generator::apply`] makes the bin directory
//! contain exactly one executor per candidate binary of the activation:
//!
//! - executors whose binary left the candidate set are removed first,
//! - files we did not generate are never overwritten (a [`Conflict`] aborts
//!   the whole apply before anything is written),
//! - executors already pointing at the right target with the right content
//!   are left alone, so re-applying an unchanged activation writes nothing.
//!
//! - [`naming`] maps candidate binaries to executor file names.
//! - [`ownership`] holds the markers proving a file is ours.
//! - [`template`] renders executor contents.
//!
//! [`Conflict`]: crate::errors::ExecshimError::Conflict

pub mod naming;
pub mod ownership;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::{ExecshimError, Result};
use crate::fs::FileSystem;
use crate::meta::{self, META_FILE_NAME, Meta};
use crate::platform::{self, Platform};

pub use naming::PlannedExecutor;
pub use ownership::{is_executor, is_owned_by_us};

/// In-flight atomic writes (see `RealFileSystem::write_atomic`).
fn is_temp_file(name: &str) -> bool {
    name.starts_with(".execshim-") && name.ends_with(".tmp")
}

/// What a single apply did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub created: Vec<String>,
    /// Existing executors now pointing at a different target.
    pub replaced: Vec<String>,
    /// Same target, but the rendered content changed.
    pub refreshed: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<PathBuf>,
    pub meta_written: bool,
}

impl ApplyReport {
    /// Number of files written or removed.
    pub fn changes(&self) -> usize {
        self.created.len()
            + self.replaced.len()
            + self.refreshed.len()
            + self.removed.len()
            + usize::from(self.meta_written)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Replaced,
    Refreshed,
    Unchanged,
}

/// Writes executors for an activation into a bin directory.
#[derive(Debug, Clone)]
pub struct Generator<F: FileSystem> {
    fs: F,
    executor: PathBuf,
    platform: Platform,
}

impl<F: FileSystem> Generator<F> {
    /// `executor` is the `execshim-exec` binary every executor hands off to.
    pub fn new(fs: F, executor: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            executor: executor.into(),
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Executors this generator would create for `meta`.
    pub fn plan(&self, meta: &Meta) -> Vec<PlannedExecutor> {
        naming::plan(&meta.bins, self.platform)
    }

    pub fn apply(&self, bin_dir: &Path, meta: &Meta) -> Result<ApplyReport> {
        debug!(
            bin_dir = %bin_dir.display(),
            bins = ?meta.bins,
            "creating executors"
        );

        let planned = self.plan(meta);
        self.check_conflicts(bin_dir, &planned)?;

        let keep: Vec<String> = planned.iter().map(|p| p.name.clone()).collect();
        let mut report = ApplyReport {
            removed: self
                .clean(bin_dir, &keep)
                .context("Could not clean up old executors")?,
            ..ApplyReport::default()
        };

        self.fs
            .create_dir_all(bin_dir)
            .with_context(|| format!("Could not create directory: {:?}", bin_dir))?;

        report.meta_written = meta::save_if_changed(&self.fs, &meta::meta_path(bin_dir), meta)?;

        for executor in &planned {
            let outcome = self.ensure_executor(bin_dir, executor, meta)?;
            let bucket = match outcome {
                Outcome::Created => &mut report.created,
                Outcome::Replaced => &mut report.replaced,
                Outcome::Refreshed => &mut report.refreshed,
                Outcome::Unchanged => &mut report.unchanged,
            };
            bucket.push(executor.name.clone());
        }

        info!(
            bin_dir = %bin_dir.display(),
            created = report.created.len(),
            replaced = report.replaced.len(),
            refreshed = report.refreshed.len(),
            unchanged = report.unchanged.len(),
            removed = report.removed.len(),
            "executors applied"
        );
        Ok(report)
    }

    /// Remove every executor in `bin_dir` whose name is not in `keep`.
    ///
    /// Files without an ownership marker and the metadata file are never
    /// touched. A missing `bin_dir` is not an error.
    pub fn clean(&self, bin_dir: &Path, keep: &[String]) -> Result<Vec<PathBuf>> {
        if !self.fs.is_dir(bin_dir) {
            return Ok(Vec::new());
        }

        let entries = self
            .fs
            .read_dir(bin_dir)
            .with_context(|| format!("Could not read dir: {:?}", bin_dir))?;

        let mut removed = Vec::new();
        for path in entries {
            if self.fs.is_dir(&path) {
                continue;
            }

            let name = platform::file_name(&path, self.platform);
            if name == META_FILE_NAME || is_temp_file(&name) {
                continue;
            }

            let contents = self.fs.read(&path).with_context(|| {
                format!("Could not read potential executor file: {:?}", path)
            })?;
            if !is_owned_by_us(&contents) {
                continue;
            }
            if keep.iter().any(|k| self.platform.names_equal(k, &name)) {
                continue;
            }

            self.fs
                .remove_file(&path)
                .with_context(|| format!("Could not remove executor: {:?}", path))?;
            debug!(executor = %path.display(), "removed stale executor");
            removed.push(path);
        }

        Ok(removed)
    }

    /// Fail before writing anything if a planned executor would land on a
    /// file we do not own.
    fn check_conflicts(&self, bin_dir: &Path, planned: &[PlannedExecutor]) -> Result<()> {
        for executor in planned {
            let path = bin_dir.join(&executor.name);
            if !self.fs.exists(&path) {
                continue;
            }
            if self.fs.is_dir(&path) {
                return Err(ExecshimError::Conflict { path });
            }
            let contents = self.fs.read(&path).with_context(|| {
                format!(
                    "Could not create executor as target already exists and could not be read: {:?}",
                    path
                )
            })?;
            if !is_owned_by_us(&contents) {
                return Err(ExecshimError::Conflict { path });
            }
        }
        Ok(())
    }

    fn ensure_executor(
        &self,
        bin_dir: &Path,
        executor: &PlannedExecutor,
        meta: &Meta,
    ) -> Result<Outcome> {
        let path = bin_dir.join(&executor.name);
        let contents = template::render(
            &template::TemplateParams {
                executor: &self.executor,
                socket_path: &meta.socket_path,
                target: &executor.target,
                env: &meta.env,
            },
            self.platform,
        )?;

        let mut outcome = Outcome::Created;
        if self.fs.exists(&path) {
            let existing = self.fs.read(&path).with_context(|| {
                format!(
                    "Could not create executor as target already exists and could not be read: {:?}",
                    path
                )
            })?;
            if !is_owned_by_us(&existing) {
                return Err(ExecshimError::Conflict { path });
            }

            let target = executor.target.to_string_lossy();
            outcome = match ownership::recorded_target(&existing) {
                Some(recorded) if recorded == target => {
                    if existing == contents.as_bytes() {
                        return Ok(Outcome::Unchanged);
                    }
                    Outcome::Refreshed
                }
                _ => Outcome::Replaced,
            };
        }

        debug!(
            target = %executor.target.display(),
            executor = %path.display(),
            ?outcome,
            "writing executor"
        );
        self.fs
            .write_atomic(&path, contents.as_bytes(), true)
            .with_context(|| {
                format!(
                    "Could not create executor for {:?} at {:?}",
                    executor.target, path
                )
            })?;
        Ok(outcome)
    }
}
