// src/meta.rs

//! The executor metadata file.
//!
//! Written by the generator on every activation, read by every executor
//! invocation. It lives inside the bin directory under [`META_FILE_NAME`] so
//! an executor can find it from its own location.
//!
//! Encoded as TOML. Unknown keys are ignored and missing keys fall back to
//! their defaults, so an executor built against an older layout keeps
//! reading the fields it knows about.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ExecshimError, Result};
use crate::fs::FileSystem;

pub const META_FILE_NAME: &str = "execshim.meta.toml";

/// Layout revision written into new files.
pub const META_SCHEMA: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default = "default_schema")]
    pub schema: u32,

    /// Background service endpoint.
    #[serde(default)]
    pub socket_path: String,

    /// Send an `exitcode` message once the target exits.
    #[serde(default)]
    pub report_exit_code: bool,

    /// Candidate binaries in priority order.
    #[serde(default)]
    pub bins: Vec<PathBuf>,

    /// Environment overrides; `PATH` is prepended, everything else replaces.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_schema() -> u32 {
    META_SCHEMA
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            schema: META_SCHEMA,
            socket_path: String::new(),
            report_exit_code: false,
            bins: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

impl Meta {
    pub fn new(
        socket_path: impl Into<String>,
        bins: Vec<PathBuf>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            socket_path: socket_path.into(),
            bins,
            env,
            ..Self::default()
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Location of the metadata file for executors in `bin_dir`.
pub fn meta_path(bin_dir: &Path) -> PathBuf {
    bin_dir.join(META_FILE_NAME)
}

/// Read the metadata file. Any failure is reported as [`ExecshimError::MetaLoad`].
pub fn load(path: &Path) -> Result<Meta> {
    let contents = fs::read_to_string(path).map_err(|e| ExecshimError::MetaLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Meta::from_toml(&contents).map_err(|e| ExecshimError::MetaLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write the metadata file unconditionally.
pub fn save(fs: &dyn FileSystem, path: &Path, meta: &Meta) -> Result<()> {
    let contents = meta.to_toml()?;
    fs.write_atomic(path, contents.as_bytes(), false)?;
    Ok(())
}

/// Write the metadata file only if its contents would change.
///
/// Returns whether a write happened.
pub fn save_if_changed(fs: &dyn FileSystem, path: &Path, meta: &Meta) -> Result<bool> {
    let contents = meta.to_toml()?;
    if fs.exists(path) {
        if let Ok(existing) = fs.read(path) {
            if existing == contents.as_bytes() {
                debug!(path = %path.display(), "executor metadata unchanged");
                return Ok(false);
            }
        }
    }
    fs.write_atomic(path, contents.as_bytes(), false)?;
    debug!(path = %path.display(), "wrote executor metadata");
    Ok(true)
}
