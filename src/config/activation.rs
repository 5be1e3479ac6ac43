// src/config/activation.rs

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use crate::config::model::ConfigFile;
use crate::discover::{self, DEFAULT_PATHEXT};
use crate::errors::{ExecshimError, Result};
use crate::fs::FileSystem;
use crate::meta::Meta;
use crate::platform::Platform;

/// File name of the executor binary on this platform.
pub fn executor_file_name() -> String {
    format!("execshim-exec{}", Platform::current().exe_suffix())
}

impl ConfigFile {
    /// Metadata the executors of this activation will read.
    ///
    /// Explicit `[runtime].bins` are used as given; otherwise candidates are
    /// discovered from the `PATH` override.
    pub fn to_meta(&self, fs: &dyn FileSystem, platform: Platform) -> Result<Meta> {
        let bins = if self.runtime.bins.is_empty() {
            let path = self
                .runtime
                .env
                .iter()
                .find(|(k, _)| platform.is_path_key(k))
                .map(|(_, v)| v.as_str())
                .unwrap_or_default();
            let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| DEFAULT_PATHEXT.to_string());
            let found = discover::executable_paths(fs, path, &pathext, platform)?;
            info!(count = found.len(), path = %path, "discovered runtime executables");
            found
        } else {
            self.runtime.bins.clone()
        };

        let mut meta = Meta::new(
            self.config.socket_path.clone(),
            bins,
            self.runtime.env.clone(),
        );
        meta.report_exit_code = self.config.report_exit_code;
        Ok(meta)
    }

    /// The `execshim-exec` binary executors hand off to.
    pub fn executor_path(&self) -> Result<PathBuf> {
        if let Some(exe) = &self.config.executor {
            return Ok(exe.clone());
        }

        let current = std::env::current_exe().context("locating the running execshim binary")?;
        let dir = current.parent().ok_or_else(|| {
            ExecshimError::ConfigError(format!(
                "cannot derive executor location from {:?}; set [config].executor",
                current
            ))
        })?;
        Ok(dir.join(executor_file_name()))
    }
}
