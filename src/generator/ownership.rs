// src/generator/ownership.rs

//! Markers embedded in every generated executor.
//!
//! Both markers are plain text so any tool can detect ownership with a
//! substring scan, without running the file.

use std::path::Path;

use anyhow::Context;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Proves a file was generated by us and may be replaced or removed.
///
/// Changing this breaks cleanup of executors written by older releases.
pub const EXECUTOR_DENOTER: &str = "!DO NOT EDIT! execshim Executor !DO NOT EDIT!";

/// Marker of the older shim files. Recognized for cleanup, never written.
pub const LEGACY_SHIM_DENOTER: &str = "!DO NOT EDIT! execshim Shim !DO NOT EDIT!";

/// Prefix of the line naming the binary an executor forwards to.
pub const TARGET_MARKER: &str = "Target: ";

pub fn is_owned_by_us(contents: &[u8]) -> bool {
    let s = String::from_utf8_lossy(contents);
    s.contains(EXECUTOR_DENOTER) || s.contains(LEGACY_SHIM_DENOTER)
}

/// The `Target: <path>` line as it appears in an executor for `target`.
pub fn target_line(target: &str) -> String {
    format!("{TARGET_MARKER}{target}")
}

/// The target recorded in an executor, if any.
///
/// Compared as a whole line remainder, so `/rt/bin/python` does not match an
/// executor for `/rt/bin/python3`.
pub fn recorded_target(contents: &[u8]) -> Option<String> {
    let s = String::from_utf8_lossy(contents);
    s.lines().find_map(|line| {
        line.find(TARGET_MARKER)
            .map(|idx| line[idx + TARGET_MARKER.len()..].trim_end().to_string())
    })
}

/// Whether the file at `path` is an executor we generated.
pub fn is_executor(fs: &dyn FileSystem, path: &Path) -> Result<bool> {
    if fs.is_dir(path) {
        return Ok(false);
    }
    let contents = fs
        .read(path)
        .with_context(|| format!("Could not read potential executor file: {:?}", path))?;
    Ok(is_owned_by_us(&contents))
}
