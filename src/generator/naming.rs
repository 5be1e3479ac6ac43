// src/generator/naming.rs

//! Executor file names.
//!
//! On POSIX an executor carries the exact name of its target. On Windows the
//! executor is a batch script, so the target's extension is swapped for
//! `.bat` (`python.exe` -> `python.bat`, `pip.cmd` -> `pip.bat`).
//!
//! Users also type `python.exe` explicitly. Matching strips one suffix
//! layer, so for every `.exe` candidate a second candidate with a doubled
//! suffix is added (`python.exe.exe` -> executor `python.exe.bat`). That
//! alias still forwards to the single-suffix binary.

use std::path::PathBuf;

use crate::platform::{self, Platform};

/// One executor to materialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedExecutor {
    /// File name inside the bin directory.
    pub name: String,
    /// Binary the executor forwards to.
    pub target: PathBuf,
}

/// Candidate list including the Windows double-suffix aliases.
pub fn expand_candidates(bins: &[PathBuf], platform: Platform) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = bins.to_vec();
    if platform == Platform::Windows {
        let exe = platform.exe_suffix();
        for bin in bins {
            if has_suffix(&bin.to_string_lossy(), exe) {
                let mut alias = bin.clone().into_os_string();
                alias.push(exe);
                out.push(PathBuf::from(alias));
            }
        }
    }
    out
}

/// The executor name for a candidate binary.
pub fn executor_name(candidate: &std::path::Path, platform: Platform) -> String {
    let name = platform::file_name(candidate, platform);
    match platform {
        Platform::Posix => name,
        Platform::Windows => {
            format!("{}{}", platform.strip_one_suffix(&name), platform.proxy_suffix())
        }
    }
}

/// The binary an (expanded) candidate forwards to.
pub fn resolve_target(candidate: &std::path::Path, platform: Platform) -> PathBuf {
    let raw = candidate.to_string_lossy();
    let exe = platform.exe_suffix();
    if platform == Platform::Windows && has_suffix(&raw, &format!("{exe}{exe}")) {
        return PathBuf::from(&raw[..raw.len() - exe.len()]);
    }
    candidate.to_path_buf()
}

/// Plan one executor per distinct name; earlier candidates win.
pub fn plan(bins: &[PathBuf], platform: Platform) -> Vec<PlannedExecutor> {
    let mut planned: Vec<PlannedExecutor> = Vec::new();
    for candidate in expand_candidates(bins, platform) {
        let name = executor_name(&candidate, platform);
        if name.is_empty() {
            continue;
        }
        if planned
            .iter()
            .any(|p| platform.names_equal(&p.name, &name))
        {
            continue;
        }
        planned.push(PlannedExecutor {
            name,
            target: resolve_target(&candidate, platform),
        });
    }
    planned
}

fn has_suffix(s: &str, suffix: &str) -> bool {
    !suffix.is_empty()
        && s.len() >= suffix.len()
        && s.as_bytes()[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}
