// src/discover.rs

//! Candidate binary discovery for activations that do not list their
//! binaries explicitly.
//!
//! Every executable file in each directory of the runtime's `PATH` fragment
//! is a candidate. When two candidates share a name the one a shell would
//! pick wins: earlier `PATH` directories first, and within one directory the
//! extension listed earlier in `PATHEXT` (Windows only).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::platform::{self, Platform};

/// Default used when `PATHEXT` is not set on Windows.
pub const DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

/// Discover executables reachable through `path_fragment`.
pub fn executable_paths(
    fs: &dyn FileSystem,
    path_fragment: &str,
    pathext: &str,
    platform: Platform,
) -> Result<Vec<PathBuf>> {
    let dirs: Vec<&str> = path_fragment
        .split(platform.path_list_separator())
        .filter(|d| !d.is_empty())
        .collect();
    let exes = executables(fs, &dirs, pathext, platform)?;
    Ok(unique_executables(exes, pathext, platform))
}

/// All executable files directly inside the given directories, in order.
pub fn executables(
    fs: &dyn FileSystem,
    dirs: &[&str],
    pathext: &str,
    platform: Platform,
) -> Result<Vec<PathBuf>> {
    let exts = pathext_list(pathext);
    let mut out = Vec::new();

    for dir in dirs {
        let dir = Path::new(dir);
        if !fs.is_dir(dir) {
            debug!(dir = %dir.display(), "skipping missing PATH entry");
            continue;
        }

        let entries = fs
            .read_dir(dir)
            .with_context(|| format!("Could not read directory: {:?}", dir))?;
        for entry in entries {
            if fs.is_dir(&entry) {
                continue;
            }
            let runnable = match platform {
                Platform::Posix => fs.is_executable(&entry),
                Platform::Windows => extension_of(&entry, platform)
                    .map(|ext| exts.contains(&ext))
                    .unwrap_or(false),
            };
            if runnable {
                out.push(entry);
            }
        }
    }

    Ok(out)
}

struct Seen {
    dir: PathBuf,
    ext_rank: usize,
    slot: usize,
}

/// Keep only the executables a shell would select on a name collision.
///
/// Order of first appearance is preserved.
pub fn unique_executables(exes: Vec<PathBuf>, pathext: &str, platform: Platform) -> Vec<PathBuf> {
    let exts = pathext_list(pathext);
    let mut seen: HashMap<String, Seen> = HashMap::new();
    let mut result: Vec<PathBuf> = Vec::new();

    for exe in exes {
        let name = platform::file_name(&exe, platform);
        let ext = extension_of(&exe, platform).filter(|e| exts.contains(e));

        // Only strip extensions PATHEXT knows about; some macOS builds ship
        // binaries with dots in their names.
        let (key, ext_rank) = match &ext {
            Some(e) => {
                let stem = &name[..name.len() - e.len()];
                (
                    platform.normalize_env_key(stem),
                    exts.iter().position(|x| x == e).unwrap_or(usize::MAX),
                )
            }
            None => (platform.normalize_env_key(&name), usize::MAX),
        };
        let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();

        match seen.get_mut(&key) {
            None => {
                seen.insert(
                    key,
                    Seen {
                        dir,
                        ext_rank,
                        slot: result.len(),
                    },
                );
                result.push(exe);
            }
            Some(prev) => {
                if !paths_equal(&prev.dir, &dir, platform) {
                    continue; // Earlier PATH entries win
                }
                if prev.ext_rank <= ext_rank {
                    continue; // Earlier PATHEXT entries win
                }
                prev.ext_rank = ext_rank;
                result[prev.slot] = exe;
            }
        }
    }

    result
}

fn pathext_list(pathext: &str) -> Vec<String> {
    pathext
        .split(';')
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Lowercased extension including the dot, e.g. `.exe`.
fn extension_of(path: &Path, platform: Platform) -> Option<String> {
    let name = platform::file_name(path, platform);
    let idx = name.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some(name[idx..].to_ascii_lowercase())
}

fn paths_equal(a: &Path, b: &Path, platform: Platform) -> bool {
    platform.names_equal(&a.to_string_lossy(), &b.to_string_lossy())
}
