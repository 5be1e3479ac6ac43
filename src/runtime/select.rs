// src/runtime/select.rs

use std::path::{Path, PathBuf};

use crate::platform::{self, Platform};

/// Pick the binary an executor named `executor_name` forwards to.
///
/// The first candidate with a matching file name wins, so earlier `PATH`
/// entries keep their priority. On Windows the executor's `.bat` suffix is
/// stripped once and compared case-insensitively against both the
/// candidate's stem and its full name, which lets `python.exe.bat` resolve
/// to `python.exe`.
pub fn select_target<'a>(
    bins: &'a [PathBuf],
    executor_name: &str,
    platform: Platform,
) -> Option<&'a Path> {
    let wanted = platform.strip_one_suffix(executor_name);

    bins.iter()
        .find(|bin| {
            let name = platform::file_name(bin, platform);
            match platform {
                Platform::Posix => name == wanted,
                Platform::Windows => {
                    platform.names_equal(&platform.strip_one_suffix(&name), &wanted)
                        || platform.names_equal(&name, &wanted)
                }
            }
        })
        .map(PathBuf::as_path)
}
