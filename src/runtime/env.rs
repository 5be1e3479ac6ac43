// src/runtime/env.rs

//! Environment composition for the target process.

use std::collections::BTreeMap;
use std::ffi::OsString;

use crate::platform::Platform;

/// Build the environment the target runs with.
///
/// Starts from `inherited`, unified by key so that `Path` and `PATH` are the
/// same variable on Windows. A `PATH` override is prepended to the inherited
/// value; any other override replaces the inherited value outright. An
/// empty `PATH` override leaves the inherited `PATH` as it is.
pub fn compose_env<I>(
    inherited: I,
    overrides: &BTreeMap<String, String>,
    platform: Platform,
) -> BTreeMap<String, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: BTreeMap<String, OsString> = BTreeMap::new();
    for (key, value) in inherited {
        let key = platform.normalize_env_key(&key.to_string_lossy());
        env.insert(key, value);
    }

    for (key, value) in overrides {
        let key = platform.normalize_env_key(key);
        if platform.is_path_key(&key) {
            // An empty entry would put the working directory on PATH.
            if value.trim().is_empty() {
                continue;
            }
            let joined = prepend_path(value, env.get(&key), platform);
            env.insert(key, joined);
        } else {
            env.insert(key, OsString::from(value));
        }
    }

    env
}

fn prepend_path(front: &str, existing: Option<&OsString>, platform: Platform) -> OsString {
    let mut out = OsString::from(front);
    match existing {
        Some(rest) if !rest.is_empty() => {
            out.push(platform.path_list_separator().to_string());
            out.push(rest);
        }
        _ => {}
    }
    out
}
