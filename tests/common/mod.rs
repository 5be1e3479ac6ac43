#![allow(dead_code)]

pub use execshim_test_utils::builders;
pub use execshim_test_utils::init_tracing;

use std::path::{Path, PathBuf};

/// Write an executable shell script (Unix only).
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

/// Path to a built binary of this package.
pub fn executor_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_execshim-exec"))
}

/// Path to the management CLI binary.
pub fn cli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_execshim"))
}
