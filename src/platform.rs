// src/platform.rs

//! Platform conventions that decide executor naming, target matching and
//! environment composition.
//!
//! Everything that differs between POSIX and Windows goes through
//! [`Platform`] instead of `cfg!` checks, so the Windows rules can be
//! exercised from tests on any host.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub fn path_list_separator(self) -> char {
        match self {
            Platform::Posix => ':',
            Platform::Windows => ';',
        }
    }

    pub fn case_insensitive(self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Suffix carried by native executables (`.exe` on Windows).
    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Posix => "",
            Platform::Windows => ".exe",
        }
    }

    /// Suffix given to generated executor scripts.
    pub fn proxy_suffix(self) -> &'static str {
        match self {
            Platform::Posix => "",
            Platform::Windows => ".bat",
        }
    }

    /// Compare two file names the way this platform's filesystem does.
    pub fn names_equal(self, a: &str, b: &str) -> bool {
        if self.case_insensitive() {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    /// Environment variable names are case-insensitive on Windows, so
    /// `Path` and `PATH` have to land on the same key.
    pub fn normalize_env_key(self, key: &str) -> String {
        if self.case_insensitive() {
            key.to_ascii_uppercase()
        } else {
            key.to_string()
        }
    }

    pub fn is_path_key(self, key: &str) -> bool {
        self.names_equal(key, "PATH")
    }

    /// Strip one trailing extension (`python.exe.bat` -> `python.exe`).
    ///
    /// On POSIX names are taken as-is, since binaries there routinely carry
    /// dots (`python3.11`) that are not extensions.
    pub fn strip_one_suffix(self, name: &str) -> String {
        match self {
            Platform::Posix => name.to_string(),
            Platform::Windows => match name.rfind('.') {
                Some(idx) if idx > 0 => name[..idx].to_string(),
                _ => name.to_string(),
            },
        }
    }
}

/// File name of `path` as a `String`, lossy on invalid unicode.
///
/// Paths are split on both separators for Windows, where we may be handed
/// `C:\rt\python.exe` while running tests on a POSIX host.
pub fn file_name(path: &Path, platform: Platform) -> String {
    let raw = path.to_string_lossy();
    match platform {
        Platform::Windows => raw
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or_default()
            .to_string(),
        Platform::Posix => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}
