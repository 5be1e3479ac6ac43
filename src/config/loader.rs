// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable overriding the default config location.
pub const CONFIG_ENV: &str = "EXECSHIM_CONFIG";

/// Environment variable overriding `[config].socket_path`.
pub const SOCKET_ENV: &str = "EXECSHIM_SOCKET";

/// Load an activation file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization plus environment overrides; it
/// does **not** validate. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load an activation file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut RawConfigFile) {
    if let Ok(socket) = std::env::var(SOCKET_ENV) {
        if !socket.trim().is_empty() {
            debug!(socket = %socket, "socket path overridden from {SOCKET_ENV}");
            config.config.socket_path = socket;
        }
    }
}

/// Default activation file: `$EXECSHIM_CONFIG`, else `Execshim.toml` in the
/// current working directory.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Execshim.toml"))
}
