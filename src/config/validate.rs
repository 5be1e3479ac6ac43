// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ExecshimError, Result};
use crate::platform::Platform;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ExecshimError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.runtime))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_config_section(cfg)?;
    validate_bins(cfg)?;
    validate_env(cfg)?;
    Ok(())
}

fn validate_config_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.bin_dir.as_os_str().is_empty() {
        return Err(ExecshimError::ConfigError(
            "[config].bin_dir must be set".to_string(),
        ));
    }
    if cfg.config.socket_path.trim().is_empty() {
        return Err(ExecshimError::ConfigError(
            "[config].socket_path must be set (or EXECSHIM_SOCKET exported)".to_string(),
        ));
    }
    Ok(())
}

fn validate_bins(cfg: &RawConfigFile) -> Result<()> {
    for bin in cfg.runtime.bins.iter() {
        if !bin.is_absolute() {
            return Err(ExecshimError::ConfigError(format!(
                "[runtime].bins entry {:?} must be an absolute path",
                bin
            )));
        }
    }
    Ok(())
}

fn validate_env(cfg: &RawConfigFile) -> Result<()> {
    let platform = Platform::current();
    let path = cfg
        .runtime
        .env
        .iter()
        .find(|(k, _)| platform.is_path_key(k))
        .map(|(_, v)| v);
    match path {
        None => Err(ExecshimError::ConfigError(
            "[runtime.env] must contain a PATH entry pointing at the runtime's bin directory"
                .to_string(),
        )),
        Some(v) if v.trim().is_empty() => Err(ExecshimError::ConfigError(
            "[runtime.env] PATH must not be empty".to_string(),
        )),
        Some(_) => Ok(()),
    }
}
