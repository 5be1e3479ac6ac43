// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Activation file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// bin_dir = "/home/user/.local/share/execshim/bin"
/// socket_path = "/run/user/1000/svc.sock"
///
/// [runtime]
/// bins = ["/rt/bin/python3"]
///
/// [runtime.env]
/// PATH = "/rt/bin"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Validated activation file. Build it with `ConfigFile::try_from`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub runtime: RuntimeSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, runtime: RuntimeSection) -> Self {
        Self { config, runtime }
    }

    pub fn bin_dir(&self) -> &Path {
        &self.config.bin_dir
    }
}

/// `[config]` section: where executors go and who they report to.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Directory on the user's PATH that receives the executors.
    #[serde(default)]
    pub bin_dir: PathBuf,

    /// Background service endpoint. `EXECSHIM_SOCKET` takes precedence.
    #[serde(default)]
    pub socket_path: String,

    /// The `execshim-exec` binary. Defaults to the one installed next to
    /// `execshim`.
    #[serde(default)]
    pub executor: Option<PathBuf>,

    /// Also report the target's exit code after it finishes.
    #[serde(default)]
    pub report_exit_code: bool,
}

/// `[runtime]` section: what the activated runtime provides.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuntimeSection {
    /// Candidate binaries, highest priority first. When empty they are
    /// discovered from `env.PATH`.
    #[serde(default)]
    pub bins: Vec<PathBuf>,

    /// Environment overrides; must contain `PATH`.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
