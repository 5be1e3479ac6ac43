#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use execshim::config::{ConfigFile, ConfigSection, RawConfigFile, RuntimeSection};
use execshim::meta::Meta;

/// Builder for `Meta` to simplify test setup.
pub struct MetaBuilder {
    meta: Meta,
}

impl MetaBuilder {
    pub fn new(socket_path: &str) -> Self {
        Self {
            meta: Meta::new(socket_path, Vec::new(), BTreeMap::new()),
        }
    }

    pub fn bin(mut self, path: &str) -> Self {
        self.meta.bins.push(PathBuf::from(path));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.meta.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn report_exit_code(mut self, val: bool) -> Self {
        self.meta.report_exit_code = val;
        self
    }

    pub fn build(self) -> Meta {
        self.meta
    }
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(bin_dir: &str, socket_path: &str) -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection {
                    bin_dir: PathBuf::from(bin_dir),
                    socket_path: socket_path.to_string(),
                    executor: None,
                    report_exit_code: false,
                },
                runtime: RuntimeSection::default(),
            },
        }
    }

    pub fn executor(mut self, path: &str) -> Self {
        self.config.config.executor = Some(PathBuf::from(path));
        self
    }

    pub fn bin(mut self, path: &str) -> Self {
        self.config.runtime.bins.push(PathBuf::from(path));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config
            .runtime
            .env
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
