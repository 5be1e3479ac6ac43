// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::wire::{TransportError, WireError};

#[derive(Error, Debug)]
pub enum ExecshimError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Could not load executor metadata from {path:?}: {reason}")]
    MetaLoad { path: PathBuf, reason: String },

    #[error("No executable matches '{name}' in the executor metadata")]
    NoTarget { name: String },

    /// A file we did not generate sits where an executor should go.
    #[error("Could not create executor as target already exists and is not ours: {path:?}")]
    Conflict { path: PathBuf },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML encoding error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExecshimError {
    /// Generation conflicts get their own headline in the CLI.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ExecshimError::Conflict { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ExecshimError>;
