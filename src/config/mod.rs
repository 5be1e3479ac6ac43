// src/config/mod.rs

//! Activation file loading and validation for execshim.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load an activation file from disk (`loader.rs`).
//! - Validate basic invariants like absolute bins (`validate.rs`).
//! - Turn a validated file into executor metadata (`activation.rs`).

pub mod activation;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, RuntimeSection};
