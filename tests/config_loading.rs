// tests/config_loading.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::fs;
use std::path::{Path, PathBuf};

use execshim::config::{ConfigFile, load_and_validate, load_from_path};
use execshim::errors::ExecshimError;
use execshim::fs::mock::MockFileSystem;
use execshim::platform::Platform;

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Execshim.toml");
    fs::write(&path, contents).unwrap();
    path
}

fn assert_config_error(result: Result<ConfigFile, ExecshimError>, needle: &str) {
    match result {
        Err(ExecshimError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "unexpected message: {msg}")
        }
        other => panic!("expected ConfigError containing {needle:?}, got {:?}", other),
    }
}

#[test]
fn test_valid_activation_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[config]
bin_dir = "/home/u/.execshim/bin"
socket_path = "/tmp/svc.sock"
report_exit_code = true

[runtime]
bins = ["/rt/bin/python3", "/rt/bin/pip"]

[runtime.env]
PATH = "/rt/bin"
PYTHONHOME = "/rt"
"#,
    );

    let config = load_and_validate(&path).unwrap();
    assert_eq!(config.bin_dir(), Path::new("/home/u/.execshim/bin"));
    assert!(config.config.report_exit_code);
    assert_eq!(config.runtime.bins.len(), 2);
    assert_eq!(config.runtime.env["PYTHONHOME"], "/rt");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_from_path(dir.path().join("nope.toml"));
    assert!(matches!(result, Err(ExecshimError::IoError(_))));
}

#[test]
fn test_invalid_toml_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[config\nbin_dir = ");
    assert!(matches!(
        load_from_path(&path),
        Err(ExecshimError::TomlError(_))
    ));
}

#[test]
fn test_bin_dir_is_required() {
    let raw = ConfigFileBuilder::new("", "/tmp/svc.sock")
        .env("PATH", "/rt/bin")
        .raw();
    assert_config_error(ConfigFile::try_from(raw), "bin_dir");
}

#[test]
fn test_socket_path_is_required() {
    let raw = ConfigFileBuilder::new("/bin-dir", "  ")
        .env("PATH", "/rt/bin")
        .raw();
    assert_config_error(ConfigFile::try_from(raw), "socket_path");
}

#[test]
fn test_relative_bins_are_rejected() {
    let raw = ConfigFileBuilder::new("/bin-dir", "/tmp/svc.sock")
        .bin("bin/python3")
        .env("PATH", "/rt/bin")
        .raw();
    assert_config_error(ConfigFile::try_from(raw), "absolute");
}

#[test]
fn test_path_override_is_required() {
    let raw = ConfigFileBuilder::new("/bin-dir", "/tmp/svc.sock")
        .bin("/rt/bin/python3")
        .env("PYTHONHOME", "/rt")
        .raw();
    assert_config_error(ConfigFile::try_from(raw), "PATH");
}

#[test]
fn test_empty_path_override_is_rejected() {
    for value in ["", "   "] {
        let raw = ConfigFileBuilder::new("/bin-dir", "/tmp/svc.sock")
            .bin("/rt/bin/python3")
            .env("PATH", value)
            .raw();
        assert_config_error(ConfigFile::try_from(raw), "must not be empty");
    }
}

#[test]
fn test_empty_path_in_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[config]
bin_dir = "/bin-dir"
socket_path = "/tmp/svc.sock"

[runtime.env]
PATH = ""
"#,
    );
    assert_config_error(load_and_validate(&path), "PATH");
}

#[test]
fn test_to_meta_uses_explicit_bins() {
    let config = ConfigFileBuilder::new("/bin-dir", "/tmp/svc.sock")
        .bin("/rt/bin/python3")
        .env("PATH", "/rt/bin")
        .build();

    let meta = config
        .to_meta(&MockFileSystem::new(), Platform::Posix)
        .unwrap();
    assert_eq!(meta.socket_path, "/tmp/svc.sock");
    assert_eq!(meta.bins, vec![PathBuf::from("/rt/bin/python3")]);
    assert_eq!(meta.env["PATH"], "/rt/bin");
}

#[test]
fn test_to_meta_discovers_bins_from_path() {
    let fs = MockFileSystem::new();
    fs.add_executable("/rt/bin/python3", "elf");
    fs.add_executable("/rt/bin/pip", "elf");
    fs.add_file("/rt/bin/README", "text");
    fs.add_executable("/rt/extra/python3", "elf");

    let config = ConfigFileBuilder::new("/bin-dir", "/tmp/svc.sock")
        .env("PATH", "/rt/bin:/rt/extra")
        .build();

    let meta = config.to_meta(&fs, Platform::Posix).unwrap();
    assert_eq!(
        meta.bins,
        vec![PathBuf::from("/rt/bin/pip"), PathBuf::from("/rt/bin/python3")]
    );
}

#[test]
fn test_explicit_executor_path_wins() {
    let config = ConfigFileBuilder::new("/bin-dir", "/tmp/svc.sock")
        .executor("/opt/execshim/execshim-exec")
        .env("PATH", "/rt/bin")
        .build();
    assert_eq!(
        config.executor_path().unwrap(),
        PathBuf::from("/opt/execshim/execshim-exec")
    );
}
