// tests/runtime_env.rs

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use execshim::platform::Platform;
use execshim::runtime::{compose_env, select_target};

fn inherited(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
    pairs
        .iter()
        .map(|(k, v)| (OsString::from(k), OsString::from(v)))
        .collect()
}

fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn bins(paths: &[&str]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

#[test]
fn test_path_override_is_prepended() {
    let env = compose_env(
        inherited(&[("PATH", "/usr/local/bin:/usr/bin"), ("HOME", "/home/u")]),
        &overrides(&[("PATH", "/rt/bin")]),
        Platform::Posix,
    );

    assert_eq!(env["PATH"], OsString::from("/rt/bin:/usr/local/bin:/usr/bin"));
    assert_eq!(env["HOME"], OsString::from("/home/u"));
}

#[test]
fn test_other_overrides_replace_inherited_values() {
    let env = compose_env(
        inherited(&[("PYTHONHOME", "/old"), ("LANG", "C")]),
        &overrides(&[("PYTHONHOME", "/rt"), ("SSL_CERT_FILE", "/rt/cacert.pem")]),
        Platform::Posix,
    );

    assert_eq!(env["PYTHONHOME"], OsString::from("/rt"));
    assert_eq!(env["SSL_CERT_FILE"], OsString::from("/rt/cacert.pem"));
    assert_eq!(env["LANG"], OsString::from("C"));
}

#[test]
fn test_path_override_without_inherited_path() {
    let env = compose_env(
        inherited(&[]),
        &overrides(&[("PATH", "/rt/bin")]),
        Platform::Posix,
    );
    assert_eq!(env["PATH"], OsString::from("/rt/bin"));

    let env = compose_env(
        inherited(&[("PATH", "")]),
        &overrides(&[("PATH", "/rt/bin")]),
        Platform::Posix,
    );
    assert_eq!(env["PATH"], OsString::from("/rt/bin"));
}

#[test]
fn test_empty_path_override_keeps_inherited_path() {
    let env = compose_env(
        inherited(&[("PATH", "/usr/bin:/bin")]),
        &overrides(&[("PATH", "")]),
        Platform::Posix,
    );
    assert_eq!(env["PATH"], OsString::from("/usr/bin:/bin"));

    let env = compose_env(inherited(&[]), &overrides(&[("PATH", "")]), Platform::Posix);
    assert!(!env.contains_key("PATH"));
}

#[test]
fn test_posix_keys_are_case_sensitive() {
    let env = compose_env(
        inherited(&[("Path", "/x"), ("PATH", "/usr/bin")]),
        &overrides(&[("PATH", "/rt/bin")]),
        Platform::Posix,
    );
    assert_eq!(env["Path"], OsString::from("/x"));
    assert_eq!(env["PATH"], OsString::from("/rt/bin:/usr/bin"));
}

#[test]
fn test_windows_path_keys_are_unified() {
    let env = compose_env(
        inherited(&[("Path", r"C:\Windows;C:\Windows\System32"), ("windir", r"C:\Windows")]),
        &overrides(&[("PATH", r"C:\rt;C:\rt\Scripts")]),
        Platform::Windows,
    );

    assert_eq!(env.len(), 2);
    assert_eq!(
        env["PATH"],
        OsString::from(r"C:\rt;C:\rt\Scripts;C:\Windows;C:\Windows\System32")
    );
    assert_eq!(env["WINDIR"], OsString::from(r"C:\Windows"));
}

#[test]
fn test_select_first_match_wins() {
    let bins = bins(&["/rt/bin/python3", "/usr/bin/python3", "/rt/bin/pip"]);

    assert_eq!(
        select_target(&bins, "python3", Platform::Posix),
        Some(Path::new("/rt/bin/python3"))
    );
    assert_eq!(
        select_target(&bins, "pip", Platform::Posix),
        Some(Path::new("/rt/bin/pip"))
    );
}

#[test]
fn test_select_without_match() {
    let bins = bins(&["/rt/bin/python3"]);
    assert_eq!(select_target(&bins, "python", Platform::Posix), None);
    assert_eq!(select_target(&[], "python3", Platform::Posix), None);
}

#[test]
fn test_select_posix_keeps_dots_and_case() {
    let bins = bins(&["/rt/bin/python3.11", "/rt/bin/Python"]);
    assert_eq!(
        select_target(&bins, "python3.11", Platform::Posix),
        Some(Path::new("/rt/bin/python3.11"))
    );
    assert_eq!(select_target(&bins, "python3", Platform::Posix), None);
    assert_eq!(select_target(&bins, "python", Platform::Posix), None);
}

#[test]
fn test_select_windows_strips_one_suffix() {
    let bins = bins(&[r"C:\rt\python.exe", r"C:\rt\Scripts\pip.cmd"]);

    assert_eq!(
        select_target(&bins, "python.bat", Platform::Windows),
        Some(Path::new(r"C:\rt\python.exe"))
    );
    assert_eq!(
        select_target(&bins, "PYTHON.BAT", Platform::Windows),
        Some(Path::new(r"C:\rt\python.exe"))
    );
    assert_eq!(
        select_target(&bins, "python.exe.bat", Platform::Windows),
        Some(Path::new(r"C:\rt\python.exe"))
    );
    assert_eq!(
        select_target(&bins, "pip.bat", Platform::Windows),
        Some(Path::new(r"C:\rt\Scripts\pip.cmd"))
    );
    assert_eq!(select_target(&bins, "ruby.bat", Platform::Windows), None);
}
