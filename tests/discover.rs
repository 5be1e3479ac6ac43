// tests/discover.rs

use std::path::PathBuf;

use execshim::discover::{DEFAULT_PATHEXT, executable_paths, unique_executables};
use execshim::fs::mock::MockFileSystem;
use execshim::platform::Platform;

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

#[test]
fn test_posix_discovery_keeps_executables_only() {
    let fs = MockFileSystem::new();
    fs.add_executable("/rt/bin/python3", "elf");
    fs.add_executable("/rt/bin/python3.11", "elf");
    fs.add_file("/rt/bin/activate", "source me");
    fs.add_dir("/rt/bin/subdir");

    let found = executable_paths(&fs, "/rt/bin", DEFAULT_PATHEXT, Platform::Posix).unwrap();
    assert_eq!(found, paths(&["/rt/bin/python3", "/rt/bin/python3.11"]));
}

#[test]
fn test_earlier_path_entries_win() {
    let fs = MockFileSystem::new();
    fs.add_executable("/a/perl", "elf");
    fs.add_executable("/b/perl", "elf");
    fs.add_executable("/b/cpan", "elf");

    let found = executable_paths(&fs, "/a:/b", DEFAULT_PATHEXT, Platform::Posix).unwrap();
    assert_eq!(found, paths(&["/a/perl", "/b/cpan"]));
}

#[test]
fn test_missing_and_empty_path_entries_are_skipped() {
    let fs = MockFileSystem::new();
    fs.add_executable("/rt/bin/ruby", "elf");

    let found =
        executable_paths(&fs, "::/missing:/rt/bin:", DEFAULT_PATHEXT, Platform::Posix).unwrap();
    assert_eq!(found, paths(&["/rt/bin/ruby"]));
}

#[test]
fn test_windows_filters_by_pathext() {
    let fs = MockFileSystem::new();
    fs.add_file("/rt/python.exe", "mz");
    fs.add_file("/rt/python.pdb", "debug");
    fs.add_file("/rt/Scripts/pip.cmd", "@echo");

    let found = executable_paths(&fs, "/rt;/rt/Scripts", DEFAULT_PATHEXT, Platform::Windows)
        .unwrap();
    assert_eq!(found, paths(&["/rt/python.exe", "/rt/Scripts/pip.cmd"]));
}

#[test]
fn test_pathext_order_decides_within_a_directory() {
    let exes = paths(&["/rt/tool.cmd", "/rt/tool.exe", "/rt/other.bat"]);
    let unique = unique_executables(exes, ".COM;.EXE;.BAT;.CMD", Platform::Windows);
    assert_eq!(unique, paths(&["/rt/tool.exe", "/rt/other.bat"]));
}

#[test]
fn test_pathext_does_not_override_path_order() {
    let exes = paths(&["/first/tool.cmd", "/second/tool.exe"]);
    let unique = unique_executables(exes, ".COM;.EXE;.BAT;.CMD", Platform::Windows);
    assert_eq!(unique, paths(&["/first/tool.cmd"]));
}

#[test]
fn test_windows_names_collide_case_insensitively() {
    let exes = paths(&["/rt/Python.exe", "/other/python.EXE"]);
    let unique = unique_executables(exes, DEFAULT_PATHEXT, Platform::Windows);
    assert_eq!(unique, paths(&["/rt/Python.exe"]));
}
