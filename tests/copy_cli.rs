// tests/copy_cli.rs

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use filetime::FileTime;
use predicates::str::contains;
use tempfile::tempdir;

fn treesync() -> Command {
    Command::cargo_bin("treesync").unwrap()
}

fn write_with_mtime(path: &Path, content: &str, mtime: i64) {
    fs::write(path, content).unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

#[test]
fn copies_a_tree_recursively() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(src.join("sub")).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("a.txt"), "a").unwrap();
    fs::write(src.join("sub/b.txt"), "b").unwrap();

    treesync()
        .args(["-r", src.to_str().unwrap(), dst.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
    assert_eq!(fs::read_to_string(dst.join("sub/b.txt")).unwrap(), "b");
}

#[test]
fn second_run_reports_no_copies() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    write_with_mtime(&src.join("a.txt"), "a", 1_000_000);

    let args = ["-r", "-t", src.to_str().unwrap(), dst.to_str().unwrap()];
    treesync().args(args).assert().success();
    treesync()
        .args(args)
        .assert()
        .success()
        .stderr(contains("0 file(s) copied"));
}

#[test]
fn include_flag_narrows_the_selection() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("keep.txt"), "k").unwrap();
    fs::write(src.join("drop.log"), "d").unwrap();

    treesync()
        .args([
            "-r",
            "-i",
            "*.txt",
            src.to_str().unwrap(),
            dst.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(dst.join("keep.txt").is_file());
    assert!(!dst.join("drop.log").exists());
}

#[test]
fn exclude_folder_flag_prunes_subtrees() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(src.join("target")).unwrap();
    fs::create_dir_all(src.join("docs")).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("target/out.bin"), "o").unwrap();
    fs::write(src.join("docs/readme.md"), "r").unwrap();

    treesync()
        .args([
            "-r",
            "-E",
            "target",
            src.to_str().unwrap(),
            dst.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(dst.join("docs/readme.md").is_file());
    assert!(!dst.join("target").exists());
}

#[test]
fn missing_destination_exits_with_code_3() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("missing");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), "a").unwrap();

    treesync()
        .args([src.to_str().unwrap(), dst.to_str().unwrap()])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("does not exist"));

    treesync()
        .args(["--create-dest", src.to_str().unwrap(), dst.to_str().unwrap()])
        .assert()
        .success();
    assert!(dst.join("a.txt").is_file());
}

#[test]
fn strict_conflicts_exits_with_code_4() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(dst.join("x")).unwrap();
    fs::write(src.join("x"), "file").unwrap();

    treesync()
        .args([
            "-r",
            "--strict-conflicts",
            src.to_str().unwrap(),
            dst.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(contains("type conflict"));
}

#[test]
fn bad_date_exits_with_code_2() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();

    treesync()
        .args([
            "-n",
            "yesterday",
            src.to_str().unwrap(),
            dst.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("unrecognized date"));
}

#[test]
fn two_remote_sides_are_rejected() {
    treesync()
        .args(["alpha:/data", "beta:/data"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("at most one side may be remote"));
}

#[test]
fn quiet_suppresses_the_summary() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("a.txt"), "a").unwrap();

    treesync()
        .args(["-q", src.to_str().unwrap(), dst.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicates::str::is_empty());
}
