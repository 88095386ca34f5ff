// crates/engine/tests/case.rs

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use filetime::FileTime;
use tempfile::tempdir;

use engine::{Side, SyncOptions, copy_tree};
use vfs::{CaseProbe, Entry, Filesystem, LocalFs};

/// A local backend that reports itself case-insensitive regardless of
/// what the underlying filesystem does, so the reconciliation path can
/// be exercised on a case-sensitive test machine.
struct ForcedInsensitive(LocalFs);

impl ForcedInsensitive {
    fn new(designation: &str) -> Self {
        Self(LocalFs::new(designation))
    }
}

impl Filesystem for ForcedInsensitive {
    fn designation(&self) -> &str {
        self.0.designation()
    }

    fn is_unix(&self) -> bool {
        self.0.is_unix()
    }

    fn case_fallback(&self) -> bool {
        false
    }

    fn list(&self, path: &Path) -> vfs::Result<Vec<Entry>> {
        self.0.list(path)
    }

    fn stat(&self, path: &Path) -> vfs::Result<Entry> {
        self.0.stat(path)
    }

    fn make_dir(&self, path: &Path) -> vfs::Result<bool> {
        self.0.make_dir(path)
    }

    fn make_dir_all(&self, path: &Path) -> vfs::Result<()> {
        self.0.make_dir_all(path)
    }

    fn set_times(&self, path: &Path, atime: i64, mtime: i64) -> vfs::Result<()> {
        self.0.set_times(path, atime, mtime)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> vfs::Result<()> {
        self.0.set_mode(path, mode)
    }

    fn open(&self, path: &Path) -> vfs::Result<Box<dyn Read + '_>> {
        self.0.open(path)
    }

    fn create(&self, path: &Path) -> vfs::Result<Box<dyn Write + '_>> {
        self.0.create(path)
    }

    fn remove_file(&self, path: &Path) -> vfs::Result<()> {
        self.0.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> vfs::Result<()> {
        self.0.remove_dir(path)
    }

    fn probe_case_sensitivity(&self, _path: &Path) -> CaseProbe {
        CaseProbe {
            failed: false,
            sensitive: false,
        }
    }
}

fn write_with_mtime(path: &Path, content: &str, mtime: i64) {
    fs::write(path, content).unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

#[test]
fn case_colliding_names_are_withheld_from_an_insensitive_destination() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("Readme.md"), "one").unwrap();
    fs::write(src.join("README.md"), "two").unwrap();
    fs::write(src.join("ok.txt"), "fine").unwrap();

    let a = Side::new(Box::new(LocalFs::new("source")), &src, "source");
    let b = Side::new(
        Box::new(ForcedInsensitive::new("destination")),
        &dst,
        "destination",
    );
    let opts = SyncOptions {
        recursive: true,
        ..Default::default()
    };
    let report = copy_tree(&a, &b, &opts).unwrap();

    assert_eq!(report.files_copied, 1);
    assert!(dst.join("ok.txt").is_file());
    assert!(!dst.join("Readme.md").exists());
    assert!(!dst.join("README.md").exists());
    assert_eq!(report.warnings, 1);
    assert_eq!(report.skipped, 2);
}

#[test]
fn an_insensitive_destination_matches_names_across_case() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    write_with_mtime(&src.join("file.txt"), "older", 1_000);
    write_with_mtime(&dst.join("FILE.TXT"), "newer", 2_000);

    let a = Side::new(Box::new(LocalFs::new("source")), &src, "source");
    let b = Side::new(
        Box::new(ForcedInsensitive::new("destination")),
        &dst,
        "destination",
    );
    let opts = SyncOptions {
        recursive: true,
        ..Default::default()
    };
    let report = copy_tree(&a, &b, &opts).unwrap();

    // The differently-cased destination copy counts as the same object,
    // and it is newer, so nothing moves and no duplicate appears.
    assert_eq!(report.files_copied, 0);
    assert!(!dst.join("file.txt").exists());
    assert_eq!(fs::read_to_string(dst.join("FILE.TXT")).unwrap(), "newer");
}

#[test]
fn an_updated_file_lands_under_the_destination_spelling() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    write_with_mtime(&src.join("file.txt"), "fresh", 3_000);
    write_with_mtime(&dst.join("FILE.TXT"), "stale", 2_000);

    let a = Side::new(Box::new(LocalFs::new("source")), &src, "source");
    let b = Side::new(
        Box::new(ForcedInsensitive::new("destination")),
        &dst,
        "destination",
    );
    let opts = SyncOptions {
        recursive: true,
        ..Default::default()
    };
    let report = copy_tree(&a, &b, &opts).unwrap();

    assert_eq!(report.files_copied, 1);
    // Written through the name the destination already uses.
    assert_eq!(fs::read_to_string(dst.join("FILE.TXT")).unwrap(), "fresh");
    assert!(!dst.join("file.txt").exists());
}
