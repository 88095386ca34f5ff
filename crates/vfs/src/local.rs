// crates/vfs/src/local.rs

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use filetime::FileTime;

use crate::{Entry, EntryKind, Filesystem, FsError, Result};

/// Adapter over the process-local filesystem.
pub struct LocalFs {
    designation: String,
}

impl LocalFs {
    pub fn new(designation: impl Into<String>) -> Self {
        Self {
            designation: designation.into(),
        }
    }

    fn entry_from_metadata(name: String, meta: &fs::Metadata) -> Entry {
        let kind = if meta.file_type().is_file() {
            EntryKind::File
        } else if meta.file_type().is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        };
        Entry {
            name,
            kind,
            size: meta.len(),
            mode: mode_bits(meta),
            mtime: FileTime::from_last_modification_time(meta).unix_seconds(),
            atime: FileTime::from_last_access_time(meta).unix_seconds(),
        }
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(_meta: &fs::Metadata) -> u32 {
    0
}

impl Filesystem for LocalFs {
    fn designation(&self) -> &str {
        &self.designation
    }

    fn is_unix(&self) -> bool {
        cfg!(unix)
    }

    fn case_fallback(&self) -> bool {
        !cfg!(windows)
    }

    fn list(&self, path: &Path) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let iter = fs::read_dir(path).map_err(|e| FsError::io(path, e))?;
        for item in iter {
            let item = item.map_err(|e| FsError::io(path, e))?;
            let meta = item
                .path()
                .symlink_metadata()
                .map_err(|e| FsError::io(&item.path(), e))?;
            let name = item.file_name().to_string_lossy().into_owned();
            entries.push(Self::entry_from_metadata(name, &meta));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Result<Entry> {
        let meta = fs::symlink_metadata(path).map_err(|e| FsError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::entry_from_metadata(name, &meta))
    }

    fn make_dir(&self, path: &Path) -> Result<bool> {
        match fs::create_dir(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(FsError::io(path, e)),
        }
    }

    fn make_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| FsError::io(path, e))
    }

    fn set_times(&self, path: &Path, atime: i64, mtime: i64) -> Result<()> {
        filetime::set_file_times(
            path,
            FileTime::from_unix_time(atime, 0),
            FileTime::from_unix_time(mtime, 0),
        )
        .map_err(|e| FsError::io(path, e))
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| FsError::io(path, e))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, _path: &Path, _mode: u32) -> Result<()> {
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Read + '_>> {
        let file = File::open(path).map_err(|e| FsError::io(path, e))?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &Path) -> Result<Box<dyn Write + '_>> {
        let file = File::create(path).map_err(|e| FsError::io(path, e))?;
        Ok(Box::new(file))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| FsError::io(path, e))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path).map_err(|e| FsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn list_is_sorted_and_typed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"bb").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let fs = LocalFs::new("local");
        let entries = fs.list(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "sub"]);
        assert!(entries[0].kind.is_file());
        assert_eq!(entries[0].size, 1);
        assert!(entries[2].kind.is_dir());
    }

    #[test]
    fn list_missing_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new("local");
        let err = fs.list(&dir.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn make_dir_reports_created_versus_existing() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new("local");
        let path = dir.path().join("d");
        assert!(fs.make_dir(&path).unwrap());
        assert!(!fs.make_dir(&path).unwrap());
    }

    #[test]
    fn set_times_round_trips_through_stat() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new("local");
        let path = dir.path().join("f");
        std::fs::write(&path, b"x").unwrap();
        fs.set_times(&path, 1_600_000_000, 1_500_000_000).unwrap();
        let entry = fs.stat(&path).unwrap();
        assert_eq!(entry.mtime, 1_500_000_000);
    }

    #[cfg(unix)]
    #[test]
    fn probe_reports_sensitive_on_unix() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Probe.txt"), b"x").unwrap();
        let fs = LocalFs::new("local");
        let probe = fs.probe_case_sensitivity(dir.path());
        assert!(!probe.failed);
        assert!(probe.sensitive);
    }

    #[test]
    fn probe_with_no_candidates_falls_back() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("1234"), b"x").unwrap();
        let fs = LocalFs::new("local");
        let probe = fs.probe_case_sensitivity(dir.path());
        assert!(probe.failed);
        assert_eq!(probe.sensitive, fs.case_fallback());
    }
}
