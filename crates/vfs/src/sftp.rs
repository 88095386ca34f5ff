// crates/vfs/src/sftp.rs

use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use ssh2::{ErrorCode, FileStat, Session, Sftp};

use crate::{Entry, EntryKind, Filesystem, FsError, Result};

// SFTP status codes (SSH_FXP_STATUS).
const FX_NO_SUCH_FILE: i32 = 2;
const FX_PERMISSION_DENIED: i32 = 3;
const FX_FAILURE: i32 = 4;
const FX_BAD_MESSAGE: i32 = 5;
const FX_NO_SUCH_PATH: i32 = 10;

/// Adapter over a blocking SFTP channel.
///
/// The session stays open for the lifetime of the adapter; every call is
/// one or more protocol round-trips.
pub struct SftpFs {
    // Held so the authenticated session outlives the channel even though
    // `Sftp` keeps its own handle on the transport.
    _session: Session,
    sftp: Sftp,
    designation: String,
    unix: bool,
}

impl SftpFs {
    pub fn new(session: Session, sftp: Sftp, designation: impl Into<String>, unix: bool) -> Self {
        Self {
            _session: session,
            sftp,
            designation: designation.into(),
            unix,
        }
    }

    /// Classify an SFTP error.
    ///
    /// Servers are inconsistent about reporting denied operations: some
    /// answer PERMISSION_DENIED, others a bare FAILURE or BAD_MESSAGE
    /// status. All three count as access denials here, plus a match on
    /// the literal response text for servers that only set a message.
    fn classify(&self, path: &Path, err: ssh2::Error) -> FsError {
        let denial = match err.code() {
            ErrorCode::SFTP(FX_NO_SUCH_FILE) | ErrorCode::SFTP(FX_NO_SUCH_PATH) => {
                return FsError::NotFound(path.to_path_buf());
            }
            ErrorCode::SFTP(FX_PERMISSION_DENIED)
            | ErrorCode::SFTP(FX_FAILURE)
            | ErrorCode::SFTP(FX_BAD_MESSAGE) => true,
            _ => {
                let text = err.message().to_lowercase();
                text.contains("permission denied")
                    || text.contains("failure")
                    || text.contains("bad message")
            }
        };
        if denial {
            FsError::PermissionDenied {
                path: path.to_path_buf(),
                detail: err.message().to_string(),
            }
        } else {
            FsError::Remote {
                path: path.to_path_buf(),
                message: err.message().to_string(),
            }
        }
    }

    fn entry_from_stat(&self, name: String, stat: &FileStat) -> Entry {
        let kind = if stat.is_dir() {
            EntryKind::Dir
        } else if stat.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Entry {
            name,
            kind,
            size: stat.size.unwrap_or(0),
            mode: if self.unix {
                stat.perm.unwrap_or(0) & 0o7777
            } else {
                0
            },
            mtime: stat.mtime.unwrap_or(0) as i64,
            atime: stat.atime.unwrap_or(0) as i64,
        }
    }
}

impl Filesystem for SftpFs {
    fn designation(&self) -> &str {
        &self.designation
    }

    fn is_unix(&self) -> bool {
        self.unix
    }

    fn case_fallback(&self) -> bool {
        self.unix
    }

    fn list(&self, path: &Path) -> Result<Vec<Entry>> {
        let listing = self.sftp.readdir(path).map_err(|e| self.classify(path, e))?;
        let mut entries = Vec::with_capacity(listing.len());
        for (item_path, stat) in listing {
            let name = match item_path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            if name == "." || name == ".." {
                continue;
            }
            entries.push(self.entry_from_stat(name, &stat));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Result<Entry> {
        let stat = self.sftp.stat(path).map_err(|e| self.classify(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.entry_from_stat(name, &stat))
    }

    fn make_dir(&self, path: &Path) -> Result<bool> {
        // Probe first: servers answer FAILURE for mkdir on an existing
        // path, which the denial heuristic would misread.
        match self.stat(path) {
            Ok(entry) if entry.kind.is_dir() => return Ok(false),
            Ok(_) => {
                return Err(FsError::Remote {
                    path: path.to_path_buf(),
                    message: "exists and is not a folder".into(),
                });
            }
            Err(FsError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        self.sftp
            .mkdir(path, 0o755)
            .map_err(|e| self.classify(path, e))?;
        Ok(true)
    }

    fn make_dir_all(&self, path: &Path) -> Result<()> {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if matches!(component, Component::RootDir | Component::Prefix(_)) {
                continue;
            }
            match self.stat(&current) {
                Ok(_) => {}
                Err(FsError::NotFound(_)) => {
                    self.sftp
                        .mkdir(&current, 0o755)
                        .map_err(|e| self.classify(&current, e))?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn set_times(&self, path: &Path, atime: i64, mtime: i64) -> Result<()> {
        let stat = FileStat {
            size: None,
            uid: None,
            gid: None,
            perm: None,
            atime: Some(atime.max(0) as u64),
            mtime: Some(mtime.max(0) as u64),
        };
        self.sftp
            .setstat(path, stat)
            .map_err(|e| self.classify(path, e))
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        let stat = FileStat {
            size: None,
            uid: None,
            gid: None,
            perm: Some(mode),
            atime: None,
            mtime: None,
        };
        self.sftp
            .setstat(path, stat)
            .map_err(|e| self.classify(path, e))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Read + '_>> {
        let file = self.sftp.open(path).map_err(|e| self.classify(path, e))?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &Path) -> Result<Box<dyn Write + '_>> {
        let file = self.sftp.create(path).map_err(|e| self.classify(path, e))?;
        Ok(Box::new(file))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.sftp.unlink(path).map_err(|e| self.classify(path, e))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.sftp.rmdir(path).map_err(|e| self.classify(path, e))
    }
}
