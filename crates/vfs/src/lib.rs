// crates/vfs/src/lib.rs

//! Filesystem adapters for the sync engine.
//!
//! One [`Filesystem`] trait covers everything the engine needs; it is
//! implemented once per backend ([`LocalFs`], [`SftpFs`]) and selected by
//! the caller at startup. All operations block; on the remote backend each
//! call is a full protocol round-trip.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

mod error;
mod local;
mod sftp;

pub use error::{FsError, Result};
pub use local::LocalFs;
pub use sftp::SftpFs;

/// What kind of object a listing entry refers to.
///
/// `Other` covers symlinks, devices, sockets and the like; such entries
/// are only ever logged, never copied or deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

impl EntryKind {
    pub fn is_file(self) -> bool {
        matches!(self, EntryKind::File)
    }

    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Dir)
    }

    /// Human label used in conflict and skip messages.
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "folder",
            EntryKind::Other => "special file",
        }
    }
}

/// One filesystem object as seen by a listing call.
///
/// `name` never contains path separators. Timestamps have whole-second
/// resolution; `mode` carries Unix permission bits and is zero on
/// non-Unix endpoints.
#[derive(Clone, Debug)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub mode: u32,
    pub mtime: i64,
    pub atime: i64,
}

/// Result of a case-sensitivity probe.
///
/// When the probe fails, `sensitive` holds the backend's platform
/// fallback rather than an observed answer.
#[derive(Clone, Copy, Debug)]
pub struct CaseProbe {
    pub failed: bool,
    pub sensitive: bool,
}

/// Capability set the engine consumes, implemented once per backend.
pub trait Filesystem {
    /// Human designation for messages ("local", "remote").
    fn designation(&self) -> &str;

    /// Whether permission bits are meaningful on this endpoint.
    fn is_unix(&self) -> bool;

    /// Sensitivity to assume when the probe cannot decide: case-sensitive
    /// for Unix-like endpoints, case-insensitive for Windows-like ones.
    fn case_fallback(&self) -> bool;

    /// List a directory. Entry names are unique within one call's result
    /// before case folding; ordering is by name.
    fn list(&self, path: &Path) -> Result<Vec<Entry>>;

    fn stat(&self, path: &Path) -> Result<Entry>;

    /// Returns `true` if the directory was created, `false` if it already
    /// existed.
    fn make_dir(&self, path: &Path) -> Result<bool>;

    fn make_dir_all(&self, path: &Path) -> Result<()>;

    fn set_times(&self, path: &Path, atime: i64, mtime: i64) -> Result<()>;

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;

    fn open(&self, path: &Path) -> Result<Box<dyn Read + '_>>;

    fn create(&self, path: &Path) -> Result<Box<dyn Write + '_>>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Non-recursive; the engine walks the tree first.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Best-effort probe of whether `path` lives on a case-sensitive
    /// filesystem.
    ///
    /// Two listed names that fold to the same key prove sensitivity
    /// outright. Otherwise an existing name is case-flipped and stat'd:
    /// a hit with matching identity means insensitive, a miss means
    /// sensitive. With no usable candidate the probe reports failure
    /// plus the platform fallback.
    fn probe_case_sensitivity(&self, path: &Path) -> CaseProbe {
        let entries = match self.list(path) {
            Ok(entries) => entries,
            Err(_) => {
                return CaseProbe {
                    failed: true,
                    sensitive: self.case_fallback(),
                };
            }
        };

        let mut folded: HashMap<String, &str> = HashMap::new();
        for entry in &entries {
            let key = entry.name.to_lowercase();
            if let Some(prev) = folded.get(key.as_str()) {
                if *prev != entry.name {
                    return CaseProbe {
                        failed: false,
                        sensitive: true,
                    };
                }
            } else {
                folded.insert(key, &entry.name);
            }
        }

        for entry in &entries {
            let flipped = flip_case(&entry.name);
            if flipped == entry.name {
                continue;
            }
            return match self.stat(&path.join(&flipped)) {
                Ok(hit) => {
                    let same_object =
                        hit.kind == entry.kind && hit.size == entry.size && hit.mtime == entry.mtime;
                    CaseProbe {
                        failed: false,
                        sensitive: !same_object,
                    }
                }
                Err(FsError::NotFound(_)) => CaseProbe {
                    failed: false,
                    sensitive: true,
                },
                Err(_) => CaseProbe {
                    failed: true,
                    sensitive: self.case_fallback(),
                },
            };
        }

        CaseProbe {
            failed: true,
            sensitive: self.case_fallback(),
        }
    }
}

fn flip_case(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}
