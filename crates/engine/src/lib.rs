// crates/engine/src/lib.rs

//! Recursive copy/sync core.
//!
//! [`copy_tree`] propagates one directory tree onto another; [`sync_trees`]
//! reconciles two trees in both directions, inferring deletions. Both walk
//! the trees in lock-step depth-first recursion, decide per entry whether
//! to copy, skip, recurse or delete, and delegate all I/O to the
//! [`vfs::Filesystem`] adapters bound into each [`Side`].

use std::path::{Path, PathBuf};

use filters::Matcher;
use thiserror::Error;
use vfs::{Entry, EntryKind, Filesystem, FsError};

mod classify;
mod copy;
mod delete;
mod resolver;
mod step;
mod sync;

pub use step::Mode;

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("the {designation} folder \"{}\" does not exist or is not a folder", path.display())]
    RootMissing { designation: String, path: PathBuf },
    #[error(
        "type conflict at \"{}\": {src_kind} on the {src_side} side, {dst_kind} on the {dst_side} side",
        path.display()
    )]
    TypeConflict {
        path: PathBuf,
        src_kind: &'static str,
        src_side: String,
        dst_kind: &'static str,
        dst_side: String,
    },
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// One endpoint bound to an adapter and a root path. Immutable for the
/// duration of a run.
pub struct Side {
    fs: Box<dyn Filesystem>,
    root: PathBuf,
    designation: String,
}

impl Side {
    pub fn new(
        fs: Box<dyn Filesystem>,
        root: impl Into<PathBuf>,
        designation: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            designation: designation.into(),
        }
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }
}

/// Behavior switches for one run. Fixed before traversal starts.
#[derive(Clone, Debug, Default)]
pub struct SyncOptions {
    pub filters: Matcher,
    pub recursive: bool,
    /// Maximum recursion frame count when `recursive`; `None` is unlimited.
    pub max_depth: Option<u32>,
    /// Create folders sitting at the recursion boundary even when they
    /// cannot be entered.
    pub dirs_at_limit: bool,
    pub force: bool,
    pub files_newer_than: Option<i64>,
    pub folders_newer_than: Option<i64>,
    /// Skip files older than the newest file already in the destination
    /// directory (recomputed per frame).
    pub newest_files_only: bool,
    /// Same threshold applied to folders.
    pub newest_folders_only: bool,
    /// Restrict the newest-destination scan to entries passing the filters.
    pub newest_filtered_only: bool,
    pub preserve_times: bool,
    /// Only honored when both endpoints are Unix-like.
    pub preserve_perms: bool,
    pub create_dest_root: bool,
    /// Abort on type conflicts instead of warning and skipping.
    pub strict_conflicts: bool,
    /// Abort on access denials instead of warning and skipping.
    pub strict_permissions: bool,
}

/// Per-call outcome record, folded at each call site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub files_copied: u64,
    pub bytes_copied: u64,
    pub dirs_created: u64,
    pub files_deleted: u64,
    pub dirs_deleted: u64,
    pub skipped: u64,
    pub warnings: u64,
}

impl Report {
    pub fn absorb(&mut self, other: Report) {
        self.files_copied += other.files_copied;
        self.bytes_copied += other.bytes_copied;
        self.dirs_created += other.dirs_created;
        self.files_deleted += other.files_deleted;
        self.dirs_deleted += other.dirs_deleted;
        self.skipped += other.skipped;
        self.warnings += other.warnings;
    }

    /// Total number of modifications made to either side.
    pub fn changes(&self) -> u64 {
        self.files_copied + self.dirs_created + self.files_deleted + self.dirs_deleted
    }
}

pub(crate) struct Context<'a> {
    pub(crate) opts: &'a SyncOptions,
    pub(crate) mode: Mode,
    pub(crate) both_unix: bool,
}

impl Context<'_> {
    /// Whether a frame at `depth` may recurse into a child frame.
    pub(crate) fn may_enter(&self, depth: u32) -> bool {
        self.opts.recursive && self.opts.max_depth.is_none_or(|max| depth + 1 < max)
    }

    /// Whether a folder that cannot be entered is still created.
    pub(crate) fn may_create_boundary_dir(&self) -> bool {
        self.opts.recursive || self.opts.dirs_at_limit
    }

    pub(crate) fn preserve_times(&self) -> bool {
        // SYNC must pin mtimes on the copies it makes or the next run
        // would see them as fresh changes and copy them back.
        self.opts.preserve_times || self.mode == Mode::Sync
    }

    pub(crate) fn preserve_perms(&self) -> bool {
        self.opts.preserve_perms && self.both_unix
    }
}

/// One-directional propagation from `src` to `dst`. No deletions.
pub fn copy_tree(src: &Side, dst: &Side, opts: &SyncOptions) -> Result<Report> {
    ensure_source_root(src)?;
    ensure_dest_root(dst, opts.create_dest_root)?;
    let cx = Context {
        opts,
        mode: Mode::Copy,
        both_unix: src.fs().is_unix() && dst.fs().is_unix(),
    };
    copy::copy_dir(&cx, src, dst, src.root(), dst.root(), Path::new(""), 0)
}

/// Bidirectional reconciliation of `a` and `b`, with deletion propagation.
///
/// A name present on only one side is treated as deleted on the other
/// when it is strictly older than the newest timestamp the two sides
/// demonstrably agreed on. Clock skew or truncated timestamps can make
/// that heuristic both over- and under-delete; this is a documented
/// limitation, not a defect.
pub fn sync_trees(a: &Side, b: &Side, opts: &SyncOptions) -> Result<Report> {
    ensure_source_root(a)?;
    ensure_dest_root(b, opts.create_dest_root)?;
    let cx = Context {
        opts,
        mode: Mode::Sync,
        both_unix: a.fs().is_unix() && b.fs().is_unix(),
    };
    sync::sync_dir(&cx, a, b, a.root(), b.root(), Path::new(""), 0)
}

fn ensure_source_root(side: &Side) -> Result<()> {
    match side.fs().stat(side.root()) {
        Ok(entry) if entry.kind.is_dir() => Ok(()),
        Ok(_) => Err(root_missing(side)),
        Err(e) if e.is_not_found() => Err(root_missing(side)),
        Err(e) => Err(e.into()),
    }
}

fn ensure_dest_root(side: &Side, create: bool) -> Result<()> {
    match side.fs().stat(side.root()) {
        Ok(entry) if entry.kind.is_dir() => Ok(()),
        Ok(_) => Err(root_missing(side)),
        Err(e) if e.is_not_found() => {
            if create {
                tracing::info!(
                    "creating the {} folder \"{}\"",
                    side.designation(),
                    side.root().display()
                );
                side.fs().make_dir_all(side.root())?;
                Ok(())
            } else {
                Err(root_missing(side))
            }
        }
        Err(e) => Err(e.into()),
    }
}

fn root_missing(side: &Side) -> EngineError {
    EngineError::RootMissing {
        designation: side.designation().to_string(),
        path: side.root().to_path_buf(),
    }
}

/// Apply the configured name filters to a raw listing. `Other` entries
/// pass through so the per-entry step can log them.
pub(crate) fn filter_entries(opts: &SyncOptions, entries: Vec<Entry>) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|entry| match entry.kind {
            EntryKind::File => opts.filters.matches(&entry.name, filters::NameKind::File),
            EntryKind::Dir => opts.filters.matches(&entry.name, filters::NameKind::Folder),
            EntryKind::Other => true,
        })
        .collect()
}

/// Case-fold a name for insensitive comparison.
pub(crate) fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Lookup key for an entry name, folded only when the holding side is
/// case-insensitive.
pub(crate) fn lookup_key(name: &str, sensitive: bool) -> String {
    if sensitive {
        name.to_string()
    } else {
        fold(name)
    }
}
