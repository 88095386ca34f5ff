// crates/engine/src/step.rs

//! The per-entry pairing rule.
//!
//! One step function serves COPY mode, SYNC mode's forward pass and
//! SYNC mode's reverse pass; the caller swaps the side parameters to
//! change direction. Keeping a single code path is what guarantees the
//! shared sub-cases of the two modes never drift apart.

use std::io::{Read, Write};
use std::path::Path;

use vfs::{Entry, EntryKind, FsError};

use crate::{Context, Report, Result, Side, classify, copy, sync};

const COPY_BUF_SIZE: usize = 8192;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Copy,
    Sync,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Copy
    }
}

/// One recursion frame. Created per call, destroyed on return; the only
/// state flowing back out is the returned [`Report`].
pub(crate) struct Frame<'a> {
    pub(crate) src_dir: &'a Path,
    pub(crate) dst_dir: &'a Path,
    pub(crate) rel: &'a Path,
    pub(crate) depth: u32,
}

/// Skip thresholds for the current frame. `i64::MIN` disables one.
pub(crate) struct Thresholds {
    pub(crate) files: i64,
    pub(crate) folders: i64,
}

impl Thresholds {
    pub(crate) fn none() -> Self {
        Self {
            files: i64::MIN,
            folders: i64::MIN,
        }
    }

    /// Newest-destination thresholds, computed from the destination
    /// listing of this frame when the newer-than-newest options ask for
    /// them. The scan optionally honors the name filters.
    pub(crate) fn compute(cx: &Context<'_>, dst_entries: &[Entry]) -> Self {
        let mut thresholds = Self::none();
        if cx.opts.newest_files_only {
            thresholds.files = newest(cx, dst_entries, EntryKind::File);
        }
        if cx.opts.newest_folders_only {
            thresholds.folders = newest(cx, dst_entries, EntryKind::Dir);
        }
        thresholds
    }
}

fn newest(cx: &Context<'_>, entries: &[Entry], kind: EntryKind) -> i64 {
    entries
        .iter()
        .filter(|e| e.kind == kind)
        .filter(|e| {
            if !cx.opts.newest_filtered_only {
                return true;
            }
            let name_kind = match kind {
                EntryKind::Dir => filters::NameKind::Folder,
                _ => filters::NameKind::File,
            };
            cx.opts.filters.matches(&e.name, name_kind)
        })
        .map(|e| e.mtime)
        .fold(0, i64::max)
}

/// Apply the pairing rule to one source entry and its destination
/// counterpart, if any.
///
/// `descend` is true for the pass that owns recursion into a directory
/// pair; SYNC's reverse pass sets it false so each subtree is visited
/// exactly once per frame.
pub(crate) fn pair_entry(
    cx: &Context<'_>,
    src: &Side,
    dst: &Side,
    frame: &Frame<'_>,
    entry: &Entry,
    dest: Option<&Entry>,
    thresholds: &Thresholds,
    descend: bool,
) -> Result<Report> {
    let mut report = Report::default();
    let rel = frame.rel.join(&entry.name);
    let src_path = frame.src_dir.join(&entry.name);
    // A case-insensitive match may differ in spelling; address the
    // destination object by the name it actually has there.
    let dst_name = dest.map_or(entry.name.as_str(), |d| d.name.as_str());
    let dst_path = frame.dst_dir.join(dst_name);

    if let Some(dst_entry) = dest {
        if entry.kind != dst_entry.kind
            && !matches!(entry.kind, EntryKind::Other)
            && !matches!(dst_entry.kind, EntryKind::Other)
        {
            classify::on_type_conflict(cx, src, dst, &rel, entry, dst_entry)?;
            report.warnings += 1;
            report.skipped += 1;
            return Ok(report);
        }
    }

    match entry.kind {
        EntryKind::File => {
            if entry.mtime < cx.opts.files_newer_than.unwrap_or(i64::MIN) {
                tracing::debug!(
                    "\"{}\" - skipping because it is older than the files-newer-than date",
                    rel.display()
                );
                report.skipped += 1;
                return Ok(report);
            }
            if entry.mtime < thresholds.files {
                tracing::debug!(
                    "\"{}\" - skipping because it is older than the newest file already in the destination folder",
                    rel.display()
                );
                report.skipped += 1;
                return Ok(report);
            }
            let stale = dest.is_none_or(|d| d.mtime < entry.mtime);
            if !cx.opts.force && !stale {
                tracing::debug!(
                    "\"{}\" - skipping because the destination copy is at least as new",
                    rel.display()
                );
                report.skipped += 1;
                return Ok(report);
            }
            tracing::info!("{}", rel.display());
            match transfer(src, dst, &src_path, &dst_path) {
                Ok(bytes) => {
                    report.files_copied += 1;
                    report.bytes_copied += bytes;
                    propagate_metadata(cx, dst, &dst_path, &rel, entry, &mut report);
                }
                Err(e) => {
                    // A failed single-file transfer counts as an access
                    // error for that file only; siblings still run.
                    if cx.opts.strict_permissions {
                        return Err(e.into());
                    }
                    tracing::warn!("copying \"{}\" failed: {e} - skipping", rel.display());
                    report.warnings += 1;
                    report.skipped += 1;
                }
            }
        }
        EntryKind::Dir => {
            if entry.mtime < cx.opts.folders_newer_than.unwrap_or(i64::MIN) {
                tracing::debug!(
                    "\"{}\" - skipping because it is older than the folders-newer-than date",
                    rel.display()
                );
                report.skipped += 1;
                return Ok(report);
            }
            if entry.mtime < thresholds.folders {
                tracing::debug!(
                    "\"{}\" - skipping because it is older than the newest folder already in the destination folder",
                    rel.display()
                );
                report.skipped += 1;
                return Ok(report);
            }
            let enter = cx.may_enter(frame.depth);
            if dest.is_none() {
                if !enter && !cx.may_create_boundary_dir() {
                    tracing::trace!("\"{}\" - beyond the recursion depth", rel.display());
                    return Ok(report);
                }
                match dst.fs().make_dir(&dst_path) {
                    Ok(created) => {
                        if created {
                            tracing::info!("{}{}", rel.display(), std::path::MAIN_SEPARATOR);
                            report.dirs_created += 1;
                        }
                    }
                    Err(e) => {
                        classify::on_fs_error(cx, "creating folder", &rel, e)?;
                        report.warnings += 1;
                        report.skipped += 1;
                        return Ok(report);
                    }
                }
            }
            if cx.preserve_perms() && entry.mode != 0 {
                if let Err(e) = dst.fs().set_mode(&dst_path, entry.mode) {
                    classify::on_fs_error(cx, "setting permissions on", &rel, e)?;
                    report.warnings += 1;
                }
            }
            if enter && descend {
                let sub = match cx.mode {
                    Mode::Copy => copy::copy_dir(
                        cx,
                        src,
                        dst,
                        &src_path,
                        &dst_path,
                        &rel,
                        frame.depth + 1,
                    )?,
                    Mode::Sync => sync::sync_dir(
                        cx,
                        src,
                        dst,
                        &src_path,
                        &dst_path,
                        &rel,
                        frame.depth + 1,
                    )?,
                };
                report.absorb(sub);
            }
            // After recursion: creating children bumped the folder's own
            // mtime on most filesystems, so it is restored last.
            if cx.preserve_times() && dest.is_none_or(|d| entry.mtime > d.mtime) {
                if let Err(e) = dst.fs().set_times(&dst_path, entry.atime, entry.mtime) {
                    classify::on_fs_error(cx, "setting times on", &rel, e)?;
                    report.warnings += 1;
                }
            }
        }
        EntryKind::Other => {
            tracing::debug!(
                "\"{}\" - skipping because it is not a file nor a folder",
                rel.display()
            );
            report.skipped += 1;
        }
    }

    Ok(report)
}

fn propagate_metadata(
    cx: &Context<'_>,
    dst: &Side,
    dst_path: &Path,
    rel: &Path,
    entry: &Entry,
    report: &mut Report,
) {
    if cx.preserve_times() {
        if let Err(e) = dst.fs().set_times(dst_path, entry.atime, entry.mtime) {
            tracing::warn!("setting times on \"{}\" failed: {e}", rel.display());
            report.warnings += 1;
        }
    }
    if cx.preserve_perms() && entry.mode != 0 {
        if let Err(e) = dst.fs().set_mode(dst_path, entry.mode) {
            tracing::warn!("setting permissions on \"{}\" failed: {e}", rel.display());
            report.warnings += 1;
        }
    }
}

/// Pipe one file's content between the two adapters.
fn transfer(
    src: &Side,
    dst: &Side,
    src_path: &Path,
    dst_path: &Path,
) -> std::result::Result<u64, FsError> {
    let mut reader = src.fs().open(src_path)?;
    let mut writer = dst.fs().create(dst_path)?;
    let mut buf = [0u8; COPY_BUF_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| FsError::io(src_path, e))?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .map_err(|e| FsError::io(dst_path, e))?;
        total += n as u64;
    }
    writer.flush().map_err(|e| FsError::io(dst_path, e))?;
    Ok(total)
}
