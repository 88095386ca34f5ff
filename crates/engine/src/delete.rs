// crates/engine/src/delete.rs

//! Depth-first removal of a whole subtree on one side.

use std::path::Path;

use vfs::EntryKind;

use crate::{Context, Report, Result, Side, classify};

/// Remove `path` and everything under it from `side`. Children that
/// cannot be removed are warned about under the lenient permission
/// policy and left in place; the directory itself then stays too.
pub(crate) fn remove_tree(
    cx: &Context<'_>,
    side: &Side,
    path: &Path,
    rel: &Path,
) -> Result<Report> {
    let mut report = Report::default();

    let entries = match side.fs().list(path) {
        Ok(entries) => entries,
        Err(e) => {
            classify::on_fs_error(cx, "listing", rel, e)?;
            report.warnings += 1;
            return Ok(report);
        }
    };

    let mut blocked = false;
    for entry in &entries {
        let child = path.join(&entry.name);
        let child_rel = rel.join(&entry.name);
        match entry.kind {
            EntryKind::File => match side.fs().remove_file(&child) {
                Ok(()) => report.files_deleted += 1,
                Err(e) => {
                    classify::on_fs_error(cx, "deleting", &child_rel, e)?;
                    report.warnings += 1;
                    blocked = true;
                }
            },
            EntryKind::Dir => {
                let warnings_before = report.warnings;
                let sub = remove_tree(cx, side, &child, &child_rel)?;
                report.absorb(sub);
                if report.warnings > warnings_before {
                    blocked = true;
                }
            }
            EntryKind::Other => {
                tracing::warn!(
                    "\"{}\" is not a file nor a folder - not deleting it",
                    child_rel.display()
                );
                report.warnings += 1;
                blocked = true;
            }
        }
    }

    match side.fs().remove_dir(path) {
        Ok(()) => report.dirs_deleted += 1,
        Err(e) => {
            if blocked {
                // The surviving child already produced its warning.
                tracing::debug!(
                    "leaving folder \"{}\" in place because some of its content survived",
                    rel.display()
                );
            } else {
                classify::on_fs_error(cx, "deleting folder", rel, e)?;
                report.warnings += 1;
            }
        }
    }
    Ok(report)
}
