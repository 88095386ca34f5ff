// crates/engine/src/classify.rs

//! Conflict and permission error classification.
//!
//! Two independent policy switches, both lenient by default: a type
//! conflict or an access denial is a warning and a skip unless the
//! corresponding strict flag turns it fatal. Anything that is neither
//! propagates unchanged.

use std::path::Path;

use vfs::{Entry, FsError};

use crate::{Context, EngineError, Result, Side};

/// A file meets a directory of the same name (or vice versa).
pub(crate) fn on_type_conflict(
    cx: &Context<'_>,
    src: &Side,
    dst: &Side,
    rel: &Path,
    src_entry: &Entry,
    dst_entry: &Entry,
) -> Result<()> {
    if cx.opts.strict_conflicts {
        return Err(EngineError::TypeConflict {
            path: rel.to_path_buf(),
            src_kind: src_entry.kind.label(),
            src_side: src.designation().to_string(),
            dst_kind: dst_entry.kind.label(),
            dst_side: dst.designation().to_string(),
        });
    }
    tracing::warn!(
        "\"{}\" is a {} on the {} side but a {} on the {} side - skipping",
        rel.display(),
        src_entry.kind.label(),
        src.designation(),
        dst_entry.kind.label(),
        dst.designation()
    );
    Ok(())
}

/// An adapter operation failed. Returns `Ok(())` when the error was an
/// access denial under the lenient policy (the caller warns, skips and
/// carries on); otherwise the error is fatal.
pub(crate) fn on_fs_error(cx: &Context<'_>, what: &str, rel: &Path, err: FsError) -> Result<()> {
    if err.is_permission() && !cx.opts.strict_permissions {
        tracing::warn!("{what} \"{}\" failed: {err} - skipping", rel.display());
        return Ok(());
    }
    Err(err.into())
}
