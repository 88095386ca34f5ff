// crates/engine/src/copy.rs

//! COPY mode: one-directional recursion.

use std::collections::HashMap;
use std::path::Path;

use vfs::Entry;

use crate::step::{Frame, Thresholds, pair_entry};
use crate::{Context, Report, Result, Side, classify, filter_entries, lookup_key, resolver};

pub(crate) fn copy_dir(
    cx: &Context<'_>,
    src: &Side,
    dst: &Side,
    src_dir: &Path,
    dst_dir: &Path,
    rel: &Path,
    depth: u32,
) -> Result<Report> {
    let mut report = Report::default();
    tracing::trace!(
        "entering {} folder \"{}\"",
        src.designation(),
        src_dir.display()
    );

    let src_entries = match src.fs().list(src_dir) {
        Ok(entries) => entries,
        Err(e) => {
            classify::on_fs_error(cx, "listing", rel, e)?;
            report.warnings += 1;
            return Ok(report);
        }
    };
    let mut src_entries = filter_entries(cx.opts, src_entries);

    let src_probe = src.fs().probe_case_sensitivity(src_dir);
    let dst_probe = dst.fs().probe_case_sensitivity(dst_dir);
    if src_probe.sensitive && !dst_probe.sensitive {
        src_entries = resolver::drop_case_duplicates(
            src_entries,
            rel,
            src.designation(),
            src_probe.failed || dst_probe.failed,
            &mut report,
        );
    }

    // The destination is listed unfiltered: filters select what to copy,
    // not what may already be there.
    let dst_entries = match dst.fs().list(dst_dir) {
        Ok(entries) => entries,
        Err(e) => {
            classify::on_fs_error(cx, "listing", rel, e)?;
            report.warnings += 1;
            return Ok(report);
        }
    };

    let lookup: HashMap<String, &Entry> = dst_entries
        .iter()
        .map(|entry| (lookup_key(&entry.name, dst_probe.sensitive), entry))
        .collect();
    let thresholds = Thresholds::compute(cx, &dst_entries);

    let frame = Frame {
        src_dir,
        dst_dir,
        rel,
        depth,
    };
    for entry in &src_entries {
        let dest = lookup
            .get(&lookup_key(&entry.name, dst_probe.sensitive))
            .copied();
        let sub = pair_entry(cx, src, dst, &frame, entry, dest, &thresholds, true)?;
        report.absorb(sub);
    }
    Ok(report)
}
