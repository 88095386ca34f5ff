// crates/engine/src/sync.rs

//! SYNC mode: bidirectional recursion with deletion propagation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use vfs::{Entry, EntryKind};

use crate::step::{Frame, Thresholds, pair_entry};
use crate::{Context, Report, Result, Side, classify, delete, filter_entries, lookup_key, resolver};

pub(crate) fn sync_dir(
    cx: &Context<'_>,
    a: &Side,
    b: &Side,
    a_dir: &Path,
    b_dir: &Path,
    rel: &Path,
    depth: u32,
) -> Result<Report> {
    let mut report = Report::default();
    tracing::trace!(
        "reconciling \"{}\" with \"{}\"",
        a_dir.display(),
        b_dir.display()
    );

    let a_all = match a.fs().list(a_dir) {
        Ok(entries) => entries,
        Err(e) => {
            classify::on_fs_error(cx, "listing", rel, e)?;
            report.warnings += 1;
            return Ok(report);
        }
    };
    let b_all = match b.fs().list(b_dir) {
        Ok(entries) => entries,
        Err(e) => {
            classify::on_fs_error(cx, "listing", rel, e)?;
            report.warnings += 1;
            return Ok(report);
        }
    };

    let mut a_filtered = filter_entries(cx.opts, a_all.clone());
    let mut b_filtered = filter_entries(cx.opts, b_all.clone());

    let a_probe = a.fs().probe_case_sensitivity(a_dir);
    let b_probe = b.fs().probe_case_sensitivity(b_dir);
    let sensitive_pair = a_probe.sensitive && b_probe.sensitive;
    if !sensitive_pair {
        let probe_failed = a_probe.failed || b_probe.failed;
        a_filtered =
            resolver::drop_case_duplicates(a_filtered, rel, a.designation(), probe_failed, &mut report);
        b_filtered =
            resolver::drop_case_duplicates(b_filtered, rel, b.designation(), probe_failed, &mut report);
    }

    let a_map: BTreeMap<String, &Entry> = a_filtered
        .iter()
        .map(|e| (lookup_key(&e.name, sensitive_pair), e))
        .collect();
    let b_map: BTreeMap<String, &Entry> = b_filtered
        .iter()
        .map(|e| (lookup_key(&e.name, sensitive_pair), e))
        .collect();
    let a_unfiltered: HashMap<String, &Entry> = a_all
        .iter()
        .map(|e| (lookup_key(&e.name, sensitive_pair), e))
        .collect();
    let b_unfiltered: HashMap<String, &Entry> = b_all
        .iter()
        .map(|e| (lookup_key(&e.name, sensitive_pair), e))
        .collect();

    let newest_common = newest_common_date(&a_unfiltered, &b_unfiltered);

    let union: BTreeSet<&String> = a_map.keys().chain(b_map.keys()).collect();

    let forward = Frame {
        src_dir: a_dir,
        dst_dir: b_dir,
        rel,
        depth,
    };
    let reverse = Frame {
        src_dir: b_dir,
        dst_dir: a_dir,
        rel,
        depth,
    };
    // Newest-destination thresholds apply per direction, against the
    // listing of whichever side is receiving.
    let forward_thresholds = Thresholds::compute(cx, &b_all);
    let reverse_thresholds = Thresholds::compute(cx, &a_all);

    for key in union {
        match (a_map.get(key).copied(), b_map.get(key).copied()) {
            (Some(ea), Some(eb)) => {
                let sub = pair_entry(cx, a, b, &forward, ea, Some(eb), &forward_thresholds, true)?;
                report.absorb(sub);
                let sub = pair_entry(cx, b, a, &reverse, eb, Some(ea), &reverse_thresholds, false)?;
                report.absorb(sub);
            }
            (Some(ea), None) => {
                let sub = one_sided(
                    cx,
                    a,
                    b,
                    &forward,
                    ea,
                    b_unfiltered.contains_key(key),
                    newest_common,
                    &forward_thresholds,
                )?;
                report.absorb(sub);
            }
            (None, Some(eb)) => {
                let sub = one_sided(
                    cx,
                    b,
                    a,
                    &reverse,
                    eb,
                    a_unfiltered.contains_key(key),
                    newest_common,
                    &reverse_thresholds,
                )?;
                report.absorb(sub);
            }
            (None, None) => unreachable!("union key missing from both sides"),
        }
    }
    Ok(report)
}

/// Maximum mtime among file names present, unfiltered, on both sides
/// with equal timestamps: a proxy for the last state the two sides
/// demonstrably agreed on.
fn newest_common_date(
    a_unfiltered: &HashMap<String, &Entry>,
    b_unfiltered: &HashMap<String, &Entry>,
) -> i64 {
    let mut newest = i64::MIN;
    for (key, ea) in a_unfiltered {
        if ea.kind != EntryKind::File {
            continue;
        }
        if let Some(eb) = b_unfiltered.get(key) {
            if eb.kind == EntryKind::File && ea.mtime == eb.mtime {
                newest = newest.max(ea.mtime);
            }
        }
    }
    newest
}

/// Handle a name present on `holder` but filtered out of the paired
/// side's view. `frame` is oriented holder → other.
fn one_sided(
    cx: &Context<'_>,
    holder: &Side,
    other: &Side,
    frame: &Frame<'_>,
    entry: &Entry,
    other_has_unfiltered: bool,
    newest_common: i64,
    thresholds: &Thresholds,
) -> Result<Report> {
    let mut report = Report::default();
    let rel = frame.rel.join(&entry.name);

    if other_has_unfiltered {
        // The other side has the name but its filters hide it; the
        // asymmetry is explained by filtering, not by deletion.
        tracing::trace!(
            "\"{}\" - filtered out on the {} side, leaving it alone",
            rel.display(),
            other.designation()
        );
        return Ok(report);
    }

    if entry.mtime < newest_common {
        let path = frame.src_dir.join(&entry.name);
        match entry.kind {
            EntryKind::File => {
                tracing::info!(
                    "deleting \"{}\" from the {} side (removed on the {} side)",
                    rel.display(),
                    holder.designation(),
                    other.designation()
                );
                match holder.fs().remove_file(&path) {
                    Ok(()) => report.files_deleted += 1,
                    Err(e) => {
                        classify::on_fs_error(cx, "deleting", &rel, e)?;
                        report.warnings += 1;
                    }
                }
            }
            EntryKind::Dir => {
                tracing::info!(
                    "deleting folder \"{}\" from the {} side (removed on the {} side)",
                    rel.display(),
                    holder.designation(),
                    other.designation()
                );
                let sub = delete::remove_tree(cx, holder, &path, &rel)?;
                report.absorb(sub);
            }
            EntryKind::Other => {
                tracing::debug!(
                    "\"{}\" - not deleting because it is not a file nor a folder",
                    rel.display()
                );
            }
        }
        return Ok(report);
    }

    // New on this side; propagate it over.
    let sub = pair_entry(cx, holder, other, frame, entry, None, thresholds, true)?;
    report.absorb(sub);
    Ok(report)
}
