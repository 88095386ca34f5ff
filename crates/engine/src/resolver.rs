// crates/engine/src/resolver.rs

//! Case-only-duplicate detection.
//!
//! When one side of a pair is case-insensitive, names from the other
//! side that collide after folding cannot be represented there. Each
//! colliding group is reported and withheld from the current step in
//! its entirety: none of its members are copied or deleted until the
//! user renames them or makes the insensitive side case-sensitive.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use vfs::Entry;

use crate::{Report, fold};

/// Group names that are identical after case folding but differ in
/// original case. Listing names are unique pre-fold, so any group with
/// more than one member is a genuine collision.
pub(crate) fn case_duplicate_groups(entries: &[Entry]) -> Vec<Vec<String>> {
    let mut by_fold: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in entries {
        by_fold
            .entry(fold(&entry.name))
            .or_default()
            .push(entry.name.clone());
    }
    by_fold
        .into_values()
        .filter(|group| group.len() > 1)
        .collect()
}

/// Drop duplicate groups from `entries`, warning once per group. With no
/// groups but a failed probe, note that the failure did not matter.
pub(crate) fn drop_case_duplicates(
    entries: Vec<Entry>,
    rel: &Path,
    designation: &str,
    probe_failed: bool,
    report: &mut Report,
) -> Vec<Entry> {
    let groups = case_duplicate_groups(&entries);
    if groups.is_empty() {
        if probe_failed {
            tracing::info!(
                "a case-sensitivity probe failed in \"{}\", but no names there differ only by case, so the failure is harmless",
                rel.display()
            );
        }
        return entries;
    }

    let mut excluded: HashSet<String> = HashSet::new();
    for group in &groups {
        tracing::warn!(
            "names in \"{}\" on the {} side differ only by case and cannot be represented on a case-insensitive side: {} - excluding all of them",
            rel.display(),
            designation,
            group.join(", ")
        );
        report.warnings += 1;
        report.skipped += group.len() as u64;
        for name in group {
            excluded.insert(fold(name));
        }
    }

    entries
        .into_iter()
        .filter(|entry| !excluded.contains(&fold(&entry.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfs::EntryKind;

    fn entry(name: &str) -> Entry {
        Entry {
            name: name.into(),
            kind: EntryKind::File,
            size: 0,
            mode: 0,
            mtime: 0,
            atime: 0,
        }
    }

    #[test]
    fn detects_folded_collisions() {
        let entries = vec![entry("Readme.md"), entry("README.md"), entry("other.txt")];
        let groups = case_duplicate_groups(&entries);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec!["Readme.md".to_string(), "README.md".to_string()]);
    }

    #[test]
    fn no_groups_without_collisions() {
        let entries = vec![entry("a"), entry("b")];
        assert!(case_duplicate_groups(&entries).is_empty());
    }

    #[test]
    fn drops_every_member_of_a_group() {
        let entries = vec![entry("Readme.md"), entry("README.md"), entry("keep.txt")];
        let mut report = Report::default();
        let kept = drop_case_duplicates(entries, Path::new(""), "source", false, &mut report);
        let names: Vec<_> = kept.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["keep.txt"]);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.skipped, 2);
    }
}
