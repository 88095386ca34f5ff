// crates/cli/src/lib.rs

//! Command-line front end: argument handling, endpoint wiring and the
//! end-of-run summary. All tree work happens in the `engine` crate.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{ArgMatches, FromArgMatches};
use thiserror::Error;

use engine::{EngineError, Report, Side, SyncOptions, copy_tree, sync_trees};
use filters::{Matcher, Rule, RuleSet};
use vfs::{LocalFs, SftpFs};

mod dates;
mod endpoint;
mod options;
mod session;

pub use options::{Cli, cli_command};

use endpoint::Endpoint;

#[derive(Debug, Error)]
pub enum CliError {
    /// Bad arguments, caught before anything touches a filesystem.
    #[error("{0}")]
    Config(String),
    /// The remote side could not be reached or authenticated.
    #[error("{0}")]
    Connect(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Execute one run described by parsed arguments.
pub fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let opts = Cli::from_arg_matches(matches).map_err(|e| CliError::Config(e.to_string()))?;

    logging::init(logging::SubscriberConfig {
        verbose: opts.verbose,
        quiet: opts.quiet,
        colored: !opts.no_color,
    })
    .map_err(|e| CliError::Config(format!("could not set up logging: {e}")))?;

    let src = Endpoint::parse(&opts.source);
    let dst = Endpoint::parse(&opts.destination);
    if src.is_remote() && dst.is_remote() {
        return Err(CliError::Config(
            "at most one side may be remote".to_string(),
        ));
    }

    let sync_opts = SyncOptions {
        filters: build_matcher(matches)?,
        recursive: opts.recursive,
        max_depth: opts.max_depth,
        dirs_at_limit: opts.dirs_at_limit,
        force: opts.force,
        files_newer_than: opts
            .newer_than
            .as_deref()
            .map(dates::parse_date)
            .transpose()?,
        folders_newer_than: opts
            .folders_newer_than
            .as_deref()
            .map(dates::parse_date)
            .transpose()?,
        newest_files_only: opts.newest_only,
        newest_folders_only: opts.newest_folders_only,
        newest_filtered_only: opts.newest_filtered_only,
        preserve_times: opts.times,
        preserve_perms: opts.perms,
        create_dest_root: opts.create_dest,
        strict_conflicts: opts.strict_conflicts,
        strict_permissions: opts.strict_permissions,
    };

    let (src_name, dst_name) = designations(&src, &dst, opts.sync);
    let src_side = make_side(&src, src_name, &opts)?;
    let dst_side = make_side(&dst, dst_name, &opts)?;

    let started = Instant::now();
    let report = if opts.sync {
        sync_trees(&src_side, &dst_side, &sync_opts)?
    } else {
        copy_tree(&src_side, &dst_side, &sync_opts)?
    };
    summarize(&report, opts.sync, started.elapsed());
    Ok(())
}

/// Designations used in every message that names a side.
fn designations(src: &Endpoint, dst: &Endpoint, sync: bool) -> (&'static str, &'static str) {
    match (src.is_remote(), dst.is_remote()) {
        (true, false) => ("remote", "local"),
        (false, true) => ("local", "remote"),
        _ if sync => ("first", "second"),
        _ => ("source", "destination"),
    }
}

fn make_side(endpoint: &Endpoint, designation: &str, opts: &Cli) -> Result<Side, CliError> {
    let root = PathBuf::from(&endpoint.path);
    if let Some(host) = endpoint.host.as_deref() {
        let user = opts
            .user
            .clone()
            .or_else(|| endpoint.user.clone())
            .or_else(|| std::env::var("USER").ok())
            .ok_or_else(|| {
                CliError::Config(format!("a username is required to connect to \"{host}\""))
            })?;
        let credentials = session::Credentials {
            user,
            password: opts.password.as_deref(),
        };
        let (ssh, sftp) = session::connect(
            host,
            opts.port,
            &credentials,
            Duration::from_secs(opts.timeout),
        )?;
        let fs = SftpFs::new(ssh, sftp, designation, endpoint.is_unix());
        Ok(Side::new(Box::new(fs), root, designation))
    } else {
        Ok(Side::new(
            Box::new(LocalFs::new(designation)),
            root,
            designation,
        ))
    }
}

/// Fold the four include/exclude argument lists of one kind into a single
/// declaration-ordered rule set. The first declared rule fixes the
/// default: leading include means exclude-by-default and vice versa.
fn ordered_rules(
    matches: &ArgMatches,
    specs: &[(&str, bool, bool)],
) -> Result<RuleSet, CliError> {
    let mut tagged: Vec<(usize, Rule)> = Vec::new();
    for &(id, include, nocase) in specs {
        let (Some(values), Some(indices)) =
            (matches.get_many::<String>(id), matches.indices_of(id))
        else {
            continue;
        };
        for (value, index) in values.zip(indices) {
            let rule = Rule::new(value, include, nocase)
                .map_err(|e| CliError::Config(format!("bad pattern \"{value}\": {e}")))?;
            tagged.push((index, rule));
        }
    }
    tagged.sort_by_key(|(index, _)| *index);
    let default_include = tagged.first().map_or(true, |(_, rule)| !rule.include());
    Ok(RuleSet::new(
        tagged.into_iter().map(|(_, rule)| rule).collect(),
        default_include,
    ))
}

fn build_matcher(matches: &ArgMatches) -> Result<Matcher, CliError> {
    let files = ordered_rules(
        matches,
        &[
            ("include", true, false),
            ("exclude", false, false),
            ("include_nocase", true, true),
            ("exclude_nocase", false, true),
        ],
    )?;
    let folders = ordered_rules(
        matches,
        &[
            ("include_folder", true, false),
            ("exclude_folder", false, false),
            ("include_folder_nocase", true, true),
            ("exclude_folder_nocase", false, true),
        ],
    )?;
    Ok(Matcher::new(files, folders))
}

fn summarize(report: &Report, sync: bool, elapsed: Duration) {
    if sync {
        tracing::info!(
            "{} file(s) copied ({}), {} folder(s) created, {} file(s) and {} folder(s) deleted, {} warning(s) in {:.3} s",
            report.files_copied,
            logging::human_bytes(report.bytes_copied),
            report.dirs_created,
            report.files_deleted,
            report.dirs_deleted,
            report.warnings,
            elapsed.as_secs_f64()
        );
    } else {
        tracing::info!(
            "{} file(s) copied ({}), {} folder(s) created, {} warning(s) in {:.3} s",
            report.files_copied,
            logging::human_bytes(report.bytes_copied),
            report.dirs_created,
            report.warnings,
            elapsed.as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher_for(args: &[&str]) -> Matcher {
        let mut argv = vec!["treesync"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["src", "dst"]);
        let matches = cli_command().try_get_matches_from(argv).unwrap();
        build_matcher(&matches).unwrap()
    }

    #[test]
    fn leading_include_turns_the_default_to_exclude() {
        let m = matcher_for(&["-i", "*.txt", "-e", "draft*"]);
        assert!(!m.files().default_include());
        // "draft.txt" hits the earlier include rule and stays in; only
        // names the include misses reach the exclude or the default.
        assert!(m.matches("notes.txt", filters::NameKind::File));
        assert!(m.matches("draft.txt", filters::NameKind::File));
        assert!(!m.matches("draft.png", filters::NameKind::File));
        assert!(!m.matches("image.png", filters::NameKind::File));
    }

    #[test]
    fn leading_exclude_keeps_the_default_inclusive() {
        let m = matcher_for(&["-e", "*.tmp"]);
        assert!(m.files().default_include());
        assert!(!m.matches("scratch.tmp", filters::NameKind::File));
        assert!(m.matches("anything.rs", filters::NameKind::File));
    }

    #[test]
    fn an_earlier_rule_wins_over_a_later_one() {
        // The include is declared first, so the matching exception
        // beats the broader exclude.
        let m = matcher_for(&["-i", "keep.tmp", "-e", "*.tmp"]);
        assert!(m.matches("keep.tmp", filters::NameKind::File));
        assert!(!m.matches("other.tmp", filters::NameKind::File));
    }

    #[test]
    fn declaration_order_crosses_flag_kinds() {
        let m = matcher_for(&["-I", "build-keep", "-E", "build*"]);
        assert!(!m.folders().default_include());
        assert!(m.matches("build-keep", filters::NameKind::Folder));
        assert!(!m.matches("build-out", filters::NameKind::Folder));
    }

    #[test]
    fn nocase_variants_ignore_case() {
        let m = matcher_for(&["--exclude-nocase", "*.BAK"]);
        assert!(!m.matches("old.bak", filters::NameKind::File));
        assert!(!m.matches("OLD.BAK", filters::NameKind::File));
        assert!(m.matches("old.txt", filters::NameKind::File));
    }

    #[test]
    fn file_rules_do_not_leak_onto_folders() {
        let m = matcher_for(&["-i", "*.txt"]);
        assert!(!m.matches("image.png", filters::NameKind::File));
        assert!(m.matches("image.png", filters::NameKind::Folder));
    }
}
