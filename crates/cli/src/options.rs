// crates/cli/src/options.rs

use clap::{ArgAction, CommandFactory, Parser};

/// Command-line surface of the `treesync` binary.
#[derive(Parser, Debug)]
#[command(
    name = "treesync",
    version,
    about = "Copy or synchronize directory trees, locally or over SFTP",
    after_help = "Either tree may be remote (`[user@]host:path`), but not both.\n\
                  DATE accepts 2024, 2024-06, 2024-06-15, 2024-06-15 14,\n\
                  2024-06-15 14:30 or 2024-06-15 14:30:00."
)]
pub struct Cli {
    /// Source tree, `[user@]host:path` or a local path
    pub source: String,

    /// Destination tree
    pub destination: String,

    /// Reconcile both trees instead of copying one onto the other
    #[arg(short = 's', long, help_heading = "Mode")]
    pub sync: bool,

    #[arg(short, long, help_heading = "Selection")]
    pub recursive: bool,

    /// Limit recursion to N folder levels
    #[arg(long, value_name = "N", requires = "recursive", help_heading = "Selection")]
    pub max_depth: Option<u32>,

    /// Create folders at the depth limit without entering them
    #[arg(long, help_heading = "Selection")]
    pub dirs_at_limit: bool,

    /// Copy files even when the destination copy is up to date
    #[arg(long, help_heading = "Selection")]
    pub force: bool,

    /// Only touch files modified on DATE or later
    #[arg(short = 'n', long, value_name = "DATE", help_heading = "Selection")]
    pub newer_than: Option<String>,

    /// Only touch folders modified on DATE or later
    #[arg(short = 'f', long, value_name = "DATE", help_heading = "Selection")]
    pub folders_newer_than: Option<String>,

    /// Skip files older than the newest file already in the destination folder
    #[arg(short = 'N', long, help_heading = "Selection")]
    pub newest_only: bool,

    /// Same, for folders
    #[arg(short = 'M', long, help_heading = "Selection")]
    pub newest_folders_only: bool,

    /// Restrict the newest-destination scan to entries matching the filters
    #[arg(long, help_heading = "Selection")]
    pub newest_filtered_only: bool,

    /// Include files matching GLOB (declaration order matters)
    #[arg(short = 'i', long = "include", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub include: Vec<String>,

    /// Exclude files matching GLOB
    #[arg(short = 'e', long = "exclude", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub exclude: Vec<String>,

    /// Include files matching GLOB, ignoring case
    #[arg(long = "include-nocase", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub include_nocase: Vec<String>,

    /// Exclude files matching GLOB, ignoring case
    #[arg(long = "exclude-nocase", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub exclude_nocase: Vec<String>,

    /// Include folders matching GLOB
    #[arg(short = 'I', long = "include-folder", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub include_folder: Vec<String>,

    /// Exclude folders matching GLOB
    #[arg(short = 'E', long = "exclude-folder", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub exclude_folder: Vec<String>,

    /// Include folders matching GLOB, ignoring case
    #[arg(long = "include-folder-nocase", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub include_folder_nocase: Vec<String>,

    /// Exclude folders matching GLOB, ignoring case
    #[arg(long = "exclude-folder-nocase", value_name = "GLOB", action = ArgAction::Append, help_heading = "Filters")]
    pub exclude_folder_nocase: Vec<String>,

    /// Carry modification times over to copies
    #[arg(short = 't', long = "times", help_heading = "Attributes")]
    pub times: bool,

    /// Carry permission bits over (both endpoints must be Unix-like)
    #[arg(short = 'm', long = "perms", help_heading = "Attributes")]
    pub perms: bool,

    /// Create the destination root if it does not exist
    #[arg(long = "create-dest", help_heading = "Mode")]
    pub create_dest: bool,

    /// Abort when a file meets a folder of the same name
    #[arg(long, help_heading = "Mode")]
    pub strict_conflicts: bool,

    /// Abort on access denials instead of skipping
    #[arg(long, help_heading = "Mode")]
    pub strict_permissions: bool,

    #[arg(short, long, action = ArgAction::Count, help_heading = "Output")]
    pub verbose: u8,

    /// Errors only
    #[arg(short, long, conflicts_with = "verbose", help_heading = "Output")]
    pub quiet: bool,

    #[arg(long = "no-color", help_heading = "Output")]
    pub no_color: bool,

    /// Username for the remote side
    #[arg(short = 'u', long, value_name = "NAME", help_heading = "Remote")]
    pub user: Option<String>,

    /// Password for the remote side; omit to use the SSH agent
    #[arg(short = 'p', long, value_name = "PASS", help_heading = "Remote")]
    pub password: Option<String>,

    #[arg(short = 'P', long, default_value_t = 22, value_name = "PORT", help_heading = "Remote")]
    pub port: u16,

    /// TCP connection timeout in seconds
    #[arg(short = 'T', long, default_value_t = 1, value_name = "SECS", help_heading = "Remote")]
    pub timeout: u64,
}

pub fn cli_command() -> clap::Command {
    Cli::command()
}
