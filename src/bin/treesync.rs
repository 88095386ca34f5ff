// src/bin/treesync.rs

use engine::EngineError;
use treesync_cli::{CliError, cli_command, run};
use vfs::FsError;

fn main() {
    let matches = cli_command()
        .try_get_matches()
        .unwrap_or_else(|e| e.exit());
    if let Err(e) = run(&matches) {
        eprintln!("treesync: {e}");
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(err: &CliError) -> i32 {
    match err {
        CliError::Config(_) => 2,
        CliError::Connect(_) => 10,
        CliError::Engine(EngineError::RootMissing { .. }) => 3,
        CliError::Engine(EngineError::TypeConflict { .. }) => 4,
        CliError::Engine(EngineError::Fs(FsError::PermissionDenied { .. })) => 5,
        CliError::Engine(_) => 1,
    }
}
