//! Command-line entry point: lints `backend/src` of the enclosing workspace.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(root) = workspace_root() else {
        eprintln!("unable to locate workspace root (directory containing a workspace Cargo.toml)");
        return ExitCode::FAILURE;
    };
    match architecture_lint::lint_backend_sources(&root.join("backend")) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Search upwards from `CARGO_WORKSPACE_DIR`, the working directory, then
/// this crate's manifest directory.
fn workspace_root() -> Option<PathBuf> {
    let candidates = [
        std::env::var_os("CARGO_WORKSPACE_DIR").map(PathBuf::from),
        std::env::current_dir().ok(),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|start| find_workspace_root(&start))
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| declares_workspace(&dir.join("Cargo.toml")))
        .map(Path::to_path_buf)
}

fn declares_workspace(manifest: &Path) -> bool {
    fs::read_to_string(manifest).is_ok_and(|contents| contents.contains("[workspace]"))
}
