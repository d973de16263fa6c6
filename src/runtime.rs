//! Locating helper executables at runtime.
//!
//! Centralizes executable detection and the worker search order so the CLI
//! and tests resolve `calc-worker` the same way.

use anyhow::{Result, bail};
use std::env;
use std::path::{Path, PathBuf};

pub const WORKER_BINARY: &str = "calc-worker";

/// Returns true when a file exists and has any execute bit set.
pub fn helper_is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = std::fs::metadata(path) {
            return meta.permissions().mode() & 0o111 != 0;
        }
        false
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Helper with the given name next to the running executable.
pub fn sibling_of_current_exe(name: &str) -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let candidate = exe.parent()?.join(executable_name(name));
    helper_is_executable(&candidate).then_some(candidate)
}

/// Find an executable by name somewhere on PATH.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    for dir in env::split_paths(&paths) {
        let candidate = dir.join(executable_name(name));
        if helper_is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Resolve the worker program.
///
/// An explicit path (CLI or `CALC_WORKER`) must exist; otherwise the worker
/// is looked up next to the current executable, then on PATH.
pub fn resolve_worker(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if helper_is_executable(path) {
            return Ok(path.to_path_buf());
        }
        bail!("Configured worker is not executable: {}", path.display());
    }

    if let Some(path) = sibling_of_current_exe(WORKER_BINARY) {
        return Ok(path);
    }

    if let Some(path) = find_on_path(WORKER_BINARY) {
        return Ok(path);
    }

    bail!(
        "Unable to locate '{WORKER_BINARY}'. Build it next to this binary, put it on PATH, or set CALC_WORKER."
    )
}

fn executable_name(name: &str) -> String {
    format!("{name}{}", env::consts::EXE_SUFFIX)
}
