#![allow(dead_code)]

use anyhow::{Context, Result};
use calcrunner::manifest::MANIFEST_FILE;
use calcrunner::{Calculator, InlineExecutor, ProcessExecutor};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The shipped operations and their exported capability symbols.
pub const SHIPPED: [(&str, &str); 5] = [
    ("add", "AddCommand"),
    ("subtract", "SubtractCommand"),
    ("multiply", "MultiplyCommand"),
    ("divide", "DivideCommand"),
    ("exit", "ExitCommand"),
];

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn shipped_plugins() -> PathBuf {
    repo_root().join("plugins")
}

pub fn worker_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_calc-worker"))
}

/// Write one unit manifest exporting the contract marker plus `symbol`.
pub fn write_unit(root: &Path, name: &str, symbol: &str) -> Result<PathBuf> {
    let manifest = json!({
        "schema_version": "calc_plugin_v1",
        "exports": ["Command", symbol],
    });
    write_raw_unit(root, name, &serde_json::to_string_pretty(&manifest)?)
}

/// Write a unit manifest verbatim, valid or not.
pub fn write_raw_unit(root: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let dir = root.join(name);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(MANIFEST_FILE);
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// A temporary plugin directory holding the given units.
pub fn plugin_dir(units: &[(&str, &str)]) -> Result<TempDir> {
    let temp = TempDir::new().context("allocating plugin directory")?;
    for (name, symbol) in units {
        write_unit(temp.path(), name, symbol)?;
    }
    Ok(temp)
}

pub fn process_calculator(plugins: &Path) -> Calculator {
    Calculator::open(plugins, Box::new(ProcessExecutor::new(worker_binary())))
}

pub fn inline_calculator(plugins: &Path) -> Calculator {
    Calculator::open(plugins, Box::new(InlineExecutor))
}

pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// A shell script standing in for `calc-worker`.
pub fn fake_worker(dir: &Path, body: &str) -> Result<PathBuf> {
    let path = dir.join("fake-worker");
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("writing {}", path.display()))?;
    make_executable(&path)?;
    Ok(path)
}
