//! Environment-driven settings shared by the binaries.
//!
//! Precedence for every knob is: explicit CLI flag, then environment, then
//! the built-in default. The plugin directory additionally falls back to the
//! build-time `CALC_PLUGIN_DIR_HINT` (the repository's `plugins/`) so a
//! freshly built binary finds the shipped operations without configuration.

use anyhow::{Result, bail};
use std::env;
use std::path::{Path, PathBuf};

pub const PLUGIN_DIR_ENV: &str = "CALC_PLUGIN_DIR";
pub const WORKER_ENV: &str = "CALC_WORKER";
pub const ISOLATION_ENV: &str = "CALC_ISOLATION";
pub const LOG_ENV: &str = "CALC_LOG";

const DEFAULT_PLUGIN_DIR: &str = "plugins";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Isolation {
    /// One worker process per call.
    #[default]
    Process,
    /// Caller's thread behind a panic boundary.
    Inline,
}

impl Isolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Isolation::Process => "process",
            Isolation::Inline => "inline",
        }
    }
}

impl TryFrom<&str> for Isolation {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim() {
            "process" => Ok(Isolation::Process),
            "inline" => Ok(Isolation::Inline),
            other => bail!("Unknown isolation mode: {other} (expected process or inline)"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub plugin_dir: PathBuf,
    pub isolation: Isolation,
    /// Explicit worker program; `None` means search next to the executable
    /// and on PATH.
    pub worker: Option<PathBuf>,
}

impl Settings {
    /// Settings from the process environment alone.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Settings from an arbitrary key lookup; lets tests avoid mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let plugin_dir = non_empty(PLUGIN_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_plugin_dir);
        let isolation = match non_empty(ISOLATION_ENV) {
            Some(value) => Isolation::try_from(value.as_str())?,
            None => Isolation::default(),
        };
        let worker = non_empty(WORKER_ENV).map(PathBuf::from);

        Ok(Self {
            plugin_dir,
            isolation,
            worker,
        })
    }

    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = dir.into();
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_worker(mut self, worker: impl Into<PathBuf>) -> Self {
        self.worker = Some(worker.into());
        self
    }
}

/// Build-time hint when it still exists on disk, else `./plugins`.
pub fn default_plugin_dir() -> PathBuf {
    if let Some(hint) = option_env!("CALC_PLUGIN_DIR_HINT") {
        let hint = Path::new(hint);
        if hint.is_dir() {
            return hint.to_path_buf();
        }
    }
    PathBuf::from(DEFAULT_PLUGIN_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            (PLUGIN_DIR_ENV, "/opt/calc/plugins"),
            (ISOLATION_ENV, "inline"),
            (WORKER_ENV, "/opt/calc/calc-worker"),
        ]))
        .expect("settings");
        assert_eq!(settings.plugin_dir, PathBuf::from("/opt/calc/plugins"));
        assert_eq!(settings.isolation, Isolation::Inline);
        assert_eq!(settings.worker, Some(PathBuf::from("/opt/calc/calc-worker")));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let settings =
            Settings::from_lookup(lookup(&[(PLUGIN_DIR_ENV, ""), (WORKER_ENV, "  ")])).unwrap();
        assert_eq!(settings.plugin_dir, default_plugin_dir());
        assert_eq!(settings.isolation, Isolation::Process);
        assert!(settings.worker.is_none());
    }

    #[test]
    fn unknown_isolation_is_rejected() {
        assert!(Settings::from_lookup(lookup(&[(ISOLATION_ENV, "thread")])).is_err());
        assert_eq!(Isolation::try_from("process").unwrap().as_str(), "process");
    }

    #[test]
    fn builders_take_precedence() {
        let settings = Settings::from_lookup(lookup(&[]))
            .unwrap()
            .with_plugin_dir("/tmp/p")
            .with_isolation(Isolation::Inline)
            .with_worker("/tmp/w");
        assert_eq!(settings.plugin_dir, PathBuf::from("/tmp/p"));
        assert_eq!(settings.isolation, Isolation::Inline);
        assert_eq!(settings.worker, Some(PathBuf::from("/tmp/w")));
    }
}
