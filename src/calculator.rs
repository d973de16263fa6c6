//! The dispatch facade every front end calls.
//!
//! `compute` validates the request against the registry before anything is
//! spawned, delegates the invocation to the configured executor, and records
//! successes in the caller's history.

use crate::config::{Isolation, Settings};
use crate::error::CalcError;
use crate::executor::{Executor, InlineExecutor, ProcessExecutor};
use crate::history::History;
use crate::registry::{Registry, ScanReport};
use crate::runtime::resolve_worker;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct Calculator {
    registry: Registry,
    executor: Box<dyn Executor>,
    plugin_dir: Option<PathBuf>,
}

impl Calculator {
    pub fn new(registry: Registry, executor: Box<dyn Executor>) -> Self {
        Self {
            registry,
            executor,
            plugin_dir: None,
        }
    }

    /// Scan `plugin_dir` against the linked symbol table.
    pub fn open(plugin_dir: &Path, executor: Box<dyn Executor>) -> Self {
        let registry = Registry::load(plugin_dir);
        Self {
            registry,
            executor,
            plugin_dir: Some(plugin_dir.to_path_buf()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let executor: Box<dyn Executor> = match settings.isolation {
            Isolation::Process => {
                let program = resolve_worker(settings.worker.as_deref())?;
                debug!(worker = %program.display(), "using process isolation");
                Box::new(ProcessExecutor::new(program))
            }
            Isolation::Inline => Box::new(InlineExecutor),
        };
        Ok(Self::open(&settings.plugin_dir, executor))
    }

    /// Validate, execute in isolation, and record the result.
    pub fn compute(
        &self,
        operation: &str,
        operands: &[f64],
        history: &mut History,
    ) -> Result<f64, CalcError> {
        let descriptor = self
            .registry
            .lookup(operation)
            .ok_or_else(|| CalcError::UnsupportedOperation(operation.to_string()))?;
        if operands.is_empty() {
            return Err(CalcError::MissingOperands(operation.to_string()));
        }

        let value = self.executor.run(descriptor, operands)?;
        history.record(operation, operands, value);
        Ok(value)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn operation_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Rescan the plugin directory this calculator was opened on.
    pub fn reload(&mut self) -> Option<ScanReport> {
        let dir = self.plugin_dir.clone()?;
        let report = self.registry.scan(&dir);
        info!(
            plugin_dir = %dir.display(),
            operations = self.registry.len(),
            "plugins reloaded"
        );
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapabilityError;
    use crate::manifest::MANIFEST_FILE;
    use crate::registry::CapabilityDescriptor;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct CountingExecutor {
        calls: Rc<Cell<usize>>,
    }

    impl Executor for CountingExecutor {
        fn run(
            &self,
            descriptor: &CapabilityDescriptor,
            operands: &[f64],
        ) -> Result<f64, CalcError> {
            self.calls.set(self.calls.get() + 1);
            InlineExecutor.run(descriptor, operands)
        }
    }

    fn plugin_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        for (name, symbol) in [("add", "AddCommand"), ("divide", "DivideCommand")] {
            let dir = temp.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            let body = serde_json::json!({
                "schema_version": "calc_plugin_v1",
                "exports": ["Command", symbol],
            });
            fs::write(dir.join(MANIFEST_FILE), body.to_string()).unwrap();
        }
        temp
    }

    fn counting(dir: &Path) -> (Calculator, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let executor = CountingExecutor {
            calls: Rc::clone(&calls),
        };
        (Calculator::open(dir, Box::new(executor)), calls)
    }

    #[test]
    fn unknown_operation_never_reaches_the_executor() {
        let temp = plugin_dir();
        let (calc, calls) = counting(temp.path());
        let mut history = History::new();

        let err = calc.compute("invalid", &[5.0, 3.0], &mut history).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operation: invalid");
        assert_eq!(calls.get(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn missing_operands_are_rejected_before_execution() {
        let temp = plugin_dir();
        let (calc, calls) = counting(temp.path());
        let mut history = History::new();

        assert!(matches!(
            calc.compute("add", &[], &mut history),
            Err(CalcError::MissingOperands(_))
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn successes_are_recorded_and_failures_are_not() {
        let temp = plugin_dir();
        let (calc, calls) = counting(temp.path());
        let mut history = History::new();

        assert_eq!(calc.compute("add", &[3.0, 2.0], &mut history).unwrap(), 5.0);
        let err = calc.compute("divide", &[8.0, 0.0], &mut history).unwrap_err();
        assert!(matches!(
            err,
            CalcError::Capability(CapabilityError::DivisionByZero)
        ));
        assert_eq!(calls.get(), 2);
        assert_eq!(history.entries(), ["3 2 add = 5"]);
    }

    #[test]
    fn reload_picks_up_new_units() {
        let temp = plugin_dir();
        let (mut calc, _) = counting(temp.path());
        assert_eq!(calc.operation_names(), vec!["add", "divide"]);

        let dir = temp.path().join("times");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(MANIFEST_FILE),
            r#"{"schema_version": "calc_plugin_v1", "exports": ["MultiplyCommand"]}"#,
        )
        .unwrap();

        let report = calc.reload().expect("opened on a directory");
        assert_eq!(report.registered, vec!["add", "divide", "times"]);
        let mut history = History::new();
        assert_eq!(calc.compute("times", &[2.0, 3.0], &mut history).unwrap(), 6.0);
    }

    #[test]
    fn calculator_without_directory_cannot_reload() {
        let mut calc = Calculator::new(Registry::linked(), Box::new(InlineExecutor));
        assert!(calc.reload().is_none());
        assert!(calc.operation_names().is_empty());
    }
}
