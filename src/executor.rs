//! Running one capability invocation behind an isolation boundary.
//!
//! `ProcessExecutor` is the default: each call spawns a fresh `calc-worker`,
//! hands it one request over stdin, and blocks until the worker's stdout
//! reaches EOF. Whatever the worker posted is the outcome; a worker that dies
//! without posting surfaces as `CalcError::Worker`. There is no timeout, so a
//! capability that never returns hangs the caller.
//!
//! Only the descriptor's symbol name crosses the boundary. The worker resolves
//! it in its own `SymbolTable::linked()`, so a worker program built from a
//! different revision of this crate may answer `UnknownSymbol` for a name the
//! caller's registry accepted.
//!
//! `InlineExecutor` runs the constructor and invocation on the caller's
//! thread behind `catch_unwind`. It contains panics but not aborts or memory
//! faults.

use crate::capability::Constructor;
use crate::error::{CalcError, CapabilityError};
use crate::protocol::{ExecutionOutcome, ExecutionRequest, read_message, write_message};
use crate::registry::CapabilityDescriptor;
use std::any::Any;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Seam between the facade and the isolation strategy.
pub trait Executor {
    fn run(&self, descriptor: &CapabilityDescriptor, operands: &[f64]) -> Result<f64, CalcError>;
}

/// Construct and invoke once, converting a panic into `Panicked`.
pub fn invoke_guarded(constructor: Constructor, operands: &[f64]) -> Result<f64, CapabilityError> {
    match panic::catch_unwind(AssertUnwindSafe(|| constructor(operands)?.execute())) {
        Ok(result) => result,
        Err(payload) => Err(CapabilityError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn run(&self, descriptor: &CapabilityDescriptor, operands: &[f64]) -> Result<f64, CalcError> {
        debug!(operation = %descriptor.name, "running capability inline");
        invoke_guarded(descriptor.constructor, operands).map_err(CalcError::from)
    }
}

#[derive(Clone, Debug)]
pub struct ProcessExecutor {
    program: PathBuf,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Executor for ProcessExecutor {
    fn run(&self, descriptor: &CapabilityDescriptor, operands: &[f64]) -> Result<f64, CalcError> {
        let request = ExecutionRequest {
            operation: descriptor.name.clone(),
            symbol: descriptor.symbol.clone(),
            operands: operands.to_vec(),
        };

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| CalcError::Spawn {
                program: self.program.clone(),
                detail: err.to_string(),
            })?;
        debug!(
            operation = %request.operation,
            pid = child.id(),
            worker = %self.program.display(),
            "spawned worker"
        );

        // Dropping the handle closes stdin so the worker sees EOF after the
        // request line.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = write_message(&mut stdin, &request) {
                let detail = format!("{err:#}");
                warn!(
                    operation = %request.operation,
                    error = %detail,
                    "worker did not accept request"
                );
            }
        }

        let mut posted = Vec::new();
        let read_result = match child.stdout.take() {
            Some(mut stdout) => stdout.read_to_end(&mut posted).map(|_| ()),
            None => Ok(()),
        };
        let status = child.wait().map_err(|err| CalcError::Worker {
            operation: request.operation.clone(),
            detail: format!("joining worker: {err}"),
        })?;
        debug!(operation = %request.operation, %status, "worker joined");

        if let Err(err) = read_result {
            return Err(CalcError::Worker {
                operation: request.operation,
                detail: format!("reading worker channel: {err} ({status})"),
            });
        }

        match read_message::<_, ExecutionOutcome>(&mut posted.as_slice()) {
            Ok(outcome) => {
                if !status.success() {
                    warn!(
                        operation = %request.operation,
                        %status,
                        "worker posted an outcome but exited unsuccessfully"
                    );
                }
                outcome.into_result().map_err(CalcError::from)
            }
            Err(err) => Err(CalcError::Worker {
                operation: request.operation,
                detail: format!("{err:#} ({status})"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{AddCommand, DivideCommand};
    use crate::capability::Capability;

    struct Explodes;

    impl Capability for Explodes {
        fn execute(&self) -> Result<f64, CapabilityError> {
            panic!("capability blew up");
        }
    }

    fn explodes(_operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Explodes))
    }

    fn descriptor(name: &str, constructor: Constructor) -> CapabilityDescriptor {
        CapabilityDescriptor {
            name: name.to_string(),
            symbol: name.to_string(),
            unit: PathBuf::from("/dev/null"),
            constructor,
        }
    }

    #[test]
    fn inline_executor_returns_values_and_failures() {
        let add = descriptor("add", AddCommand::construct);
        assert_eq!(InlineExecutor.run(&add, &[3.0, 2.0]).unwrap(), 5.0);

        let divide = descriptor("divide", DivideCommand::construct);
        let err = InlineExecutor.run(&divide, &[8.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            CalcError::Capability(CapabilityError::DivisionByZero)
        ));
    }

    #[test]
    fn panics_stay_inside_the_guard() {
        let result = invoke_guarded(explodes, &[1.0]);
        match result {
            Err(CapabilityError::Panicked(message)) => assert_eq!(message, "capability blew up"),
            other => panic!("expected panic capture, got {other:?}"),
        }
    }

    #[test]
    fn unstartable_worker_is_a_spawn_error() {
        let executor = ProcessExecutor::new("/nonexistent/calc-worker");
        let add = descriptor("add", AddCommand::construct);
        assert!(matches!(
            executor.run(&add, &[1.0, 2.0]),
            Err(CalcError::Spawn { .. })
        ));
    }
}
