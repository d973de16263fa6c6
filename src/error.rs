//! Error taxonomy shared by the registry, executor, and facade.
//!
//! `CapabilityError` is what a capability (or the worker hosting it) can
//! raise; it crosses the process boundary as a `FailureKind` plus message and
//! is rebuilt on the caller's side with the same variant. `CalcError` is what
//! front ends see from `Calculator::compute`. `PluginLoadError` never escapes
//! a scan: the registry logs it and moves on to the next unit.

use std::path::PathBuf;
use thiserror::Error;

pub const DIVISION_BY_ZERO_MESSAGE: &str = "Cannot divide by zero.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("Cannot divide by zero.")]
    DivisionByZero,

    #[error("capability contract has no implementation: {0}")]
    UnimplementedCapability(String),

    /// Raised by the exit capability; front ends turn it into a clean exit.
    #[error("exit requested")]
    ExitRequested,

    #[error("capability panicked: {0}")]
    Panicked(String),

    #[error("worker cannot resolve symbol {0}")]
    UnknownSymbol(String),

    #[error("worker rejected request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Missing operands for operation: {0}")]
    MissingOperands(String),

    #[error("Invalid number input: {0} is not a valid number.")]
    InvalidOperand(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The worker terminated without posting an outcome.
    #[error("worker failed for {operation}: {detail}")]
    Worker { operation: String, detail: String },

    #[error("unable to start worker {program}: {detail}")]
    Spawn { program: PathBuf, detail: String },
}

impl CalcError {
    pub fn is_exit_request(&self) -> bool {
        matches!(self, CalcError::Capability(CapabilityError::ExitRequested))
    }
}

#[derive(Debug, Error)]
pub enum PluginLoadError {
    #[error("reading {path}: {detail}")]
    Read { path: PathBuf, detail: String },

    #[error("parsing {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("manifest {path} failed schema validation:\n{details}")]
    Schema { path: PathBuf, details: String },

    #[error("manifest {path} exports unknown symbol {symbol}")]
    UnknownSymbol { path: PathBuf, symbol: String },

    #[error("manifest {path} exports nothing implementing the capability contract")]
    MissingContract { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages_match_front_end_wording() {
        assert_eq!(
            CapabilityError::DivisionByZero.to_string(),
            DIVISION_BY_ZERO_MESSAGE
        );
        assert_eq!(
            CalcError::UnsupportedOperation("invalid".to_string()).to_string(),
            "Unsupported operation: invalid"
        );
        let wrapped: CalcError = CapabilityError::DivisionByZero.into();
        assert_eq!(wrapped.to_string(), DIVISION_BY_ZERO_MESSAGE);
    }

    #[test]
    fn only_exit_requested_counts_as_exit() {
        assert!(CalcError::from(CapabilityError::ExitRequested).is_exit_request());
        assert!(!CalcError::from(CapabilityError::DivisionByZero).is_exit_request());
        assert!(!CalcError::MissingOperands("add".to_string()).is_exit_request());
    }
}
