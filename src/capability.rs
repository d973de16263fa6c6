//! The capability contract every pluggable operation implements.
//!
//! A capability is built from its operands once, invoked once, and dropped.
//! The contract itself computes nothing; the symbol table exposes it under the
//! `Command` marker so plugin units can re-export it, and the registry filters
//! the marker out when deciding what to register.

use crate::error::CapabilityError;

/// One invocation of a pluggable operation.
pub trait Capability: Send {
    fn execute(&self) -> Result<f64, CapabilityError>;
}

/// Builds a capability instance from a variable-length operand list.
///
/// Construction may fail (the division capability rejects zero divisors
/// here, before any invocation is attempted).
pub type Constructor = fn(&[f64]) -> Result<Box<dyn Capability>, CapabilityError>;

/// Name under which the bare contract appears in the symbol table.
pub const CONTRACT_SYMBOL: &str = "Command";

/// Stand-in reached only through the contract marker: constructing it always
/// fails with `UnimplementedCapability`.
pub fn construct_contract(_operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
    Err(CapabilityError::UnimplementedCapability(
        CONTRACT_SYMBOL.to_string(),
    ))
}
