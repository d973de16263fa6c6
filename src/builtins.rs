//! Capability types linked into the binary.
//!
//! Each type keeps its operands as given; arithmetic happens in `execute`.
//! Operand count is not checked here: the facade guarantees at least one
//! operand, and exit accepts any count.

use crate::capability::Capability;
use crate::error::CapabilityError;

pub struct AddCommand {
    numbers: Vec<f64>,
}

impl AddCommand {
    pub fn construct(operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Self {
            numbers: operands.to_vec(),
        }))
    }
}

impl Capability for AddCommand {
    fn execute(&self) -> Result<f64, CapabilityError> {
        Ok(self.numbers.iter().sum())
    }
}

pub struct SubtractCommand {
    numbers: Vec<f64>,
}

impl SubtractCommand {
    pub fn construct(operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Self {
            numbers: operands.to_vec(),
        }))
    }
}

impl Capability for SubtractCommand {
    fn execute(&self) -> Result<f64, CapabilityError> {
        let Some((first, rest)) = self.numbers.split_first() else {
            return Ok(0.0);
        };
        Ok(first - rest.iter().sum::<f64>())
    }
}

pub struct MultiplyCommand {
    numbers: Vec<f64>,
}

impl MultiplyCommand {
    pub fn construct(operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Self {
            numbers: operands.to_vec(),
        }))
    }
}

impl Capability for MultiplyCommand {
    fn execute(&self) -> Result<f64, CapabilityError> {
        Ok(self.numbers.iter().product())
    }
}

pub struct DivideCommand {
    numbers: Vec<f64>,
}

impl DivideCommand {
    /// Rejects a zero anywhere after the dividend.
    pub fn construct(operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
        if operands.iter().skip(1).any(|divisor| *divisor == 0.0) {
            return Err(CapabilityError::DivisionByZero);
        }
        Ok(Box::new(Self {
            numbers: operands.to_vec(),
        }))
    }
}

impl Capability for DivideCommand {
    fn execute(&self) -> Result<f64, CapabilityError> {
        let Some((first, rest)) = self.numbers.split_first() else {
            return Ok(0.0);
        };
        Ok(rest.iter().fold(*first, |acc, divisor| acc / divisor))
    }
}

/// Deliberate termination; the only capability whose invocation never yields
/// a value.
pub struct ExitCommand;

impl ExitCommand {
    pub fn construct(_operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
        Ok(Box::new(Self))
    }
}

impl Capability for ExitCommand {
    fn execute(&self) -> Result<f64, CapabilityError> {
        Err(CapabilityError::ExitRequested)
    }
}
