//! Link-time symbol table consulted when loading plugin units.
//!
//! Plugin manifests name the symbols they export; this table is where those
//! names resolve. Capability types register in `linked()`, and the plugin
//! directory decides which of them are exposed and under what operation name.
//! `linked()` is the only way to obtain a table, so the caller's registry and
//! the `calc-worker` process always resolve the same names and a symbol name
//! is all that has to cross the process boundary.

use crate::builtins::{AddCommand, DivideCommand, ExitCommand, MultiplyCommand, SubtractCommand};
use crate::capability::{CONTRACT_SYMBOL, Capability, Constructor, construct_contract};
use crate::error::CapabilityError;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug)]
pub enum Symbol {
    /// The bare contract marker; never registered as an operation.
    Contract,
    Capability(Constructor),
}

impl Symbol {
    pub fn is_capability(&self) -> bool {
        matches!(self, Symbol::Capability(_))
    }

    pub fn constructor(&self) -> Constructor {
        match self {
            Symbol::Contract => construct_contract,
            Symbol::Capability(constructor) => *constructor,
        }
    }

    pub fn construct(&self, operands: &[f64]) -> Result<Box<dyn Capability>, CapabilityError> {
        (self.constructor())(operands)
    }
}

/// Built only through [`SymbolTable::linked`].
#[derive(Clone, Debug)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    fn new() -> Self {
        Self {
            symbols: BTreeMap::new(),
        }
    }

    /// Every symbol compiled into this build, contract marker included.
    pub fn linked() -> Self {
        let mut table = Self::new();
        table.export_contract(CONTRACT_SYMBOL);
        table.export("AddCommand", AddCommand::construct);
        table.export("SubtractCommand", SubtractCommand::construct);
        table.export("MultiplyCommand", MultiplyCommand::construct);
        table.export("DivideCommand", DivideCommand::construct);
        table.export("ExitCommand", ExitCommand::construct);
        table
    }

    fn export(&mut self, name: &str, constructor: Constructor) {
        self.symbols
            .insert(name.to_string(), Symbol::Capability(constructor));
    }

    fn export_contract(&mut self, name: &str) {
        self.symbols.insert(name.to_string(), Symbol::Contract);
    }

    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_table_exposes_contract_and_capabilities() {
        let table = SymbolTable::linked();
        assert!(matches!(table.resolve("Command"), Some(Symbol::Contract)));
        for name in [
            "AddCommand",
            "SubtractCommand",
            "MultiplyCommand",
            "DivideCommand",
            "ExitCommand",
        ] {
            let symbol = table.resolve(name).expect("symbol linked");
            assert!(symbol.is_capability(), "{name} should be a capability");
        }
        assert!(table.resolve("addition").is_none());
    }

    #[test]
    fn bare_contract_cannot_be_instantiated() {
        let contract = SymbolTable::linked()
            .resolve(CONTRACT_SYMBOL)
            .expect("contract linked");
        match contract.construct(&[1.0, 2.0]) {
            Err(CapabilityError::UnimplementedCapability(name)) => assert_eq!(name, "Command"),
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("bare contract must not construct"),
        }
    }
}
