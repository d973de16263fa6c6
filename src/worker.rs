//! Worker side of the isolated executor.
//!
//! The worker reads a single request, resolves the requested symbol in its
//! own copy of the linked symbol table, builds and invokes the capability,
//! and posts exactly one outcome. Bad requests still get an outcome so the
//! caller can tell "worker refused" from "worker died".

use crate::error::CapabilityError;
use crate::executor::invoke_guarded;
use crate::protocol::{ExecutionOutcome, ExecutionRequest, read_message, write_message};
use crate::symbols::SymbolTable;
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;

pub fn serve<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    symbols: &SymbolTable,
) -> Result<()> {
    let outcome = match read_message::<_, ExecutionRequest>(reader) {
        Ok(request) => ExecutionOutcome::from_result(execute(&request, symbols)),
        Err(err) => {
            let refused = CapabilityError::InvalidRequest(format!("{err:#}"));
            ExecutionOutcome::from_result(Err(refused))
        }
    };
    write_message(writer, &outcome)
}

fn execute(request: &ExecutionRequest, symbols: &SymbolTable) -> Result<f64, CapabilityError> {
    debug!(
        operation = %request.operation,
        symbol = %request.symbol,
        operands = request.operands.len(),
        "worker executing"
    );
    match symbols.resolve(&request.symbol) {
        // The contract marker resolves too; its constructor refuses.
        Some(symbol) => invoke_guarded(symbol.constructor(), &request.operands),
        None => Err(CapabilityError::UnknownSymbol(request.symbol.clone())),
    }
}
