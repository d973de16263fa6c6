//! Isolation worker for `calc`.
//!
//! Reads one execution request from stdin, runs the named capability from the
//! linked symbol table, and writes one outcome line to stdout. Logging goes to
//! stderr so stdout carries nothing but the outcome.

use anyhow::{Context, Result};
use calcrunner::{SymbolTable, logging, worker};
use std::io::{self, Write};

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("calc-worker: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let symbols = SymbolTable::linked();
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    worker::serve(&mut reader, &mut writer, &symbols).context("posting outcome")?;
    writer.flush().context("flushing outcome")?;
    Ok(())
}
