//! Interactive line loop over arbitrary streams.
//!
//! Each line is either a line command (`menu`, `history`, `clear`, `reload`,
//! `exit`) or `<operation> <num> [<num> ...]` dispatched through the
//! calculator. Nothing short of EOF, `exit`, or an exit capability ends the
//! session; every other failure is printed and the prompt comes back.

use crate::calculator::Calculator;
use crate::error::CalcError;
use crate::history::{History, format_number};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

const BANNER: &str = "Starting REPL mode... Type 'exit' to quit.";
const PROMPT: &str = "> ";
const GOODBYE: &str = "Goodbye!";
const LINE_COMMANDS: [&str; 5] = ["menu", "history", "clear", "reload", "exit"];

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplExit {
    EndOfInput,
    ExitCommand,
    /// An exit capability was invoked.
    ExitRequested,
}

pub struct Repl {
    calculator: Calculator,
    history: History,
}

impl Repl {
    pub fn new(calculator: Calculator) -> Self {
        Self {
            calculator,
            history: History::new(),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<ReplExit> {
        writeln!(output, "{BANNER}")?;
        self.write_menu(&mut output)?;

        let mut line = String::new();
        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            line.clear();
            let read = input.read_line(&mut line).context("reading REPL input")?;
            if read == 0 {
                writeln!(output)?;
                writeln!(output, "{GOODBYE}")?;
                return Ok(ReplExit::EndOfInput);
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some((&head, rest)) = tokens.split_first() else {
                continue;
            };
            let command = head.to_ascii_lowercase();

            match command.as_str() {
                "menu" => self.write_menu(&mut output)?,
                "history" => writeln!(output, "{}", self.history.render())?,
                "clear" => {
                    self.history.clear();
                    writeln!(output, "History has been cleared.")?;
                }
                "reload" => self.reload(&mut output)?,
                "exit" | "quit" => {
                    writeln!(output, "{GOODBYE}")?;
                    return Ok(ReplExit::ExitCommand);
                }
                _ => {
                    if let Some(exit) = self.dispatch(head, rest, &mut output)? {
                        return Ok(exit);
                    }
                }
            }
        }
    }

    fn dispatch<W: Write>(
        &mut self,
        operation: &str,
        tokens: &[&str],
        output: &mut W,
    ) -> Result<Option<ReplExit>> {
        if !self.calculator.registry().contains(operation) {
            writeln!(
                output,
                "Invalid command. Type 'menu' to see available commands."
            )?;
            return Ok(None);
        }

        let operands = match parse_operands(tokens) {
            Ok(values) => values,
            Err(err) => {
                writeln!(output, "{err}")?;
                return Ok(None);
            }
        };

        match self
            .calculator
            .compute(operation, &operands, &mut self.history)
        {
            Ok(value) => writeln!(output, "The result is: {}", format_number(value))?,
            Err(err) if err.is_exit_request() => {
                debug!(operation, "exit capability invoked");
                writeln!(output, "{GOODBYE}")?;
                return Ok(Some(ReplExit::ExitRequested));
            }
            Err(err) => writeln!(output, "An error occurred: {err}")?,
        }
        Ok(None)
    }

    fn reload<W: Write>(&mut self, output: &mut W) -> Result<()> {
        match self.calculator.reload() {
            Some(report) => {
                for (unit, err) in &report.skipped {
                    writeln!(output, "Skipped {unit}: {err}")?;
                }
                writeln!(
                    output,
                    "Reloaded plugins: {} operations available.",
                    self.calculator.registry().len()
                )?;
            }
            None => writeln!(output, "No plugin directory to reload.")?,
        }
        Ok(())
    }

    fn write_menu<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(output, "Available Commands:")?;
        for name in self.calculator.operation_names() {
            writeln!(output, "  {name}")?;
        }
        for name in LINE_COMMANDS {
            if !self.calculator.registry().contains(name) {
                writeln!(output, "  {name}")?;
            }
        }
        Ok(())
    }
}

/// Parse every token as a float, reporting the first one that isn't.
pub fn parse_operands(tokens: &[&str]) -> Result<Vec<f64>, CalcError> {
    tokens
        .iter()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| CalcError::InvalidOperand(token.to_string()))
        })
        .collect()
}
