//! Command-line front end for the plugin calculator.
//!
//! `calc <num1> <num2> <operation>` performs one calculation and prints the
//! result; with no positionals it starts the interactive REPL. Operations are
//! discovered from the plugin directory (`--plugins`, `CALC_PLUGIN_DIR`, or
//! the repository's `plugins/`). Calculation failures are reported on stdout
//! and still exit 0; only usage and setup problems exit non-zero.

use anyhow::{Context, Result};
use calcrunner::history::format_number;
use calcrunner::{Calculator, History, Isolation, Repl, Settings, logging};
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use tracing::debug;

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse(env::args_os().skip(1))?;
    if !matches!(cli.positionals.len(), 0 | 3) {
        usage();
    }

    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.plugins {
        settings = settings.with_plugin_dir(dir);
    }
    if cli.inline {
        settings = settings.with_isolation(Isolation::Inline);
    }
    debug!(
        plugin_dir = %settings.plugin_dir.display(),
        isolation = settings.isolation.as_str(),
        "starting calc"
    );

    let calculator = Calculator::from_settings(&settings)?;

    match cli.positionals.as_slice() {
        [] => {
            let mut repl = Repl::new(calculator);
            let stdin = io::stdin();
            repl.run(stdin.lock(), io::stdout())
                .context("running REPL")?;
        }
        [a, b, operation] => one_shot(&calculator, a, b, operation),
        _ => usage(),
    }
    Ok(())
}

fn one_shot(calculator: &Calculator, a: &str, b: &str, operation: &str) {
    let (Ok(x), Ok(y)) = (a.parse::<f64>(), b.parse::<f64>()) else {
        println!("Invalid number input: {a} or {b} is not a valid number.");
        return;
    };

    let mut history = History::new();
    match calculator.compute(operation, &[x, y], &mut history) {
        Ok(value) => println!(
            "The result of {a} {operation} {b} is equal to {}",
            format_number(value)
        ),
        Err(err) if err.is_exit_request() => println!("Goodbye!"),
        Err(err) => println!("An error occurred: {err}"),
    }
}

struct CliArgs {
    plugins: Option<PathBuf>,
    inline: bool,
    positionals: Vec<String>,
}

impl CliArgs {
    fn parse(args: impl Iterator<Item = OsString>) -> Result<Self> {
        let mut args = args;
        let mut plugins: Option<PathBuf> = None;
        let mut inline = false;
        let mut positionals = Vec::new();

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--plugins" => {
                    let value = args.next().unwrap_or_else(|| usage());
                    plugins = Some(PathBuf::from(value));
                }
                "--inline" => inline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                // Negative numbers are positionals, not flags.
                other if other.starts_with("--") => {
                    eprintln!("unknown flag: {other}");
                    usage();
                }
                other => positionals.push(other.to_string()),
            }
        }

        Ok(Self {
            plugins,
            inline,
            positionals,
        })
    }
}

fn print_usage() {
    eprintln!(
        "Usage: calc [--plugins DIR] [--inline] [<num1> <num2> <operation>]\n\n\
With three positionals, performs one calculation and prints the result.\n\
With none, starts the interactive REPL.\n\n\
Options:\n  --plugins DIR   Plugin directory (default: $CALC_PLUGIN_DIR or the bundled plugins/)\n  \
--inline        Run capabilities in-process instead of in calc-worker\n  \
-h, --help      Show this help\n\n\
Environment: CALC_PLUGIN_DIR, CALC_WORKER, CALC_ISOLATION=process|inline, CALC_LOG"
    );
}

fn usage() -> ! {
    print_usage();
    std::process::exit(1);
}
