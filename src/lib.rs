//! Shared library for the plugin-driven calculator.
//!
//! Operations are discovered at startup from a plugin directory: each
//! subdirectory carries a `plugin.json` manifest naming the exported symbols
//! it provides, and the subdirectory name becomes the operation key. Every
//! invocation runs behind an isolation boundary (a `calc-worker` process by
//! default) so a failing capability cannot take the caller down with it.
//!
//! The binaries (`calc`, `calc-worker`) are thin wrappers over the types
//! re-exported here.

pub mod builtins;
pub mod calculator;
pub mod capability;
pub mod config;
pub mod error;
pub mod executor;
pub mod history;
pub mod logging;
pub mod manifest;
pub mod protocol;
pub mod registry;
pub mod repl;
pub mod runtime;
mod schema_loader;
pub mod symbols;
pub mod worker;

pub use calculator::Calculator;
pub use capability::{CONTRACT_SYMBOL, Capability, Constructor};
pub use config::{Isolation, Settings};
pub use error::{CalcError, CapabilityError, PluginLoadError};
pub use executor::{Executor, InlineExecutor, ProcessExecutor};
pub use history::History;
pub use protocol::{ExecutionOutcome, ExecutionRequest, FailureKind};
pub use registry::{CapabilityDescriptor, Registry, ScanReport};
pub use repl::{Repl, ReplExit};
pub use runtime::resolve_worker;
pub use symbols::{Symbol, SymbolTable};
