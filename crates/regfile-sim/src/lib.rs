//! Transaction script runner for the register-file responder.

use env_logger as _;

/// Error type for map loading and script parsing.
pub mod error;
pub use error::SimError;

/// JSON register map loading.
pub mod map;
pub use map::{describe_table, load_map, parse_map};

/// Transaction script parser.
pub mod script;
pub use script::{load_script, parse_script, Command, RegisterRef, ScriptError, ScriptLine};

/// Script execution against a responder.
pub mod runner;
pub use runner::{CommandResult, RunReport, RunSummary, Simulation};

#[cfg(test)]
use tempfile as _;
