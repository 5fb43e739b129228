//! Error type shared by map loading and script execution.

use std::io;
use std::path::PathBuf;

use regfile_core::MapError;
use thiserror::Error;

use crate::script::ScriptError;

/// Failure that stops the simulator before or while loading its inputs.
#[derive(Debug, Error)]
pub enum SimError {
    /// Input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Register map is not valid JSON for a [`regfile_core::RegisterMap`].
    #[error("invalid register map {}: {source}", path.display())]
    MapFormat {
        /// Offending path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Register map was rejected while building the table.
    #[error(transparent)]
    Map(#[from] MapError),
    /// Script has a syntax error.
    #[error(transparent)]
    Script(#[from] ScriptError),
}
