//! JSON register map loading and table listings.

use std::fs;
use std::path::Path;

use regfile_core::{RegisterMap, RegisterTable};

use crate::SimError;

/// Parses a register map from JSON text.
///
/// # Errors
///
/// Returns the JSON error when `text` is not a valid map document.
pub fn parse_map(text: &str) -> Result<RegisterMap, serde_json::Error> {
    serde_json::from_str(text)
}

/// Reads a JSON register map and builds its table.
///
/// # Errors
///
/// Returns [`SimError::Io`], [`SimError::MapFormat`] or [`SimError::Map`].
pub fn load_map(path: &Path) -> Result<(RegisterMap, RegisterTable), SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_map(&text).map_err(|source| SimError::MapFormat {
        path: path.to_path_buf(),
        source,
    })?;
    let table = map.build()?;
    log::info!("loaded {} registers from {}", table.len(), path.display());
    Ok((map, table))
}

/// Formats one line per register: index, name, address, mask, mode, default.
#[must_use]
pub fn describe_table(map: &RegisterMap, table: &RegisterTable) -> Vec<String> {
    table
        .descriptors()
        .iter()
        .zip(table.defaults())
        .enumerate()
        .map(|(index, (descriptor, default))| {
            format!(
                "{index:>3}  {:<16} {:#010x}  mask={:#010x}  {:<8} default={default:#010x}",
                map.name_of(index).unwrap_or("?"),
                descriptor.address,
                descriptor.mask,
                descriptor.mode.mnemonic(),
            )
        })
        .collect()
}
