//! Named register map that builds a validated [`RegisterTable`].

use thiserror::Error;

use crate::{RegisterDescriptor, RegisterMode, RegisterTable, TableError};

/// One named register in a map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterSpec {
    /// Unique name used by tooling.
    pub name: String,
    /// Byte address of the slot.
    pub address: u32,
    /// Access mode.
    pub mode: RegisterMode,
    /// Reset value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default: u32,
    /// Decode mask, exact match when absent.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub mask: Option<u32>,
}

impl RegisterSpec {
    /// Descriptor for this register.
    #[must_use]
    pub fn descriptor(&self) -> RegisterDescriptor {
        let descriptor = RegisterDescriptor::new(self.address, self.mode);
        self.mask
            .map_or(descriptor, |mask| descriptor.with_mask(mask))
    }
}

/// Failure to turn a map into a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum MapError {
    /// Descriptor validation failed.
    #[error(transparent)]
    Table(#[from] TableError),
    /// Two registers share a name.
    #[error("register name `{0}` is used more than once")]
    DuplicateName(String),
}

/// Ordered list of named registers. Table indices follow list order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterMap {
    /// Registers in index order.
    pub registers: Vec<RegisterSpec>,
}

impl RegisterMap {
    /// Validates names and builds the descriptor table.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateName`] for repeated names and
    /// [`MapError::Table`] when the descriptors are rejected.
    pub fn build(&self) -> Result<RegisterTable, MapError> {
        for (position, entry) in self.registers.iter().enumerate() {
            if self.registers[..position]
                .iter()
                .any(|earlier| earlier.name == entry.name)
            {
                return Err(MapError::DuplicateName(entry.name.clone()));
            }
        }
        let table = RegisterTable::from_entries(
            self.registers
                .iter()
                .map(|entry| (entry.descriptor(), entry.default)),
        )?;
        log::debug!(target: "regfile", "built table with {} registers", table.len());
        Ok(table)
    }

    /// Table index of the register called `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.registers.iter().position(|entry| entry.name == name)
    }

    /// Name of the register at `index`.
    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.registers.get(index).map(|entry| entry.name.as_str())
    }
}
