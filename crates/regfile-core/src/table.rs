//! Immutable register descriptor table.

use thiserror::Error;

use crate::RegisterMode;

/// Width in bytes of one register slot on the bus.
pub const REGISTER_SLOT_BYTES: u32 = 4;

/// Mask that makes a descriptor match exactly one address.
pub const EXACT_MATCH_MASK: u32 = u32::MAX;

/// Static description of one register slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterDescriptor {
    /// Byte address of the slot.
    pub address: u32,
    /// Access mode enforced by the responder.
    pub mode: RegisterMode,
    /// Address bits that take part in matching.
    pub mask: u32,
}

impl RegisterDescriptor {
    /// Creates a descriptor that matches exactly `address`.
    #[must_use]
    pub const fn new(address: u32, mode: RegisterMode) -> Self {
        Self {
            address,
            mode,
            mask: EXACT_MATCH_MASK,
        }
    }

    /// Returns a copy that matches every address equal to `address` under `mask`.
    #[must_use]
    pub const fn with_mask(self, mask: u32) -> Self {
        Self { mask, ..self }
    }

    /// Returns `true` when `addr` selects this descriptor.
    #[must_use]
    pub const fn matches(&self, addr: u32) -> bool {
        addr & self.mask == self.address & self.mask
    }

    /// Returns `true` when some address would select both descriptors.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        (self.address ^ other.address) & self.mask & other.mask == 0
    }
}

/// Construction-time validation failures for a register table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TableError {
    /// Descriptor and default sequences differ in length.
    #[error("{descriptors} descriptors but {defaults} default values")]
    LengthMismatch {
        /// Number of descriptors supplied.
        descriptors: usize,
        /// Number of default values supplied.
        defaults: usize,
    },
    /// Descriptor address is not aligned to a register slot.
    #[error("register {index} address {address:#010x} is not aligned to a 4-byte slot")]
    UnalignedAddress {
        /// Table index of the offending descriptor.
        index: usize,
        /// Offending address.
        address: u32,
    },
    /// Two descriptors decode a common address.
    #[error("registers {first} and {second} decode overlapping addresses")]
    OverlappingDecode {
        /// Lower table index.
        first: usize,
        /// Higher table index.
        second: usize,
    },
}

/// Ordered register descriptors with their default values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterTable {
    descriptors: Box<[RegisterDescriptor]>,
    defaults: Box<[u32]>,
}

impl RegisterTable {
    /// Builds a table, validating alignment and decode injectivity.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::LengthMismatch`] when the sequences differ in
    /// length, [`TableError::UnalignedAddress`] for a misaligned slot and
    /// [`TableError::OverlappingDecode`] when two descriptors can match the
    /// same address.
    pub fn new(
        descriptors: Vec<RegisterDescriptor>,
        defaults: Vec<u32>,
    ) -> Result<Self, TableError> {
        if descriptors.len() != defaults.len() {
            return Err(TableError::LengthMismatch {
                descriptors: descriptors.len(),
                defaults: defaults.len(),
            });
        }

        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.address % REGISTER_SLOT_BYTES != 0 {
                return Err(TableError::UnalignedAddress {
                    index,
                    address: descriptor.address,
                });
            }
        }

        for (first, lhs) in descriptors.iter().enumerate() {
            for (offset, rhs) in descriptors[first + 1..].iter().enumerate() {
                if lhs.overlaps(rhs) {
                    return Err(TableError::OverlappingDecode {
                        first,
                        second: first + 1 + offset,
                    });
                }
            }
        }

        Ok(Self {
            descriptors: descriptors.into_boxed_slice(),
            defaults: defaults.into_boxed_slice(),
        })
    }

    /// Builds a table from `(descriptor, default)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`RegisterTable::new`], minus the length mismatch.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (RegisterDescriptor, u32)>,
    ) -> Result<Self, TableError> {
        let (descriptors, defaults): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        Self::new(descriptors, defaults)
    }

    /// Number of registers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` for a table without registers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptor at `index`, if any.
    #[must_use]
    pub fn descriptor(&self, index: usize) -> Option<&RegisterDescriptor> {
        self.descriptors.get(index)
    }

    /// Default value at `index`, if any.
    #[must_use]
    pub fn default_value(&self, index: usize) -> Option<u32> {
        self.defaults.get(index).copied()
    }

    /// All descriptors in table order.
    #[must_use]
    pub fn descriptors(&self) -> &[RegisterDescriptor] {
        &self.descriptors
    }

    /// All default values in table order.
    #[must_use]
    pub fn defaults(&self) -> &[u32] {
        &self.defaults
    }
}
