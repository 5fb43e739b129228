//! Address decoding from bus addresses to register table indices.

use crate::{AccessViolation, RegisterDescriptor, RegisterTable};

/// Transaction-scoped identity of the register an address selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DecodedIndex {
    /// Address selects the register at this table index.
    Valid(usize),
    /// Address selects no register.
    #[default]
    Invalid,
}

impl DecodedIndex {
    /// Returns the table index, if the address decoded.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Valid(index) => Some(index),
            Self::Invalid => None,
        }
    }

    /// Returns `true` when the address decoded to a register.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Flat index where `Invalid` is encoded as one past the end of a table
    /// with `len` registers.
    #[must_use]
    pub const fn as_raw(self, len: usize) -> usize {
        match self {
            Self::Valid(index) => index,
            Self::Invalid => len,
        }
    }
}

/// Decodes `addr` against every descriptor in table order.
///
/// Decoding is a pure function of the table and the address. Tables built
/// through [`RegisterTable::new`] are injective, so at most one descriptor can
/// match.
#[must_use]
pub fn decode_address(table: &RegisterTable, addr: u32) -> DecodedIndex {
    table
        .descriptors()
        .iter()
        .position(|descriptor| descriptor.matches(addr))
        .map_or(DecodedIndex::Invalid, DecodedIndex::Valid)
}

impl RegisterTable {
    /// Decodes a bus address. See [`decode_address`].
    #[must_use]
    pub fn decode(&self, addr: u32) -> DecodedIndex {
        decode_address(self, addr)
    }

    /// Resolves a latched index for a read, checking the register mode.
    ///
    /// # Errors
    ///
    /// Returns [`AccessViolation::UnmappedAddress`] for `Invalid` and
    /// [`AccessViolation::ReadOfWriteOnly`] for registers without a read side.
    pub fn check_read(
        &self,
        decoded: DecodedIndex,
    ) -> Result<(usize, &RegisterDescriptor), AccessViolation> {
        let (index, descriptor) = self.resolve(decoded)?;
        if descriptor.mode.is_readable() {
            Ok((index, descriptor))
        } else {
            Err(AccessViolation::ReadOfWriteOnly)
        }
    }

    /// Resolves a latched index for a write, checking the register mode.
    ///
    /// # Errors
    ///
    /// Returns [`AccessViolation::UnmappedAddress`] for `Invalid` and
    /// [`AccessViolation::WriteOfReadOnly`] for registers without a write side.
    pub fn check_write(
        &self,
        decoded: DecodedIndex,
    ) -> Result<(usize, &RegisterDescriptor), AccessViolation> {
        let (index, descriptor) = self.resolve(decoded)?;
        if descriptor.mode.is_writable() {
            Ok((index, descriptor))
        } else {
            Err(AccessViolation::WriteOfReadOnly)
        }
    }

    fn resolve(
        &self,
        decoded: DecodedIndex,
    ) -> Result<(usize, &RegisterDescriptor), AccessViolation> {
        decoded
            .index()
            .and_then(|index| self.descriptor(index).map(|descriptor| (index, descriptor)))
            .ok_or(AccessViolation::UnmappedAddress)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_address, DecodedIndex};
    use crate::{AccessViolation, RegisterDescriptor, RegisterMode, RegisterTable};

    fn sample_table() -> RegisterTable {
        RegisterTable::from_entries([
            (RegisterDescriptor::new(0x0, RegisterMode::ReadWrite), 0),
            (RegisterDescriptor::new(0x4, RegisterMode::WriteOnlyPulse), 0),
            (RegisterDescriptor::new(0xC, RegisterMode::ReadOnly), 0x1234),
            (
                RegisterDescriptor::new(0x100, RegisterMode::ReadOnlyFabricValue).with_mask(0xF00),
                0,
            ),
        ])
        .expect("sample table is injective")
    }

    #[test]
    fn decodes_exact_addresses() {
        let table = sample_table();
        assert_eq!(decode_address(&table, 0x0), DecodedIndex::Valid(0));
        assert_eq!(decode_address(&table, 0x4), DecodedIndex::Valid(1));
        assert_eq!(decode_address(&table, 0xC), DecodedIndex::Valid(2));
    }

    #[test]
    fn gaps_and_unaligned_addresses_are_invalid() {
        let table = sample_table();
        assert_eq!(table.decode(0x8), DecodedIndex::Invalid);
        assert_eq!(table.decode(0x2), DecodedIndex::Invalid);
        assert_eq!(table.decode(0x10), DecodedIndex::Invalid);
        assert_eq!(table.decode(u32::MAX), DecodedIndex::Invalid);
    }

    #[test]
    fn masked_descriptor_decodes_whole_range() {
        let table = sample_table();
        assert_eq!(table.decode(0x100), DecodedIndex::Valid(3));
        assert_eq!(table.decode(0x1F8), DecodedIndex::Valid(3));
        assert_eq!(table.decode(0x200), DecodedIndex::Invalid);
    }

    #[test]
    fn decoding_is_deterministic() {
        let table = sample_table();
        for addr in 0..0x400 {
            assert_eq!(table.decode(addr), table.decode(addr));
        }
    }

    #[test]
    fn invalid_raw_index_is_one_past_the_end() {
        let table = sample_table();
        assert_eq!(DecodedIndex::Invalid.as_raw(table.len()), 4);
        assert_eq!(DecodedIndex::Valid(2).as_raw(table.len()), 2);
        assert_eq!(DecodedIndex::default(), DecodedIndex::Invalid);
        assert!(!DecodedIndex::Invalid.is_valid());
    }

    #[test]
    fn mode_checks_report_violations() {
        let table = sample_table();
        assert_eq!(
            table.check_read(DecodedIndex::Invalid).map(|(index, _)| index),
            Err(AccessViolation::UnmappedAddress)
        );
        assert_eq!(
            table.check_read(DecodedIndex::Valid(1)).map(|(index, _)| index),
            Err(AccessViolation::ReadOfWriteOnly)
        );
        assert_eq!(
            table.check_write(DecodedIndex::Valid(2)).map(|(index, _)| index),
            Err(AccessViolation::WriteOfReadOnly)
        );
        assert_eq!(
            table.check_write(DecodedIndex::Valid(0)).map(|(index, _)| index),
            Ok(0)
        );
        assert_eq!(
            table.check_read(DecodedIndex::Valid(9)).map(|(index, _)| index),
            Err(AccessViolation::UnmappedAddress)
        );
    }
}
