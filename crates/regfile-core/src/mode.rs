//! Register access modes and their read/write/pulse properties.

/// Access mode of a single register slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RegisterMode {
    /// Readable, returns the stored (default) value. Writes are rejected.
    ReadOnly,
    /// Readable, returns the live fabric input. Writes are rejected.
    ReadOnlyFabricValue,
    /// Writable, drives the register output. Reads are rejected.
    WriteOnly,
    /// Readable and writable, reads return the stored value.
    ReadWrite,
    /// Writable, the written value is visible for exactly one step.
    WriteOnlyPulse,
    /// Reads return the live fabric input, writes are one-step pulses.
    ReadFabricWritePulse,
}

impl RegisterMode {
    /// Every defined mode, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::ReadOnly,
        Self::ReadOnlyFabricValue,
        Self::WriteOnly,
        Self::ReadWrite,
        Self::WriteOnlyPulse,
        Self::ReadFabricWritePulse,
    ];

    /// Returns `true` when a read transaction may target this register.
    #[must_use]
    pub const fn is_readable(self) -> bool {
        matches!(
            self,
            Self::ReadOnly | Self::ReadOnlyFabricValue | Self::ReadWrite | Self::ReadFabricWritePulse
        )
    }

    /// Returns `true` when a write transaction may target this register.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(
            self,
            Self::WriteOnly | Self::ReadWrite | Self::WriteOnlyPulse | Self::ReadFabricWritePulse
        )
    }

    /// Returns `true` when the stored value reverts to default every step.
    #[must_use]
    pub const fn is_pulse(self) -> bool {
        matches!(self, Self::WriteOnlyPulse | Self::ReadFabricWritePulse)
    }

    /// Returns `true` when reads are sourced from the fabric input side-band.
    #[must_use]
    pub const fn reads_fabric_value(self) -> bool {
        matches!(self, Self::ReadOnlyFabricValue | Self::ReadFabricWritePulse)
    }

    /// Short mnemonic used in listings.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::ReadOnly => "r",
            Self::ReadOnlyFabricValue => "r_fabric",
            Self::WriteOnly => "w",
            Self::ReadWrite => "r_w",
            Self::WriteOnlyPulse => "wpulse",
            Self::ReadFabricWritePulse => "r_wpulse",
        }
    }
}
