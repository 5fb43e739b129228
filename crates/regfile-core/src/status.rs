use thiserror::Error;

/// Response status carried on the read-data and write-response channels.
///
/// Values use the two-bit AXI response encoding so that traces and wire dumps
/// stay comparable with bus monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ResponseStatus {
    /// Transaction completed normally (`OKAY`).
    #[default]
    Okay = 0b00,
    /// Transaction targeted an unmapped address or a forbidden mode (`SLVERR`).
    SlvErr = 0b10,
}

impl ResponseStatus {
    /// Converts a status to its two-bit wire encoding.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a two-bit wire encoding back into a status.
    ///
    /// `EXOKAY` and `DECERR` are never produced by the responder and decode to
    /// `None`.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0b00 => Some(Self::Okay),
            0b10 => Some(Self::SlvErr),
            _ => None,
        }
    }

    /// Returns `true` for `OKAY`.
    #[must_use]
    pub const fn is_okay(self) -> bool {
        matches!(self, Self::Okay)
    }

    /// Maps the status onto the protocol error surface.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::SlvErr`] for [`ResponseStatus::SlvErr`].
    pub const fn into_result(self) -> Result<(), ProtocolError> {
        match self {
            Self::Okay => Ok(()),
            Self::SlvErr => Err(ProtocolError::SlvErr),
        }
    }
}

/// The only error a requester can observe from the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ProtocolError {
    /// Slave error response: unmapped address or access mode violation.
    #[error("slave error response")]
    SlvErr,
}

impl ProtocolError {
    /// Returns the response status that delivers this error on the bus.
    #[must_use]
    pub const fn status(self) -> ResponseStatus {
        match self {
            Self::SlvErr => ResponseStatus::SlvErr,
        }
    }
}

/// Responder-side reason behind a `SLVERR` response.
///
/// Never visible on the bus; surfaced through trace events and logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessViolation {
    /// No descriptor decodes the requested address.
    #[error("no register is mapped at the requested address")]
    UnmappedAddress,
    /// Read issued to a register whose mode has no read side.
    #[error("register mode does not permit reads")]
    ReadOfWriteOnly,
    /// Write issued to a register whose mode has no write side.
    #[error("register mode does not permit writes")]
    WriteOfReadOnly,
}

impl AccessViolation {
    /// Every violation is reported to the requester as `SLVERR`.
    #[must_use]
    pub const fn protocol_error(self) -> ProtocolError {
        ProtocolError::SlvErr
    }
}

impl From<AccessViolation> for ProtocolError {
    fn from(violation: AccessViolation) -> Self {
        violation.protocol_error()
    }
}
