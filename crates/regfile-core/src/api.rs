//! Bus signal surface and trace hooks for embedding the responder.
//!
//! Inputs are sampled once per [`crate::RegisterFile::step`]; outputs are
//! registered and describe the responder between two steps.

use std::fmt;

use crate::{AccessViolation, DecodedIndex, ResponseStatus};

/// Requester-driven read channel signals for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadInputs {
    /// Read address valid.
    pub ar_valid: bool,
    /// Read address, meaningful while `ar_valid` is set.
    pub ar_addr: u32,
    /// Requester accepts read data.
    pub r_ready: bool,
}

impl ReadInputs {
    /// Presents `addr` and accepts data in the same step.
    #[must_use]
    pub const fn request(addr: u32) -> Self {
        Self {
            ar_valid: true,
            ar_addr: addr,
            r_ready: true,
        }
    }
}

/// Responder-driven read channel signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadOutputs {
    /// Responder accepts a read address.
    pub ar_ready: bool,
    /// Read data valid.
    pub r_valid: bool,
    /// Read data, don't-care unless `r_valid` and `r_resp` is `OKAY`.
    pub r_data: u32,
    /// Read response status.
    pub r_resp: ResponseStatus,
}

/// Requester-driven write channel signals for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WriteInputs {
    /// Write address valid.
    pub aw_valid: bool,
    /// Write address, meaningful while `aw_valid` is set.
    pub aw_addr: u32,
    /// Write data valid.
    pub w_valid: bool,
    /// Write data, meaningful while `w_valid` is set.
    pub w_data: u32,
    /// Requester accepts the write response.
    pub b_ready: bool,
}

impl WriteInputs {
    /// Presents address and data together and accepts the response.
    #[must_use]
    pub const fn request(addr: u32, data: u32) -> Self {
        Self {
            aw_valid: true,
            aw_addr: addr,
            w_valid: true,
            w_data: data,
            b_ready: true,
        }
    }
}

/// Responder-driven write channel signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WriteOutputs {
    /// Responder accepts a write address.
    pub aw_ready: bool,
    /// Responder accepts write data.
    pub w_ready: bool,
    /// Write response valid.
    pub b_valid: bool,
    /// Write response status.
    pub b_resp: ResponseStatus,
}

/// Both channels' requester-driven signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusInputs {
    /// Read channel inputs.
    pub read: ReadInputs,
    /// Write channel inputs.
    pub write: WriteInputs,
}

impl BusInputs {
    /// All valid and ready signals low.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            read: ReadInputs {
                ar_valid: false,
                ar_addr: 0,
                r_ready: false,
            },
            write: WriteInputs {
                aw_valid: false,
                aw_addr: 0,
                w_valid: false,
                w_data: 0,
                b_ready: false,
            },
        }
    }

    /// Drives only the read channel.
    #[must_use]
    pub const fn reading(read: ReadInputs) -> Self {
        Self {
            read,
            write: Self::idle().write,
        }
    }

    /// Drives only the write channel.
    #[must_use]
    pub const fn writing(write: WriteInputs) -> Self {
        Self {
            read: Self::idle().read,
            write,
        }
    }
}

/// Both channels' responder-driven signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusOutputs {
    /// Read channel outputs.
    pub read: ReadOutputs,
    /// Write channel outputs.
    pub write: WriteOutputs,
}

/// Handshake events in the order they are accepted within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// Read address handshake completed and the address was decoded.
    ReadAddressAccepted {
        /// Step counter value of the accepting step.
        step: u64,
        /// Requested address.
        address: u32,
        /// Latched decode result.
        decoded: DecodedIndex,
    },
    /// Read data handshake completed.
    ReadDataAccepted {
        /// Step counter value of the accepting step.
        step: u64,
        /// Latched decode result.
        decoded: DecodedIndex,
        /// Returned data.
        data: u32,
        /// Returned status.
        status: ResponseStatus,
        /// Reason for `SLVERR`, when applicable.
        violation: Option<AccessViolation>,
    },
    /// Write address handshake completed and the address was decoded.
    WriteAddressAccepted {
        /// Step counter value of the accepting step.
        step: u64,
        /// Requested address.
        address: u32,
        /// Latched decode result.
        decoded: DecodedIndex,
    },
    /// Write data handshake completed.
    WriteDataAccepted {
        /// Step counter value of the accepting step.
        step: u64,
        /// Latched decode result.
        decoded: DecodedIndex,
        /// Presented data.
        data: u32,
        /// Pending response status.
        status: ResponseStatus,
        /// Reason for `SLVERR`, when applicable.
        violation: Option<AccessViolation>,
    },
    /// Write response handshake completed.
    WriteResponseAccepted {
        /// Step counter value of the accepting step.
        step: u64,
        /// Delivered status.
        status: ResponseStatus,
    },
    /// A pulse register fell back to its default value.
    PulseCleared {
        /// Step counter value of the clearing step.
        step: u64,
        /// Table index of the register.
        index: usize,
        /// Default value now visible on the output.
        value: u32,
    },
}

impl TraceEvent {
    /// Response status carried by the event, if any.
    #[must_use]
    pub const fn status(&self) -> Option<ResponseStatus> {
        match self {
            Self::ReadDataAccepted { status, .. }
            | Self::WriteDataAccepted { status, .. }
            | Self::WriteResponseAccepted { status, .. } => Some(*status),
            Self::ReadAddressAccepted { .. }
            | Self::WriteAddressAccepted { .. }
            | Self::PulseCleared { .. } => None,
        }
    }
}

fn fmt_decoded(f: &mut fmt::Formatter<'_>, decoded: DecodedIndex) -> fmt::Result {
    match decoded {
        DecodedIndex::Valid(index) => write!(f, "reg[{index}]"),
        DecodedIndex::Invalid => f.write_str("unmapped"),
    }
}

fn fmt_violation(f: &mut fmt::Formatter<'_>, violation: Option<AccessViolation>) -> fmt::Result {
    match violation {
        Some(violation) => write!(f, " ({violation})"),
        None => Ok(()),
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ReadAddressAccepted {
                step,
                address,
                decoded,
            } => {
                write!(f, "[{step}] AR {address:#010x} -> ")?;
                fmt_decoded(f, decoded)
            }
            Self::ReadDataAccepted {
                step,
                decoded,
                data,
                status,
                violation,
            } => {
                write!(f, "[{step}] R  ")?;
                fmt_decoded(f, decoded)?;
                write!(f, " data={data:#010x} resp={status:?}")?;
                fmt_violation(f, violation)
            }
            Self::WriteAddressAccepted {
                step,
                address,
                decoded,
            } => {
                write!(f, "[{step}] AW {address:#010x} -> ")?;
                fmt_decoded(f, decoded)
            }
            Self::WriteDataAccepted {
                step,
                decoded,
                data,
                status,
                violation,
            } => {
                write!(f, "[{step}] W  ")?;
                fmt_decoded(f, decoded)?;
                write!(f, " data={data:#010x} resp={status:?}")?;
                fmt_violation(f, violation)
            }
            Self::WriteResponseAccepted { step, status } => {
                write!(f, "[{step}] B  resp={status:?}")
            }
            Self::PulseCleared { step, index, value } => {
                write!(f, "[{step}] reg[{index}] pulse cleared to {value:#010x}")
            }
        }
    }
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in acceptance order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Forwards events to the `log` facade.
///
/// `SLVERR` completions go to `debug`, everything else to `trace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn on_event(&mut self, event: TraceEvent) {
        if event.status() == Some(ResponseStatus::SlvErr) {
            log::debug!(target: "regfile", "{event}");
        } else {
            log::trace!(target: "regfile", "{event}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BusInputs, ReadInputs, TraceEvent, TraceSink, WriteInputs};
    use crate::{AccessViolation, DecodedIndex, ResponseStatus};

    #[test]
    fn idle_inputs_match_default() {
        assert_eq!(BusInputs::idle(), BusInputs::default());
    }

    #[test]
    fn single_channel_helpers_leave_other_channel_idle() {
        let read = BusInputs::reading(ReadInputs::request(0x10));
        assert!(read.read.ar_valid);
        assert_eq!(read.write, WriteInputs::default());

        let write = BusInputs::writing(WriteInputs::request(0x10, 3));
        assert!(write.write.aw_valid && write.write.w_valid);
        assert_eq!(write.read, ReadInputs::default());
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink = Vec::new();
        sink.on_event(TraceEvent::WriteResponseAccepted {
            step: 1,
            status: ResponseStatus::Okay,
        });
        sink.on_event(TraceEvent::PulseCleared {
            step: 2,
            index: 0,
            value: 0,
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].status(), Some(ResponseStatus::Okay));
        assert_eq!(sink[1].status(), None);
    }

    #[test]
    fn display_names_unmapped_reads_and_violation() {
        let event = TraceEvent::ReadDataAccepted {
            step: 7,
            decoded: DecodedIndex::Invalid,
            data: 0,
            status: ResponseStatus::SlvErr,
            violation: Some(AccessViolation::UnmappedAddress),
        };
        let text = event.to_string();
        assert!(text.starts_with("[7] R  unmapped"));
        assert!(text.contains("SlvErr"));
        assert!(text.contains("no register is mapped"));
    }
}
