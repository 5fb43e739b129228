use crate::{
    AccessViolation, DecodedIndex, RegisterTable, ResponseStatus, StoreWrite, WriteInputs,
    WriteOutputs,
};

/// Write channel phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum WritePhase {
    /// Waiting for a write address; `aw_ready` is high.
    #[default]
    AddressPhase,
    /// Waiting for write data; `w_ready` is high.
    DataPhase,
    /// Presenting the response; `b_valid` is high.
    ResponsePhase,
}

/// What happened on the write channel during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteEffect {
    /// No handshake.
    Idle,
    /// Address handshake; the decode result is latched.
    AddressAccepted {
        /// Requested address.
        address: u32,
        /// Latched decode result.
        decoded: DecodedIndex,
    },
    /// Data handshake; the pending status is set.
    DataAccepted {
        /// Latched decode result.
        decoded: DecodedIndex,
        /// Presented data.
        data: u32,
        /// Pending response status.
        status: ResponseStatus,
        /// Reason for `SLVERR`, when applicable.
        violation: Option<AccessViolation>,
        /// Store update to commit at the end of the step.
        commit: Option<StoreWrite>,
    },
    /// Response handshake; the transaction is complete.
    ResponseAccepted {
        /// Delivered status.
        status: ResponseStatus,
    },
}

impl WriteEffect {
    /// Store update requested by this step, if any.
    #[must_use]
    pub const fn commit(&self) -> Option<StoreWrite> {
        match self {
            Self::DataAccepted { commit, .. } => *commit,
            Self::Idle | Self::AddressAccepted { .. } | Self::ResponseAccepted { .. } => None,
        }
    }
}

/// Registered state of the write channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WriteChannel {
    phase: WritePhase,
    decoded: DecodedIndex,
    status: ResponseStatus,
}

impl WriteChannel {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> WritePhase {
        self.phase
    }

    /// Decode result of the transaction in flight, if any.
    #[must_use]
    pub const fn decoded(&self) -> Option<DecodedIndex> {
        match self.phase {
            WritePhase::AddressPhase => None,
            WritePhase::DataPhase | WritePhase::ResponsePhase => Some(self.decoded),
        }
    }

    /// Registered channel outputs.
    #[must_use]
    pub const fn outputs(&self) -> WriteOutputs {
        WriteOutputs {
            aw_ready: matches!(self.phase, WritePhase::AddressPhase),
            w_ready: matches!(self.phase, WritePhase::DataPhase),
            b_valid: matches!(self.phase, WritePhase::ResponsePhase),
            b_resp: match self.phase {
                WritePhase::ResponsePhase => self.status,
                WritePhase::AddressPhase | WritePhase::DataPhase => ResponseStatus::Okay,
            },
        }
    }

    /// Evaluates one step.
    ///
    /// The store is not touched here; an accepted write is returned as
    /// the `commit` of [`WriteEffect::DataAccepted`] for the register file to apply
    /// after every channel has been evaluated.
    #[must_use]
    pub fn next(&self, inputs: &WriteInputs, table: &RegisterTable) -> (Self, WriteEffect) {
        match self.phase {
            WritePhase::AddressPhase if inputs.aw_valid => {
                let decoded = table.decode(inputs.aw_addr);
                let next = Self {
                    phase: WritePhase::DataPhase,
                    decoded,
                    status: ResponseStatus::Okay,
                };
                let effect = WriteEffect::AddressAccepted {
                    address: inputs.aw_addr,
                    decoded,
                };
                (next, effect)
            }
            WritePhase::DataPhase if inputs.w_valid => {
                let (status, violation, commit) = match table.check_write(self.decoded) {
                    Ok((index, _)) => (
                        ResponseStatus::Okay,
                        None,
                        Some(StoreWrite {
                            index,
                            value: inputs.w_data,
                        }),
                    ),
                    Err(violation) => (violation.protocol_error().status(), Some(violation), None),
                };
                let next = Self {
                    phase: WritePhase::ResponsePhase,
                    status,
                    ..*self
                };
                let effect = WriteEffect::DataAccepted {
                    decoded: self.decoded,
                    data: inputs.w_data,
                    status,
                    violation,
                    commit,
                };
                (next, effect)
            }
            WritePhase::ResponsePhase if inputs.b_ready => {
                let effect = WriteEffect::ResponseAccepted {
                    status: self.status,
                };
                (Self::default(), effect)
            }
            WritePhase::AddressPhase | WritePhase::DataPhase | WritePhase::ResponsePhase => {
                (*self, WriteEffect::Idle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{WriteChannel, WriteEffect, WritePhase};
    use crate::{
        AccessViolation, DecodedIndex, RegisterDescriptor, RegisterMode, RegisterTable,
        ResponseStatus, StoreWrite, WriteInputs,
    };

    fn table() -> RegisterTable {
        RegisterTable::from_entries([
            (RegisterDescriptor::new(0x0, RegisterMode::ReadWrite), 0),
            (RegisterDescriptor::new(0x4, RegisterMode::ReadOnly), 0),
        ])
        .expect("valid table")
    }

    fn run_to_response(table: &RegisterTable, addr: u32, data: u32) -> (WriteChannel, WriteEffect) {
        let inputs = WriteInputs {
            b_ready: false,
            ..WriteInputs::request(addr, data)
        };
        let (data_phase, _) = WriteChannel::default().next(&inputs, table);
        data_phase.next(&inputs, table)
    }

    #[test]
    fn phases_drive_exactly_one_ready_or_valid() {
        let table = table();
        let inputs = WriteInputs::request(0x0, 1);
        let mut channel = WriteChannel::default();

        for expected in [
            WritePhase::AddressPhase,
            WritePhase::DataPhase,
            WritePhase::ResponsePhase,
            WritePhase::AddressPhase,
        ] {
            assert_eq!(channel.phase(), expected);
            let outputs = channel.outputs();
            let asserted = [outputs.aw_ready, outputs.w_ready, outputs.b_valid];
            assert_eq!(asserted.iter().filter(|bit| **bit).count(), 1);
            channel = channel.next(&inputs, &table).0;
        }
    }

    #[test]
    fn accepted_write_requests_commit() {
        let table = table();
        let (response_phase, effect) = run_to_response(&table, 0x0, 0xBEEF);

        assert_eq!(
            effect.commit(),
            Some(StoreWrite {
                index: 0,
                value: 0xBEEF
            })
        );
        assert!(response_phase.outputs().b_valid);
        assert_eq!(response_phase.outputs().b_resp, ResponseStatus::Okay);
        assert_eq!(response_phase.decoded(), Some(DecodedIndex::Valid(0)));
    }

    #[test]
    fn read_only_write_is_rejected_without_commit() {
        let table = table();
        let (response_phase, effect) = run_to_response(&table, 0x4, 1);

        assert_eq!(effect.commit(), None);
        assert!(matches!(
            effect,
            WriteEffect::DataAccepted {
                violation: Some(AccessViolation::WriteOfReadOnly),
                ..
            }
        ));
        assert_eq!(response_phase.outputs().b_resp, ResponseStatus::SlvErr);
    }

    #[test]
    fn unmapped_write_is_rejected_without_commit() {
        let table = table();
        let (response_phase, effect) = run_to_response(&table, 0x40, 1);

        assert_eq!(effect.commit(), None);
        assert_eq!(response_phase.outputs().b_resp, ResponseStatus::SlvErr);
    }

    #[test]
    fn response_is_held_until_accepted() {
        let table = table();
        let (response_phase, _) = run_to_response(&table, 0x0, 1);

        let (held, effect) = response_phase.next(&WriteInputs::default(), &table);
        assert_eq!(held, response_phase);
        assert_eq!(effect, WriteEffect::Idle);

        let accept = WriteInputs {
            b_ready: true,
            ..WriteInputs::default()
        };
        let (done, effect) = held.next(&accept, &table);
        assert_eq!(
            effect,
            WriteEffect::ResponseAccepted {
                status: ResponseStatus::Okay
            }
        );
        assert_eq!(done, WriteChannel::default());
    }

    #[test]
    fn address_ready_stays_low_until_response_accepted() {
        let table = table();
        let (response_phase, _) = run_to_response(&table, 0x0, 1);
        assert!(!response_phase.outputs().aw_ready);

        let new_address = WriteInputs {
            aw_valid: true,
            aw_addr: 0x4,
            ..WriteInputs::default()
        };
        let (held, effect) = response_phase.next(&new_address, &table);
        assert_eq!(held.phase(), WritePhase::ResponsePhase);
        assert_eq!(effect, WriteEffect::Idle);
    }
}
