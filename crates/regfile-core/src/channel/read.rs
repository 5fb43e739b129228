use crate::{
    AccessViolation, DecodedIndex, ReadInputs, ReadOutputs, RegisterStore, RegisterTable,
    ResponseStatus,
};

/// Read channel phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ReadPhase {
    /// Waiting for a read address; `ar_ready` is high.
    #[default]
    AddressPhase,
    /// Presenting the response; `r_valid` is high.
    DataPhase,
}

/// Response presented while the read channel is in its data phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadResponse {
    /// Returned data, zero for `SLVERR`.
    pub data: u32,
    /// Returned status.
    pub status: ResponseStatus,
    /// Reason for `SLVERR`, when applicable.
    pub violation: Option<AccessViolation>,
}

/// What happened on the read channel during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadEffect {
    /// No handshake.
    Idle,
    /// Address handshake; the decode result is latched.
    AddressAccepted {
        /// Requested address.
        address: u32,
        /// Latched decode result.
        decoded: DecodedIndex,
    },
    /// Data handshake; the transaction is complete.
    DataAccepted {
        /// Decode result of the completed transaction.
        decoded: DecodedIndex,
        /// Response presented on the accepting step.
        response: ReadResponse,
    },
}

/// Computes the response for a latched decode result.
///
/// Fabric-value registers answer from `fabric`, every other readable register
/// from the store. Evaluated on every data-phase step, so the response follows
/// the current values rather than those seen at the address handshake.
#[must_use]
pub fn evaluate_read(
    table: &RegisterTable,
    store: &RegisterStore,
    fabric: &[u32],
    decoded: DecodedIndex,
) -> ReadResponse {
    match table.check_read(decoded) {
        Ok((index, descriptor)) => {
            let data = if descriptor.mode.reads_fabric_value() {
                fabric.get(index).copied()
            } else {
                store.get(index)
            };
            ReadResponse {
                data: data.unwrap_or_default(),
                status: ResponseStatus::Okay,
                violation: None,
            }
        }
        Err(violation) => ReadResponse {
            data: 0,
            status: violation.protocol_error().status(),
            violation: Some(violation),
        },
    }
}

/// Registered state of the read channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadChannel {
    phase: ReadPhase,
    decoded: DecodedIndex,
}

impl ReadChannel {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ReadPhase {
        self.phase
    }

    /// Decode result of the transaction in flight, if any.
    #[must_use]
    pub const fn decoded(&self) -> Option<DecodedIndex> {
        match self.phase {
            ReadPhase::AddressPhase => None,
            ReadPhase::DataPhase => Some(self.decoded),
        }
    }

    /// Response currently presented, `None` outside the data phase.
    #[must_use]
    pub fn response(
        &self,
        table: &RegisterTable,
        store: &RegisterStore,
        fabric: &[u32],
    ) -> Option<ReadResponse> {
        match self.phase {
            ReadPhase::AddressPhase => None,
            ReadPhase::DataPhase => Some(evaluate_read(table, store, fabric, self.decoded)),
        }
    }

    /// Channel outputs for the current store and fabric inputs.
    #[must_use]
    pub fn outputs(
        &self,
        table: &RegisterTable,
        store: &RegisterStore,
        fabric: &[u32],
    ) -> ReadOutputs {
        match self.response(table, store, fabric) {
            None => ReadOutputs {
                ar_ready: true,
                r_valid: false,
                r_data: 0,
                r_resp: ResponseStatus::Okay,
            },
            Some(response) => ReadOutputs {
                ar_ready: false,
                r_valid: true,
                r_data: response.data,
                r_resp: response.status,
            },
        }
    }

    /// Evaluates one step.
    ///
    /// `store` and `fabric` are the values before this step's write commit.
    /// A data handshake delivers the response presented on this step, so a
    /// write accepted on the same step is not observed.
    #[must_use]
    pub fn next(
        &self,
        inputs: &ReadInputs,
        table: &RegisterTable,
        store: &RegisterStore,
        fabric: &[u32],
    ) -> (Self, ReadEffect) {
        match self.phase {
            ReadPhase::AddressPhase if inputs.ar_valid => {
                let decoded = table.decode(inputs.ar_addr);
                let next = Self {
                    phase: ReadPhase::DataPhase,
                    decoded,
                };
                let effect = ReadEffect::AddressAccepted {
                    address: inputs.ar_addr,
                    decoded,
                };
                (next, effect)
            }
            ReadPhase::DataPhase if inputs.r_ready => {
                let effect = ReadEffect::DataAccepted {
                    decoded: self.decoded,
                    response: evaluate_read(table, store, fabric, self.decoded),
                };
                (Self::default(), effect)
            }
            ReadPhase::AddressPhase | ReadPhase::DataPhase => (*self, ReadEffect::Idle),
        }
    }
}
