//! Requester-side driver that runs complete transactions against a
//! [`RegisterFile`].

use thiserror::Error;

use crate::{
    BusInputs, BusOutputs, HandshakePhase, ProtocolError, ReadInputs, RegisterFile,
    ResponseStatus, TraceSink, WriteInputs,
};

/// Upper bound on steps the driver waits for any single handshake.
pub const MAX_HANDSHAKE_WAIT_STEPS: u32 = 64;

/// Failure of a driven transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TransactionError {
    /// Responder completed the transaction with `SLVERR`.
    #[error(transparent)]
    SlaveError(#[from] ProtocolError),
    /// Responder did not complete a handshake within the wait bound.
    #[error("no {phase} handshake after {steps} steps")]
    HandshakeTimeout {
        /// Handshake being waited for.
        phase: HandshakePhase,
        /// Steps spent waiting.
        steps: u32,
    },
}

/// Completed read transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadOutcome {
    /// Returned data, don't-care for `SLVERR`.
    pub data: u32,
    /// Returned status.
    pub status: ResponseStatus,
    /// Steps from presenting the address to accepting the data.
    pub steps: u32,
}

/// Completed write transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteOutcome {
    /// Returned status.
    pub status: ResponseStatus,
    /// Steps from presenting the address to accepting the response.
    pub steps: u32,
}

/// Word-level bus access contract.
pub trait RegisterBus {
    /// Error reported for failed accesses.
    type Error;

    /// Reads a 32-bit register.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the access does not complete with `OKAY`.
    fn read32(&mut self, address: u32) -> Result<u32, Self::Error>;

    /// Writes a 32-bit register.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the access does not complete with `OKAY`.
    fn write32(&mut self, address: u32, value: u32) -> Result<(), Self::Error>;
}

/// Single-master driver for one [`RegisterFile`].
///
/// Drives one channel at a time and leaves the other idle.
pub struct Requester<'a> {
    file: &'a mut RegisterFile,
    trace: Option<&'a mut dyn TraceSink>,
    response_delay: u32,
}

impl<'a> Requester<'a> {
    /// Creates a driver that accepts responses as soon as they are valid.
    pub fn new(file: &'a mut RegisterFile) -> Self {
        Self {
            file,
            trace: None,
            response_delay: 0,
        }
    }

    /// Holds `r_ready`/`b_ready` low for `steps` steps after the response
    /// becomes valid.
    #[must_use]
    pub const fn with_response_delay(mut self, steps: u32) -> Self {
        self.response_delay = steps;
        self
    }

    /// Reports every accepted handshake to `sink`.
    #[must_use]
    pub fn with_trace(mut self, sink: &'a mut dyn TraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Responder being driven.
    #[must_use]
    pub fn file(&self) -> &RegisterFile {
        self.file
    }

    /// Mutable access to the responder, e.g. to drive fabric inputs.
    pub fn file_mut(&mut self) -> &mut RegisterFile {
        self.file
    }

    fn step(&mut self, inputs: &BusInputs) -> BusOutputs {
        match self.trace.as_deref_mut() {
            Some(sink) => self.file.step_traced(inputs, sink),
            None => self.file.step(inputs),
        }
    }

    /// Steps with every requester signal low.
    pub fn idle(&mut self, steps: u32) {
        for _ in 0..steps {
            self.step(&BusInputs::idle());
        }
    }

    /// Keeps `inputs` asserted until `ready` was high on the step they were
    /// presented. Returns the pre-step outputs of the accepting step.
    fn handshake(
        &mut self,
        phase: HandshakePhase,
        inputs: &BusInputs,
        ready: impl Fn(&BusOutputs) -> bool,
        steps: &mut u32,
    ) -> Result<BusOutputs, TransactionError> {
        for _ in 0..=MAX_HANDSHAKE_WAIT_STEPS {
            let before = self.file.outputs();
            self.step(inputs);
            *steps += 1;
            if ready(&before) {
                return Ok(before);
            }
        }
        Err(TransactionError::HandshakeTimeout {
            phase,
            steps: MAX_HANDSHAKE_WAIT_STEPS + 1,
        })
    }

    /// Steps an unaccepted response may wait before the driver gives up.
    const fn response_wait_limit(&self) -> u32 {
        MAX_HANDSHAKE_WAIT_STEPS.saturating_add(self.response_delay)
    }

    /// Waits for a valid response, then accepts it after the configured delay.
    fn accept_response(
        &mut self,
        phase: HandshakePhase,
        accept: &BusInputs,
        valid: impl Fn(&BusOutputs) -> bool,
        steps: &mut u32,
    ) -> Result<BusOutputs, TransactionError> {
        let limit = self.response_wait_limit();
        let mut waited = 0;
        while !valid(&self.file.outputs()) || waited < self.response_delay {
            if waited > limit {
                return Err(TransactionError::HandshakeTimeout {
                    phase,
                    steps: waited,
                });
            }
            self.step(&BusInputs::idle());
            *steps += 1;
            waited += 1;
        }
        let before = self.file.outputs();
        self.step(accept);
        *steps += 1;
        Ok(before)
    }

    /// Runs one read transaction.
    ///
    /// `SLVERR` is a completed transaction, reported through
    /// [`ReadOutcome::status`].
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::HandshakeTimeout`] when the responder never
    /// becomes ready or valid.
    pub fn read(&mut self, address: u32) -> Result<ReadOutcome, TransactionError> {
        let mut steps = 0;

        let request = BusInputs::reading(ReadInputs {
            ar_valid: true,
            ar_addr: address,
            r_ready: false,
        });
        self.handshake(
            HandshakePhase::ReadAddress,
            &request,
            |outputs| outputs.read.ar_ready,
            &mut steps,
        )?;

        let accept = BusInputs::reading(ReadInputs {
            r_ready: true,
            ..ReadInputs::default()
        });
        let response = self.accept_response(
            HandshakePhase::ReadData,
            &accept,
            |outputs| outputs.read.r_valid,
            &mut steps,
        )?;

        Ok(ReadOutcome {
            data: response.read.r_data,
            status: response.read.r_resp,
            steps,
        })
    }

    /// Runs one write transaction.
    ///
    /// `SLVERR` is a completed transaction, reported through
    /// [`WriteOutcome::status`].
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::HandshakeTimeout`] when the responder never
    /// becomes ready or valid.
    pub fn write(&mut self, address: u32, value: u32) -> Result<WriteOutcome, TransactionError> {
        let mut steps = 0;

        let address_phase = BusInputs::writing(WriteInputs {
            aw_valid: true,
            aw_addr: address,
            w_valid: true,
            w_data: value,
            b_ready: false,
        });
        self.handshake(
            HandshakePhase::WriteAddress,
            &address_phase,
            |outputs| outputs.write.aw_ready,
            &mut steps,
        )?;

        let data_phase = BusInputs::writing(WriteInputs {
            w_valid: true,
            w_data: value,
            ..WriteInputs::default()
        });
        self.handshake(
            HandshakePhase::WriteData,
            &data_phase,
            |outputs| outputs.write.w_ready,
            &mut steps,
        )?;

        let accept = BusInputs::writing(WriteInputs {
            b_ready: true,
            ..WriteInputs::default()
        });
        let response = self.accept_response(
            HandshakePhase::WriteResponse,
            &accept,
            |outputs| outputs.write.b_valid,
            &mut steps,
        )?;

        Ok(WriteOutcome {
            status: response.write.b_resp,
            steps,
        })
    }
}

impl RegisterBus for Requester<'_> {
    type Error = TransactionError;

    fn read32(&mut self, address: u32) -> Result<u32, Self::Error> {
        let outcome = self.read(address)?;
        outcome.status.into_result()?;
        Ok(outcome.data)
    }

    fn write32(&mut self, address: u32, value: u32) -> Result<(), Self::Error> {
        let outcome = self.write(address, value)?;
        outcome.status.into_result()?;
        Ok(())
    }
}
