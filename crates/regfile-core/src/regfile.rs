//! Lock-step composition of the table, store and both bus channels.

use thiserror::Error;

use crate::{
    BusInputs, BusOutputs, NullTraceSink, ReadChannel, ReadEffect, ReadPhase, RegisterStore,
    RegisterTable, TraceEvent, TraceSink, WriteChannel, WriteEffect, WritePhase,
};

/// Misuse of the per-register side-band inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SideBandError {
    /// Index is outside the register table.
    #[error("register index {index} is out of range for a table of {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Table length.
        len: usize,
    },
    /// Register does not source its reads from the fabric.
    #[error("register {index} does not read a fabric value")]
    NotFabricValue {
        /// Requested index.
        index: usize,
    },
}

/// Register-file responder.
///
/// Owns the immutable table, the register store, the fabric input side-band
/// and both channel state machines. [`RegisterFile::step`] is one clock edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    table: RegisterTable,
    store: RegisterStore,
    fabric: Box<[u32]>,
    read: ReadChannel,
    write: WriteChannel,
    was_read: Box<[bool]>,
    was_written: Box<[bool]>,
    steps: u64,
}

impl RegisterFile {
    /// Creates a responder in its reset state.
    ///
    /// Fabric inputs start at the register defaults until driven.
    #[must_use]
    pub fn new(table: RegisterTable) -> Self {
        let len = table.len();
        Self {
            store: RegisterStore::new(&table),
            fabric: table.defaults().into(),
            read: ReadChannel::default(),
            write: WriteChannel::default(),
            was_read: vec![false; len].into_boxed_slice(),
            was_written: vec![false; len].into_boxed_slice(),
            steps: 0,
            table,
        }
    }

    /// Register table this responder decodes against.
    #[must_use]
    pub const fn table(&self) -> &RegisterTable {
        &self.table
    }

    /// Bus outputs for the current step.
    ///
    /// Read data is sampled from the current store and fabric inputs while the
    /// read channel is in its data phase.
    #[must_use]
    pub fn outputs(&self) -> BusOutputs {
        BusOutputs {
            read: self.read.outputs(&self.table, &self.store, &self.fabric),
            write: self.write.outputs(),
        }
    }

    /// Current read channel phase.
    #[must_use]
    pub const fn read_phase(&self) -> ReadPhase {
        self.read.phase()
    }

    /// Current write channel phase.
    #[must_use]
    pub const fn write_phase(&self) -> WritePhase {
        self.write.phase()
    }

    /// Continuous snapshot of every register's stored value.
    #[must_use]
    pub fn register_outputs(&self) -> &[u32] {
        self.store.values()
    }

    /// Stored value of one register.
    #[must_use]
    pub fn register_output(&self, index: usize) -> Option<u32> {
        self.store.get(index)
    }

    /// One-step "was read" notifications from the last step.
    #[must_use]
    pub fn was_read(&self) -> &[bool] {
        &self.was_read
    }

    /// One-step "was written" notifications from the last step.
    #[must_use]
    pub fn was_written(&self) -> &[bool] {
        &self.was_written
    }

    /// Currently driven fabric inputs.
    #[must_use]
    pub fn fabric_inputs(&self) -> &[u32] {
        &self.fabric
    }

    /// Number of steps evaluated since construction or reset.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Drives the live fabric input of a fabric-value register.
    ///
    /// The value is held until driven again and is sampled by the read
    /// channel on every step of a data phase for the register.
    ///
    /// # Errors
    ///
    /// Returns [`SideBandError::IndexOutOfRange`] for an unknown index and
    /// [`SideBandError::NotFabricValue`] for registers that read from the store.
    pub fn set_fabric_input(&mut self, index: usize, value: u32) -> Result<(), SideBandError> {
        let descriptor = self
            .table
            .descriptor(index)
            .ok_or(SideBandError::IndexOutOfRange {
                index,
                len: self.table.len(),
            })?;
        if !descriptor.mode.reads_fabric_value() {
            return Err(SideBandError::NotFabricValue { index });
        }
        self.fabric[index] = value;
        Ok(())
    }

    /// Evaluates one step without tracing.
    pub fn step(&mut self, inputs: &BusInputs) -> BusOutputs {
        self.step_traced(inputs, &mut NullTraceSink)
    }

    /// Evaluates one step and reports accepted handshakes to `sink`.
    ///
    /// Both channels see the pre-step store. The write commit and the pulse
    /// auto-clear are applied last, so they become visible on the returned
    /// outputs together with the notification vectors.
    pub fn step_traced<S>(&mut self, inputs: &BusInputs, sink: &mut S) -> BusOutputs
    where
        S: TraceSink + ?Sized,
    {
        let step = self.steps;
        let (read_next, read_effect) =
            self.read.next(&inputs.read, &self.table, &self.store, &self.fabric);
        let (write_next, write_effect) = self.write.next(&inputs.write, &self.table);

        self.was_read.fill(false);
        self.was_written.fill(false);

        match read_effect {
            ReadEffect::Idle => {}
            ReadEffect::AddressAccepted { address, decoded } => {
                sink.on_event(TraceEvent::ReadAddressAccepted {
                    step,
                    address,
                    decoded,
                });
            }
            ReadEffect::DataAccepted { decoded, response } => {
                if let Some(index) = decoded.index().filter(|_| response.status.is_okay()) {
                    self.was_read[index] = true;
                }
                sink.on_event(TraceEvent::ReadDataAccepted {
                    step,
                    decoded,
                    data: response.data,
                    status: response.status,
                    violation: response.violation,
                });
            }
        }

        match write_effect {
            WriteEffect::Idle => {}
            WriteEffect::AddressAccepted { address, decoded } => {
                sink.on_event(TraceEvent::WriteAddressAccepted {
                    step,
                    address,
                    decoded,
                });
            }
            WriteEffect::DataAccepted {
                decoded,
                data,
                status,
                violation,
                commit,
            } => {
                if let Some(commit) = commit {
                    self.was_written[commit.index] = true;
                }
                sink.on_event(TraceEvent::WriteDataAccepted {
                    step,
                    decoded,
                    data,
                    status,
                    violation,
                });
            }
            WriteEffect::ResponseAccepted { status } => {
                sink.on_event(TraceEvent::WriteResponseAccepted { step, status });
            }
        }

        self.store
            .commit_step(&self.table, write_effect.commit(), |index, value| {
                sink.on_event(TraceEvent::PulseCleared { step, index, value });
            });

        self.read = read_next;
        self.write = write_next;
        self.steps = self.steps.wrapping_add(1);

        self.outputs()
    }

    /// Restores reset state: defaults in the store, both channels in their
    /// address phase, notifications low, step counter zero.
    ///
    /// Fabric inputs are driven externally and keep their values.
    pub fn reset(&mut self) {
        self.store.reset(&self.table);
        self.read = ReadChannel::default();
        self.write = WriteChannel::default();
        self.was_read.fill(false);
        self.was_written.fill(false);
        self.steps = 0;
    }
}
