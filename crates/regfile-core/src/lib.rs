//! Core register-file responder crate.
//!
//! A [`RegisterFile`] answers single-beat 32-bit read and write transactions
//! on two independent ready/valid channels, decodes addresses against an
//! immutable [`RegisterTable`] and enforces per-register access modes with
//! `SLVERR` responses. Time advances only through [`RegisterFile::step`].

/// Response status codes and access violation taxonomy.
pub mod status;
pub use status::{AccessViolation, ProtocolError, ResponseStatus};

/// Register access modes.
pub mod mode;
pub use mode::RegisterMode;

/// Register descriptors and the validated descriptor table.
pub mod table;
pub use table::{
    RegisterDescriptor, RegisterTable, TableError, EXACT_MATCH_MASK, REGISTER_SLOT_BYTES,
};

/// Address decoding and mode checks.
pub mod decoder;
pub use decoder::{decode_address, DecodedIndex};

/// Register value storage with pulse auto-clear.
pub mod store;
pub use store::{RegisterStore, StoreWrite};

/// Bus signal structs and trace hooks.
pub mod api;
pub use api::{
    BusInputs, BusOutputs, LogTraceSink, NullTraceSink, ReadInputs, ReadOutputs, TraceEvent,
    TraceSink, WriteInputs, WriteOutputs,
};

/// Read and write channel state machines.
pub mod channel;
pub use channel::{
    evaluate_read, ReadChannel, ReadEffect, ReadPhase, ReadResponse, WriteChannel, WriteEffect,
    WritePhase,
};

/// Step-level responder composition.
pub mod regfile;
pub use regfile::{RegisterFile, SideBandError};

/// Fixed transaction step costs.
pub mod timing;
pub use timing::{
    transaction_steps, HandshakePhase, TransactionKind, READ_TRANSACTION_STEPS,
    TRANSACTION_STEP_TABLE, WRITE_TRANSACTION_STEPS,
};

/// Transaction-level requester driver.
pub mod requester;
pub use requester::{
    ReadOutcome, RegisterBus, Requester, TransactionError, WriteOutcome,
    MAX_HANDSHAKE_WAIT_STEPS,
};

/// Named register maps.
pub mod config;
pub use config::{MapError, RegisterMap, RegisterSpec};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
