//! Per-channel responder state machines.
//!
//! Each channel is a pure transition `next(&self, inputs, ..) -> (Self,
//! effect)` evaluated once per step by [`crate::RegisterFile`]. Outputs are a
//! function of the channel state alone.

/// Two-phase read channel.
pub mod read;
/// Three-phase write channel.
pub mod write;

pub use read::{evaluate_read, ReadChannel, ReadEffect, ReadPhase, ReadResponse};
pub use write::{WriteChannel, WriteEffect, WritePhase};
