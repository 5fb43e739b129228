use std::fmt;

/// Transaction types with a fixed step cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Read address then read data.
    Read,
    /// Write address, write data, then write response.
    Write,
}

/// Individual ready/valid handshakes, in transaction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakePhase {
    /// `ar_valid && ar_ready`.
    ReadAddress,
    /// `r_valid && r_ready`.
    ReadData,
    /// `aw_valid && aw_ready`.
    WriteAddress,
    /// `w_valid && w_ready`.
    WriteData,
    /// `b_valid && b_ready`.
    WriteResponse,
}

impl fmt::Display for HandshakePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadAddress => "read address",
            Self::ReadData => "read data",
            Self::WriteAddress => "write address",
            Self::WriteData => "write data",
            Self::WriteResponse => "write response",
        })
    }
}

impl TransactionKind {
    /// Handshakes that make up one transaction of this kind.
    #[must_use]
    pub const fn phases(self) -> &'static [HandshakePhase] {
        match self {
            Self::Read => &[HandshakePhase::ReadAddress, HandshakePhase::ReadData],
            Self::Write => &[
                HandshakePhase::WriteAddress,
                HandshakePhase::WriteData,
                HandshakePhase::WriteResponse,
            ],
        }
    }
}

/// Steps for a read when the requester never withholds `r_ready`.
pub const READ_TRANSACTION_STEPS: u32 = 2;

/// Steps for a write when the requester never withholds `b_ready`.
pub const WRITE_TRANSACTION_STEPS: u32 = 3;

/// Single source-of-truth step-cost table, independent of address and
/// response status.
pub const TRANSACTION_STEP_TABLE: &[(TransactionKind, u32)] = &[
    (TransactionKind::Read, READ_TRANSACTION_STEPS),
    (TransactionKind::Write, WRITE_TRANSACTION_STEPS),
];

/// Looks up the step cost of a transaction kind.
#[must_use]
pub fn transaction_steps(kind: TransactionKind) -> Option<u32> {
    TRANSACTION_STEP_TABLE
        .iter()
        .find_map(|(entry_kind, steps)| (*entry_kind == kind).then_some(*steps))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{transaction_steps, TransactionKind, TRANSACTION_STEP_TABLE};

    #[test]
    fn table_contains_unique_kinds() {
        let kinds: HashSet<_> = TRANSACTION_STEP_TABLE.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds.len(), TRANSACTION_STEP_TABLE.len());
    }

    #[test]
    fn one_step_per_handshake() {
        for (kind, steps) in TRANSACTION_STEP_TABLE {
            assert_eq!(
                usize::try_from(*steps).expect("step count fits usize"),
                kind.phases().len()
            );
        }
    }

    #[test]
    fn lookup_matches_canonical_costs() {
        assert_eq!(transaction_steps(TransactionKind::Read), Some(2));
        assert_eq!(transaction_steps(TransactionKind::Write), Some(3));
    }
}
