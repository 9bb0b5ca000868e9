//! Alternating-bit sequence state and the relay flow-control gate

use crate::types::Seq;
use bytes::Bytes;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Per-node sequence bookkeeping
///
/// Each bit flips exactly once per successful transition and never leaves
/// the 0/1 domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequenceState {
    /// Sequence number awaiting acknowledgement
    pub ack_expected: Seq,

    /// Sequence number for the next newly originated data frame
    pub next_to_send: Seq,

    /// Sequence number accepted as new data from the peer
    pub expected_from_peer: Seq,
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ack_expected       = {}", self.ack_expected)?;
        writeln!(f, "next_to_send       = {}", self.next_to_send)?;
        write!(f, "expected_from_peer = {}", self.expected_from_peer)
    }
}

/// Single-slot busy flag for a relaying node
///
/// Set while a forwarded frame awaits acknowledgement from the next hop.
/// There is no queue behind it: data arriving while it is set is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowGate {
    busy: bool,
}

impl FlowGate {
    /// Try to claim the slot; returns `false` if it is already held
    pub fn try_acquire(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    /// Free the slot
    pub fn release(&mut self) {
        self.busy = false;
    }

    /// Whether a forwarded frame is still outstanding
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

/// The most recently transmitted data payload, kept for retransmission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastSent {
    payload: Bytes,
}

impl LastSent {
    /// Replace the buffered payload
    pub fn store(&mut self, payload: Bytes) {
        self.payload = payload;
    }

    /// Buffered payload; cloning shares the underlying storage
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Buffered payload length
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether nothing has been buffered (or an empty payload was sent)
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
