//! Go-Back-N receive-side state machine.
//!
//! [`ReceiverSession`] implements the receiver side of Go-Back-N:
//!
//! - Only the **strictly next** segment is accepted (`seq == expected`);
//!   acceptance advances the expected offset by the segment's declared
//!   length.
//! - Out-of-order and duplicate segments leave the state untouched.
//! - Synthetic loss is applied *before* any of this: a dropped segment
//!   mutates nothing and must not be acknowledged, exactly as if the
//!   network had eaten it.
//! - After every surviving segment the caller sends a **cumulative ACK**
//!   carrying [`ReceiverSession::ack_value`] — so an out-of-order segment
//!   produces a non-advancing duplicate ACK, which the sender filters.
//!
//! The session tracks a single expected offset.  Interleaved DATA from a
//! second concurrent sender would share that cursor and corrupt the
//! transfer; one active session at a time is assumed.
//!
//! This module only manages state; all socket I/O is the caller's
//! responsibility (the listener loop lives in [`crate::transfer`]).

use crate::loss::LossModel;

/// What happened to one inbound DATA segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataVerdict {
    /// Synthetic loss consumed the segment: no state change, no ACK.
    Dropped,
    /// In-order segment; the expected offset advanced past it.
    Accepted,
    /// Gap or duplicate; state unchanged, but a duplicate ACK still goes out.
    OutOfOrder,
}

impl DataVerdict {
    /// `true` when the caller must answer with a cumulative ACK.
    pub fn wants_ack(self) -> bool {
        !matches!(self, Self::Dropped)
    }
}

/// Receive-side state for one transfer.
pub struct ReceiverSession {
    /// Byte offset of the next in-order segment.
    expected: u32,
    loss: Box<dyn LossModel>,
}

impl ReceiverSession {
    /// Create a session with the given loss model and expected offset 0.
    pub fn new(loss: Box<dyn LossModel>) -> Self {
        Self { expected: 0, loss }
    }

    /// Rewind to offset 0 for a fresh transfer (called when a handshake
    /// completes).
    pub fn reset(&mut self) {
        self.expected = 0;
    }

    /// Cumulative ACK value for the next outbound ACK: every stream byte
    /// strictly below it has been received in order.
    pub fn ack_value(&self) -> u32 {
        self.expected
    }

    /// Process one inbound DATA segment.
    ///
    /// `length` is the declared header length — the value by which the
    /// expected offset advances on acceptance.
    pub fn on_data(&mut self, seq: u32, length: u16) -> DataVerdict {
        if self.loss.should_drop(seq) {
            return DataVerdict::Dropped;
        }
        if seq == self.expected {
            self.expected = self.expected.wrapping_add(u32::from(length));
            DataVerdict::Accepted
        } else {
            DataVerdict::OutOfOrder
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::{NoLoss, RandomLoss};

    fn lossless() -> ReceiverSession {
        ReceiverSession::new(Box::new(NoLoss))
    }

    #[test]
    fn in_order_segment_advances_by_declared_length() {
        let mut r = lossless();
        assert_eq!(r.on_data(0, 80), DataVerdict::Accepted);
        assert_eq!(r.ack_value(), 80);
        assert_eq!(r.on_data(80, 80), DataVerdict::Accepted);
        assert_eq!(r.ack_value(), 160);
    }

    #[test]
    fn out_of_order_segment_does_not_advance() {
        let mut r = lossless();
        assert_eq!(r.on_data(160, 80), DataVerdict::OutOfOrder);
        assert_eq!(r.ack_value(), 0, "gap must not advance the cursor");
    }

    #[test]
    fn duplicate_segment_does_not_advance() {
        let mut r = lossless();
        r.on_data(0, 80);
        assert_eq!(r.on_data(0, 80), DataVerdict::OutOfOrder);
        assert_eq!(r.ack_value(), 80);
    }

    #[test]
    fn non_advancing_verdicts_still_want_an_ack() {
        assert!(DataVerdict::Accepted.wants_ack());
        assert!(DataVerdict::OutOfOrder.wants_ack());
        assert!(!DataVerdict::Dropped.wants_ack());
    }

    #[test]
    fn dropped_segment_mutates_nothing() {
        let mut r = ReceiverSession::new(Box::new(RandomLoss::seeded(1.0, 3)));
        assert_eq!(r.on_data(0, 80), DataVerdict::Dropped);
        assert_eq!(r.ack_value(), 0);
    }

    #[test]
    fn reset_rewinds_to_offset_zero() {
        let mut r = lossless();
        r.on_data(0, 80);
        r.on_data(80, 80);
        assert_eq!(r.ack_value(), 160);
        r.reset();
        assert_eq!(r.ack_value(), 0);
        assert_eq!(r.on_data(0, 80), DataVerdict::Accepted);
    }
}
