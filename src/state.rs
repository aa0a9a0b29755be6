//! Handshake finite-state-machine (FSM) types.
//!
//! This module defines the states each side of the three-way handshake can
//! occupy.  State transitions are *not* implemented here — they live in
//! [`crate::handshake`] — but keeping the types in their own module makes it
//! easy to add guard logic or tracing without touching protocol plumbing.

/// States of the active-open (sender) side.
///
/// ```text
///  IDLE ──SYN sent──▶ SYN_SENT ──valid SYN-ACK──▶ ESTABLISHED
///                         │
///                         └──3000 ms deadline──▶ FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SenderState {
    /// No connection attempt yet; initial state.
    #[default]
    Idle,
    /// SYN has been sent; polling for a SYN-ACK that acknowledges our ISN.
    SynSent,
    /// Three-way handshake complete; data transfer may begin.
    Established,
    /// The handshake deadline elapsed without a valid SYN-ACK.
    Failed,
}

/// States of the passive-open (receiver) side, per accepted peer.
///
/// ```text
///  LISTEN ──SYN rcvd──▶ SYN_RCVD ──valid ACK──▶ ESTABLISHED
///                           │
///                           └──3000 ms deadline──▶ back to LISTEN
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiverState {
    /// Waiting for a peer's SYN; initial state.
    #[default]
    Listen,
    /// SYN received and SYN-ACK sent; waiting for the final ACK.
    SynRcvd,
    /// Handshake complete; expected data offset reset to zero.
    Established,
}

impl std::fmt::Display for SenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
