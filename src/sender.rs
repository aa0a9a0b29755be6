//! Go-Back-N send-side state machine.
//!
//! [`SenderWindow`] tracks one transfer's sliding window over the byte
//! stream.  Offsets, not segment indices, drive everything:
//!
//! ```text
//!   base            next_offset     base + window          total_len
//!     │                  │               │                     │
//! ────┼──────────────────┼───────────────┼─────────────────────┼──▶ offsets
//!     │ <── in flight ──▶│ <─ sendable ─▶│     not yet allowed │
//! ```
//!
//! # Protocol contract
//!
//! - ACKs are **cumulative**: `ack = k` confirms every byte strictly below
//!   `k`, so `base` jumps directly to the ACK value, never by "one segment".
//! - Only a strictly increasing ACK is progress; anything at or below the
//!   last accepted value is a filtered duplicate, not an error.
//! - On timeout the window "goes back": `next_offset` rewinds to `base`, so
//!   the next transmit pass resends exactly the offsets in
//!   `[base, min(base + window, total_len))`.
//! - Every accepted ACK yields one RTT sample, attributed to the last
//!   segment the ACK covers (`ack − segment_size`); if that offset was never
//!   timestamped the sample falls back to zero.
//!
//! This module only manages state; all socket I/O is the caller's
//! responsibility (the driver loop lives in [`crate::transfer`]).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::rtt::RttEstimator;

/// Tunable parameters of one transfer.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Fixed payload size of every DATA segment, in bytes.
    pub segment_size: u32,
    /// Sliding-window span in bytes; must be a multiple of `segment_size`.
    pub window_size: u32,
    /// Consecutive timeout rounds tolerated before giving up.
    ///
    /// `None` means retransmit forever, matching the base protocol; tests
    /// set a ceiling so a dead peer cannot hang them.
    pub max_retries: Option<u32>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            segment_size: 80,
            window_size: 400,
            max_retries: None,
        }
    }
}

/// Result of feeding one inbound ACK value to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The ACK advanced the window; carries the RTT sample it produced.
    Progress {
        /// Round-trip time attributed to this ACK.
        rtt: Duration,
    },
    /// Stale or repeated ACK (`ack ≤` last accepted value); filtered.
    Duplicate,
}

/// Go-Back-N send-side state for one transfer.
#[derive(Debug)]
pub struct SenderWindow {
    config: SenderConfig,
    /// Total stream length in bytes; a multiple of `segment_size`.
    total_len: u32,
    /// Lowest unacknowledged byte offset (left window edge).
    base: u32,
    /// First offset the next transmit pass will send.
    next_offset: u32,
    /// Segments handed to the socket, retransmissions included.
    total_sent: u32,
    /// Highest cumulative ACK accepted so far.
    last_ack: Option<u32>,
    /// Most recent transmit time per offset, for RTT attribution.
    send_times: HashMap<u32, Instant>,
    estimator: RttEstimator,
}

impl SenderWindow {
    /// Create a window for a stream of `total_len` bytes.
    ///
    /// # Panics
    ///
    /// Panics when the sizes are inconsistent: zero segment size, a window
    /// or stream length that is not a multiple of the segment size, or a
    /// segment that cannot be described by the 16-bit length field.
    pub fn new(config: SenderConfig, total_len: u32) -> Self {
        assert!(config.segment_size > 0, "segment size must be non-zero");
        assert!(
            config.segment_size <= u16::MAX as u32,
            "segment size must fit the 16-bit length field"
        );
        assert_eq!(
            config.window_size % config.segment_size,
            0,
            "window size must be a multiple of the segment size"
        );
        assert_eq!(
            total_len % config.segment_size,
            0,
            "stream length must be a multiple of the segment size"
        );
        Self {
            config,
            total_len,
            base: 0,
            next_offset: 0,
            total_sent: 0,
            last_ack: None,
            send_times: HashMap::new(),
            estimator: RttEstimator::new(),
        }
    }

    /// `true` once every stream byte has been cumulatively acknowledged.
    pub fn is_complete(&self) -> bool {
        self.base >= self.total_len
    }

    /// Lowest unacknowledged byte offset.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Segments handed to the socket so far, retransmissions included.
    pub fn total_sent(&self) -> u32 {
        self.total_sent
    }

    /// Exclusive upper bound of the current window, clipped to the stream end.
    fn window_end(&self) -> u32 {
        self.total_len.min(self.base.saturating_add(self.config.window_size))
    }

    /// Offsets the next transmit pass must send, in order.
    ///
    /// Empty when the window is full (everything in it is already in flight)
    /// or the transfer is complete.
    pub fn sendable(&self) -> Vec<u32> {
        (self.next_offset..self.window_end())
            .step_by(self.config.segment_size as usize)
            .collect()
    }

    /// Record one segment transmission at `offset`.
    ///
    /// Refreshes the offset's timestamp (retransmissions overwrite the old
    /// one) and bumps the total-sent counter.
    pub fn record_sent(&mut self, offset: u32, now: Instant) {
        self.send_times.insert(offset, now);
        self.total_sent += 1;
        let after = offset + self.config.segment_size;
        if after > self.next_offset {
            self.next_offset = after;
        }
    }

    /// Rewind to the left window edge after an ACK timeout (the "go back N"
    /// step).  Returns how many segments the following pass will resend.
    pub fn go_back(&mut self) -> usize {
        self.next_offset = self.base;
        self.sendable().len()
    }

    /// Process one inbound cumulative ACK value.
    ///
    /// The first ACK strictly above the last accepted value (any ACK at all
    /// when none has been accepted yet) advances `base` to it and records an
    /// RTT sample; everything else is a filtered [`AckOutcome::Duplicate`].
    pub fn on_ack(&mut self, ack: u32, now: Instant) -> AckOutcome {
        let stale = self.last_ack.is_some_and(|last| ack <= last);
        if stale {
            return AckOutcome::Duplicate;
        }

        let rtt = ack
            .checked_sub(self.config.segment_size)
            .and_then(|offset| self.send_times.get(&offset))
            .map(|sent| now.duration_since(*sent))
            .unwrap_or(Duration::ZERO);
        self.estimator.record(rtt);

        self.last_ack = Some(ack);
        self.base = ack;
        if self.next_offset < self.base {
            self.next_offset = self.base;
        }
        AckOutcome::Progress { rtt }
    }

    /// Wait budget for the next ACK, recomputed from the samples so far.
    pub fn timeout(&self) -> Duration {
        self.estimator.timeout()
    }

    /// RTT samples collected so far, one per accepted ACK.
    pub fn rtt_samples(&self) -> &[Duration] {
        self.estimator.samples()
    }
}
