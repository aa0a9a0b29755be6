//! Transfer drivers: the loops that wire the state machines to the socket.
//!
//! Two independent programs share this module:
//!
//! - [`run_sender`] performs the handshake, then drives the Go-Back-N loop —
//!   transmit every sendable offset, wait for one advancing cumulative ACK
//!   within the adaptive timeout, go back to the window base when none
//!   arrives — and finally folds the counters into a [`TransferReport`].
//! - [`run_receiver`] listens forever: completes handshakes for inbound
//!   SYNs, and answers surviving DATA segments with cumulative ACKs while
//!   the loss model silently eats its share.
//!
//! Each driver is one logical flow of control.  Every wait is a receive
//! bounded by `tokio::time::timeout`; an empty slice is an expected outcome
//! (handshake deadline bookkeeping or a retransmission round), never a
//! fault.  Only socket-level I/O errors abort a run.

use std::net::SocketAddr;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;
use tokio::time::{timeout, Instant as TokioInstant};

use crate::handshake::{self, HandshakeError};
use crate::packet::{Segment, SegmentKind};
use crate::receiver::{DataVerdict, ReceiverSession};
use crate::sender::{AckOutcome, SenderConfig, SenderWindow};
use crate::socket::{Socket, SocketError};
use crate::stats::TransferReport;

/// Errors that can abort a transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Connection setup never completed; no data was sent.
    #[error("connection setup failed: {0}")]
    Handshake(#[from] HandshakeError),
    /// Fatal socket failure mid-transfer.
    #[error("transport failure: {0}")]
    Transport(#[from] SocketError),
    /// The configured retry ceiling was hit with data still unacknowledged.
    #[error("gave up after {0} consecutive retransmission rounds")]
    RetryLimitExceeded(u32),
}

/// Produce `count` payload blocks of exactly `segment_size` random bytes.
///
/// The blocks are generated once, up front, and stay immutable for the
/// lifetime of the transfer.
pub fn generate_blocks(count: usize, segment_size: u32, rng: &mut StdRng) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| {
            let mut block = vec![0u8; segment_size as usize];
            rng.fill(&mut block[..]);
            block
        })
        .collect()
}

/// Transfer `blocks` to `peer` and return the final statistics.
///
/// Every block must be exactly `config.segment_size` bytes.  The RNG feeds
/// the handshake's initial sequence number; seeding it makes a run
/// reproducible.
pub async fn run_sender(
    socket: &Socket,
    peer: SocketAddr,
    config: SenderConfig,
    blocks: &[Vec<u8>],
    rng: &mut StdRng,
) -> Result<TransferReport, TransferError> {
    let segment_size = config.segment_size;
    let max_retries = config.max_retries;
    assert!(
        blocks.iter().all(|b| b.len() == segment_size as usize),
        "every payload block must be exactly one segment long"
    );

    handshake::connect(socket, peer, rng).await?;

    let total_len = blocks.len() as u32 * segment_size;
    let mut window = SenderWindow::new(config, total_len);
    let mut retries = 0u32;

    while !window.is_complete() {
        for offset in window.sendable() {
            let idx = (offset / segment_size) as usize;
            socket
                .send_to(&Segment::data(offset, blocks[idx].clone()), peer)
                .await?;
            window.record_sent(offset, Instant::now());
            log::debug!("[gbn] → DATA seq={offset} len={segment_size}");
        }

        if wait_for_ack(socket, peer, &mut window).await? {
            retries = 0;
        } else if !window.is_complete() {
            retries += 1;
            if let Some(max) = max_retries {
                if retries > max {
                    return Err(TransferError::RetryLimitExceeded(max));
                }
            }
            let resend = window.go_back();
            log::info!(
                "[gbn] ACK timeout — going back to offset {} ({resend} segment(s) to resend)",
                window.base()
            );
        }
    }

    let report = TransferReport::from_run(
        blocks.len() as u32,
        window.total_sent(),
        window.rtt_samples(),
    );
    log::info!(
        "[gbn] transfer complete: {} segment(s) sent for {} block(s)",
        report.segments_sent,
        report.segments_expected
    );
    Ok(report)
}

/// Block until one advancing cumulative ACK arrives or the window's current
/// timeout elapses.
///
/// Duplicate ACKs (`ack ≤` the last accepted value) and undecodable
/// datagrams are consumed without resetting the deadline.  Returns `true`
/// when the window advanced.
async fn wait_for_ack(
    socket: &Socket,
    peer: SocketAddr,
    window: &mut SenderWindow,
) -> Result<bool, TransferError> {
    let deadline = TokioInstant::now() + window.timeout();

    loop {
        let now = TokioInstant::now();
        if now >= deadline {
            return Ok(false);
        }

        match timeout(deadline - now, socket.recv_from()).await {
            Err(_elapsed) => return Ok(false),
            Ok(Err(SocketError::Decode(e))) => {
                log::debug!("[gbn] discarding undecodable datagram: {e}");
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok((seg, addr))) => {
                if addr != peer || seg.kind != SegmentKind::Ack {
                    continue;
                }
                match window.on_ack(seg.ack, Instant::now()) {
                    AckOutcome::Progress { rtt } => {
                        log::debug!(
                            "[gbn] ← ACK ack={} rtt={:.2}ms (base={})",
                            seg.ack,
                            rtt.as_secs_f64() * 1000.0,
                            window.base()
                        );
                        return Ok(true);
                    }
                    AckOutcome::Duplicate => {
                        log::debug!("[gbn] ← duplicate ACK ack={} — filtered", seg.ack);
                    }
                }
            }
        }
    }
}

/// Serve transfers on `socket` until a fatal socket error.
///
/// One `session` cursor serves whichever peer most recently completed a
/// handshake; DATA from a second simultaneous sender would share it and
/// corrupt the transfer (single active session assumed).
pub async fn run_receiver(
    socket: &Socket,
    mut session: ReceiverSession,
    rng: &mut StdRng,
) -> Result<(), TransferError> {
    log::info!("[recv] listening on {}", socket.local_addr);

    loop {
        let (seg, addr) = match socket.recv_from().await {
            Ok(v) => v,
            Err(SocketError::Decode(e)) => {
                log::debug!("[recv] discarding undecodable datagram: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match seg.kind {
            SegmentKind::Syn => {
                log::info!("[handshake] ← SYN seq={} from {addr}", seg.seq);
                match handshake::accept(socket, addr, seg.seq, rng).await {
                    Ok(()) => {
                        session.reset();
                        log::info!("[recv] connection established with {addr}");
                    }
                    Err(HandshakeError::Timeout) => {
                        log::warn!("[recv] handshake with {addr} timed out; still listening");
                    }
                    Err(HandshakeError::Transport(e)) => return Err(e.into()),
                }
            }
            SegmentKind::Data => {
                let verdict = session.on_data(seg.seq, seg.length);
                match verdict {
                    DataVerdict::Dropped => {
                        log::info!("[loss] dropped DATA seq={}", seg.seq);
                    }
                    DataVerdict::Accepted => {
                        log::debug!("[recv] ← DATA seq={} len={} accepted", seg.seq, seg.length);
                    }
                    DataVerdict::OutOfOrder => {
                        log::debug!(
                            "[recv] ← DATA seq={} out of order; re-ACK {}",
                            seg.seq,
                            session.ack_value()
                        );
                    }
                }
                if verdict.wants_ack() {
                    socket.send_to(&Segment::ack(session.ack_value()), addr).await?;
                }
            }
            // A stray SYN-ACK or ACK outside a handshake belongs to no
            // exchange we are part of.
            SegmentKind::SynAck | SegmentKind::Ack => {}
        }
    }
}
