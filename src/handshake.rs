//! Three-way connection setup over the datagram socket.
//!
//! Both sides poll the socket in short slices so the global deadline can be
//! enforced without an unbounded blocking receive:
//!
//! - Active open ([`connect`]): send `SYN(seq=c)` with a random ISN `c`, then
//!   poll until a `SYN-ACK` with `ack == c + 1` arrives; reply
//!   `ACK(ack = server_seq + 1)`.
//! - Passive open ([`accept`]): called after a `SYN` arrives; send
//!   `SYN-ACK(seq=s, ack=c+1)` with a random server ISN `s`, then poll for
//!   `ACK(ack == s + 1)`.  There is no SYN-ACK retry; on timeout the caller
//!   stays in listen and waits for the peer to try again.
//!
//! "No segment within the poll slice" is an ordinary outcome, not a fault;
//! only the 3000 ms global deadline turns it into [`HandshakeError::Timeout`].
//! Data byte offsets are independent of the ISNs: the first DATA segment
//! always carries offset 0.

use std::net::SocketAddr;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;
use tokio::time::{timeout, Instant};

use crate::packet::{Segment, SegmentKind};
use crate::socket::{Socket, SocketError};
use crate::state::{ReceiverState, SenderState};

/// Global deadline for one handshake attempt, measured from its start.
pub const HANDSHAKE_DEADLINE: Duration = Duration::from_millis(3000);

/// Upper bound of one receive poll while waiting for a handshake reply.
const RECV_POLL: Duration = Duration::from_millis(100);

/// Initial sequence numbers are drawn uniformly from `0..ISN_RANGE`.
const ISN_RANGE: u32 = 10_000;

/// Errors that can end a handshake attempt.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// No valid reply within [`HANDSHAKE_DEADLINE`].
    #[error("handshake timed out after {HANDSHAKE_DEADLINE:?}")]
    Timeout,
    /// Fatal socket failure.
    #[error(transparent)]
    Transport(#[from] SocketError),
}

/// Active open: establish a connection to `peer`.
///
/// Returns the client ISN on success.  On [`HandshakeError::Timeout`] the
/// caller aborts the transfer with no data sent.
pub async fn connect(
    socket: &Socket,
    peer: SocketAddr,
    rng: &mut StdRng,
) -> Result<u32, HandshakeError> {
    let isn = rng.gen_range(0..ISN_RANGE);
    socket.send_to(&Segment::syn(isn), peer).await?;
    let mut state = SenderState::SynSent;
    log::info!("[handshake] → SYN seq={isn} ({state})");

    let deadline = Instant::now() + HANDSHAKE_DEADLINE;
    loop {
        let Some(seg) = poll_recv(socket, peer, deadline).await? else {
            state = SenderState::Failed;
            log::warn!("[handshake] no valid SYN-ACK within deadline ({state})");
            return Err(HandshakeError::Timeout);
        };

        if seg.kind == SegmentKind::SynAck && seg.ack == isn.wrapping_add(1) {
            log::info!("[handshake] ← SYN-ACK seq={} ack={}", seg.seq, seg.ack);
            let ack = seg.seq.wrapping_add(1);
            socket.send_to(&Segment::ack(ack), peer).await?;
            state = SenderState::Established;
            log::info!("[handshake] → ACK ack={ack} ({state})");
            return Ok(isn);
        }
        // Anything else (stale data, unrelated ACKs) is ignored.
    }
}

/// Passive open: complete the handshake for a `SYN(seq=client_isn)` that the
/// listener just received from `peer`.
///
/// On success the caller resets its expected data offset to 0.  On timeout it
/// simply keeps listening; the connection never existed.
pub async fn accept(
    socket: &Socket,
    peer: SocketAddr,
    client_isn: u32,
    rng: &mut StdRng,
) -> Result<(), HandshakeError> {
    let server_isn = rng.gen_range(0..ISN_RANGE);
    let expected_ack = server_isn.wrapping_add(1);
    socket
        .send_to(&Segment::syn_ack(server_isn, client_isn.wrapping_add(1)), peer)
        .await?;
    let mut state = ReceiverState::SynRcvd;
    log::info!(
        "[handshake] → SYN-ACK seq={server_isn} ack={} ({state})",
        client_isn.wrapping_add(1)
    );

    let deadline = Instant::now() + HANDSHAKE_DEADLINE;
    loop {
        let Some(seg) = poll_recv(socket, peer, deadline).await? else {
            log::warn!("[handshake] ACK wait timed out; staying in {}", ReceiverState::Listen);
            return Err(HandshakeError::Timeout);
        };

        if seg.kind == SegmentKind::Ack && seg.ack == expected_ack {
            state = ReceiverState::Established;
            log::info!("[handshake] ← ACK ack={} ({state})", seg.ack);
            return Ok(());
        }
    }
}

/// One bounded receive step: waits at most [`RECV_POLL`] (clipped to the
/// remaining deadline budget) for a decodable segment from `peer`.
///
/// Returns `Ok(None)` once the deadline is exhausted.  Malformed datagrams
/// and segments from other addresses are discarded as if they were lost.
async fn poll_recv(
    socket: &Socket,
    peer: SocketAddr,
    deadline: Instant,
) -> Result<Option<Segment>, HandshakeError> {
    loop {
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        let slice = RECV_POLL.min(deadline - now);

        match timeout(slice, socket.recv_from()).await {
            Err(_elapsed) => continue,
            Ok(Err(SocketError::Decode(e))) => {
                log::debug!("[handshake] discarding undecodable datagram: {e}");
                continue;
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok((seg, addr))) => {
                if addr != peer {
                    continue;
                }
                return Ok(Some(seg));
            }
        }
    }
}
