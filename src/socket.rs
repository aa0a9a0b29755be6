//! Async UDP socket abstraction.
//!
//! [`Socket`] is a thin wrapper around `tokio::net::UdpSocket` that speaks
//! [`crate::packet::Segment`] instead of raw bytes.  All protocol logic lives
//! elsewhere; this module owns only byte I/O.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::UdpSocket;

use crate::packet::{Segment, SegmentError};

/// Maximum UDP payload size (theoretical limit; in practice kept much smaller).
const MAX_DATAGRAM: usize = 65_535;

/// Errors that can arise from socket operations.
///
/// A [`SocketError::Decode`] concerns one datagram only; callers treat it like
/// a lost packet and keep receiving.  [`SocketError::Io`] is fatal.
#[derive(Debug, Error)]
pub enum SocketError {
    /// Underlying I/O error from the OS.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The received datagram could not be decoded as a valid segment.
    #[error("segment decode error: {0}")]
    Decode(#[from] SegmentError),
}

/// An async, segment-oriented UDP socket.
///
/// All methods are `&self` so the socket can be shared if needed.
#[derive(Debug)]
pub struct Socket {
    /// Address this socket is bound to (filled in after OS assigns ephemeral port).
    pub local_addr: SocketAddr,
    inner: UdpSocket,
}

impl Socket {
    /// Bind a new socket to `local_addr`.
    ///
    /// Passing `0.0.0.0:0` lets the OS choose an ephemeral port.
    pub async fn bind(local_addr: SocketAddr) -> Result<Self, SocketError> {
        let inner = UdpSocket::bind(local_addr).await?;
        let local_addr = inner.local_addr()?;
        Ok(Self { local_addr, inner })
    }

    /// Encode `segment` and send it as a single UDP datagram to `dest`.
    pub async fn send_to(&self, segment: &Segment, dest: SocketAddr) -> Result<(), SocketError> {
        let bytes = segment.encode();
        self.inner.send_to(&bytes, dest).await?;
        Ok(())
    }

    /// Receive the next datagram and decode it into a [`Segment`].
    ///
    /// Returns `(segment, sender_address)`.  Datagrams that fail to decode are
    /// returned as `Err(SocketError::Decode(_))` — the caller decides whether
    /// to keep receiving (the protocol layers discard them like losses).
    pub async fn recv_from(&self) -> Result<(Segment, SocketAddr), SocketError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (n, addr) = self.inner.recv_from(&mut buf).await?;
        let segment = Segment::decode(&buf[..n])?;
        Ok((segment, addr))
    }
}
