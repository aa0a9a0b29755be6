//! `gbn-over-udp` — a reliable byte-stream transfer over UDP using
//! Go-Back-N ARQ, with synthetic loss injection and RTT statistics.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────┐  DATA segments   ┌──────────┐
//!  │  Sender  │─────────────────▶│ Receiver │──▶ loss model may drop
//!  └────┬─────┘                  └─────┬────┘
//!       │      cumulative ACKs         │
//!       │◀──────────────────────────────┘
//!       │
//!  ┌────▼──────────────────────────────┐
//!  │             transfer              │
//!  │  (driver loops own the socket)    │
//!  └────┬──────────────────────────────┘
//!       │ raw UDP datagrams
//!  ┌────▼──────┐
//!  │  Socket   │  (thin async wrapper around tokio UdpSocket)
//!  └───────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`packet`]    — wire format (serialise / deserialise)
//! - [`socket`]    — async UDP socket abstraction
//! - [`state`]     — handshake finite-state-machine types
//! - [`handshake`] — 3-way connection setup, both sides
//! - [`sender`]    — Go-Back-N outbound window state machine
//! - [`receiver`]  — in-order acceptance and cumulative-ACK state machine
//! - [`loss`]      — synthetic packet-loss models
//! - [`rtt`]       — adaptive retransmission-timeout estimation
//! - [`stats`]     — end-of-transfer statistics report
//! - [`transfer`]  — sender/receiver driver loops over the socket

pub mod handshake;
pub mod loss;
pub mod packet;
pub mod receiver;
pub mod rtt;
pub mod sender;
pub mod socket;
pub mod state;
pub mod stats;
pub mod transfer;
