//! Integration tests for the 3-way handshake.
//!
//! Each test spins up a real UDP socket on loopback, runs the listener half
//! in a background task, and drives the active open against it.

use std::net::SocketAddr;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use gbn_over_udp::handshake::{self, HandshakeError};
use gbn_over_udp::loss::NoLoss;
use gbn_over_udp::receiver::ReceiverSession;
use gbn_over_udp::socket::Socket;
use gbn_over_udp::transfer::run_receiver;

/// Bind a socket to an OS-assigned port on loopback.
async fn ephemeral() -> Socket {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    Socket::bind(addr).await.expect("bind failed")
}

#[tokio::test]
async fn handshake_completes_against_a_listener() {
    let listener_sock = ephemeral().await;
    let listener_addr = listener_sock.local_addr;

    let listener = tokio::spawn(async move {
        let mut rng = StdRng::seed_from_u64(1);
        let session = ReceiverSession::new(Box::new(NoLoss));
        let _ = run_receiver(&listener_sock, session, &mut rng).await;
    });

    let sock = ephemeral().await;
    let mut rng = StdRng::seed_from_u64(2);
    let isn = tokio::time::timeout(
        Duration::from_secs(5),
        handshake::connect(&sock, listener_addr, &mut rng),
    )
    .await
    .expect("handshake timed out at the test harness level")
    .expect("handshake failed");

    // ISNs are drawn from 0..10000.
    assert!(isn < 10_000, "unexpected ISN {isn}");

    listener.abort();
}

#[tokio::test]
async fn connect_to_silent_peer_times_out() {
    // Bind an ephemeral port, then drop the socket so nothing answers there.
    let silent_addr = {
        let tmp = ephemeral().await;
        tmp.local_addr
    };

    let sock = ephemeral().await;
    let mut rng = StdRng::seed_from_u64(3);
    let started = std::time::Instant::now();
    let result = handshake::connect(&sock, silent_addr, &mut rng).await;

    assert!(
        matches!(result, Err(HandshakeError::Timeout)),
        "expected Timeout, got: {result:?}"
    );
    // The 3000 ms global deadline bounds the attempt.
    assert!(started.elapsed() >= Duration::from_millis(2900));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn accept_without_final_ack_times_out() {
    // A "client" that sends SYN but never completes the handshake.
    let silent_client = ephemeral().await;
    let client_addr = silent_client.local_addr;

    let listener = ephemeral().await;
    let mut rng = StdRng::seed_from_u64(4);
    let result = handshake::accept(&listener, client_addr, 1234, &mut rng).await;

    assert!(
        matches!(result, Err(HandshakeError::Timeout)),
        "expected Timeout, got: {result:?}"
    );

    // The SYN-ACK must have reached the client even though it ignored it.
    let (seg, from) = tokio::time::timeout(Duration::from_secs(1), silent_client.recv_from())
        .await
        .expect("no SYN-ACK arrived")
        .expect("SYN-ACK failed to decode");
    assert_eq!(from, listener.local_addr);
    assert_eq!(seg.kind, gbn_over_udp::packet::SegmentKind::SynAck);
    assert_eq!(seg.ack, 1235, "SYN-ACK must acknowledge client ISN + 1");
}
