//! Entry point for `gbn-over-udp`.
//!
//! Parses CLI arguments and dispatches into either **sender** or **receiver**
//! mode.  All protocol work is delegated to library modules; `main.rs` owns
//! only process setup (logging, argument parsing, payload generation).

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gbn_over_udp::loss::RandomLoss;
use gbn_over_udp::receiver::ReceiverSession;
use gbn_over_udp::sender::SenderConfig;
use gbn_over_udp::socket::Socket;
use gbn_over_udp::transfer::{generate_blocks, run_receiver, run_sender};

/// Reliable Go-Back-N byte-stream transfer over UDP.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Transfer a batch of fixed-size blocks to a receiver.
    Sender {
        /// Receiver host name or address.
        host: String,
        /// Receiver UDP port.
        port: u16,
        /// Sliding-window span in bytes.
        #[arg(long, default_value_t = 400)]
        window: u32,
        /// Fixed payload size of every DATA segment, in bytes.
        #[arg(long, default_value_t = 80)]
        segment_size: u32,
        /// Number of payload blocks to transfer.
        #[arg(long, default_value_t = 30)]
        blocks: usize,
        /// Give up after this many consecutive timeout rounds
        /// (default: retransmit forever).
        #[arg(long)]
        max_retries: Option<u32>,
        /// Seed for payload and ISN generation (default: OS entropy).
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Listen for a sender and acknowledge its segments.
    Receiver {
        /// Local UDP port to listen on.
        port: u16,
        /// Probability of synthetically dropping each DATA segment.
        #[arg(long, default_value_t = 0.2)]
        loss_rate: f64,
        /// Seed for the loss draws and ISN generation (default: OS entropy).
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    match cli.mode {
        Mode::Sender {
            host,
            port,
            window,
            segment_size,
            blocks,
            max_retries,
            seed,
        } => {
            let peer = tokio::net::lookup_host((host.as_str(), port))
                .await
                .with_context(|| format!("cannot resolve {host}:{port}"))?
                .next()
                .with_context(|| format!("{host}:{port} resolved to no address"))?;

            let socket = Socket::bind("0.0.0.0:0".parse::<SocketAddr>().unwrap()).await?;
            let mut rng = rng_from(seed);
            let payload = generate_blocks(blocks, segment_size, &mut rng);
            log::info!("prepared {blocks} block(s) of {segment_size} byte(s) each");

            let config = SenderConfig {
                segment_size,
                window_size: window,
                max_retries,
            };
            let report = run_sender(&socket, peer, config, &payload, &mut rng).await?;
            print!("{report}");
        }
        Mode::Receiver { port, loss_rate, seed } => {
            let bind: SocketAddr = format!("0.0.0.0:{port}").parse().unwrap();
            let socket = Socket::bind(bind).await?;
            let mut rng = rng_from(seed);
            let session = ReceiverSession::new(Box::new(match seed {
                Some(s) => RandomLoss::seeded(loss_rate, s),
                None => RandomLoss::new(loss_rate),
            }));
            run_receiver(&socket, session, &mut rng).await?;
        }
    }

    Ok(())
}
