//! Synthetic packet-loss models for the receive path.
//!
//! Real networks drop packets; on loopback they never do.  To exercise the
//! retransmission machinery the receiver asks a [`LossModel`] whether each
//! inbound DATA segment should be discarded *before* any protocol processing,
//! so a dropped segment mutates no state and triggers no ACK.
//!
//! [`RandomLoss`] draws from a seedable RNG so failing runs are reproducible;
//! tests that need an exact loss pattern implement the trait directly (see
//! the scripted single-drop model in the integration tests).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides the fate of each inbound DATA segment.
pub trait LossModel: Send {
    /// `true` means the segment at byte offset `seq` is dropped entirely.
    fn should_drop(&mut self, seq: u32) -> bool;
}

/// Independent per-segment drop with fixed probability.
#[derive(Debug)]
pub struct RandomLoss {
    rate: f64,
    rng: StdRng,
}

impl RandomLoss {
    /// Loss model with probability `rate` in `[0.0, 1.0]` and an OS-seeded RNG.
    pub fn new(rate: f64) -> Self {
        Self::with_rng(rate, StdRng::from_entropy())
    }

    /// Deterministic variant for reproducible runs.
    pub fn seeded(rate: f64, seed: u64) -> Self {
        Self::with_rng(rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rate: f64, rng: StdRng) -> Self {
        assert!((0.0..=1.0).contains(&rate), "loss rate must be in [0, 1]");
        Self { rate, rng }
    }
}

impl LossModel for RandomLoss {
    fn should_drop(&mut self, _seq: u32) -> bool {
        self.rng.gen::<f64>() < self.rate
    }
}

/// Pass-through model: nothing is ever dropped.
#[derive(Debug, Default)]
pub struct NoLoss;

impl LossModel for NoLoss {
    fn should_drop(&mut self, _seq: u32) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_loss_never_drops() {
        let mut m = NoLoss;
        assert!((0..1000).all(|seq| !m.should_drop(seq)));
    }

    #[test]
    fn rate_zero_never_drops() {
        let mut m = RandomLoss::seeded(0.0, 7);
        assert!((0..1000).all(|seq| !m.should_drop(seq)));
    }

    #[test]
    fn rate_one_always_drops() {
        let mut m = RandomLoss::seeded(1.0, 7);
        assert!((0..1000).all(|seq| m.should_drop(seq)));
    }

    #[test]
    fn observed_rate_converges_to_configured_rate() {
        const TRIALS: u32 = 20_000;
        let mut m = RandomLoss::seeded(0.2, 42);
        let dropped = (0..TRIALS).filter(|&seq| m.should_drop(seq)).count();
        let observed = dropped as f64 / TRIALS as f64;
        // Binomial stddev at p=0.2 over 20k trials is ~0.003; ±0.02 is wide.
        assert!(
            (observed - 0.2).abs() < 0.02,
            "observed drop fraction {observed} too far from 0.2"
        );
    }

    #[test]
    fn same_seed_gives_same_pattern() {
        let mut a = RandomLoss::seeded(0.5, 99);
        let mut b = RandomLoss::seeded(0.5, 99);
        let pa: Vec<bool> = (0..64).map(|seq| a.should_drop(seq)).collect();
        let pb: Vec<bool> = (0..64).map(|seq| b.should_drop(seq)).collect();
        assert_eq!(pa, pb);
    }
}
