//! End-of-transfer statistics.
//!
//! The sender engine emits two things a report needs: the total number of
//! segments it handed to the socket (retransmissions included) and the list
//! of RTT samples collected from accepted ACKs.  [`TransferReport`] turns
//! those into the loss rate and the RTT min / max / mean / population
//! standard deviation.  When no sample exists (every ACK fell back to the
//! duplicate filter, or the run was pure retransmission) only the send-count
//! and loss-rate lines are reported.

use std::time::Duration;

/// Aggregated RTT distribution, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RttSummary {
    /// Smallest sample.
    pub min_ms: f64,
    /// Largest sample.
    pub max_ms: f64,
    /// Arithmetic mean.
    pub mean_ms: f64,
    /// Population standard deviation: `sqrt(mean((x − mean)²))`.
    pub std_dev_ms: f64,
}

/// Final statistics for one completed transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    /// Segments a loss-free run would have needed.
    pub segments_expected: u32,
    /// Segments actually transmitted, retransmissions included.
    pub segments_sent: u32,
    /// `(1 − expected / sent) × 100`, in percent.
    pub loss_rate_pct: f64,
    /// RTT distribution, absent when no sample was collected.
    pub rtt: Option<RttSummary>,
}

impl TransferReport {
    /// Build a report from the sender engine's counters and samples.
    pub fn from_run(segments_expected: u32, segments_sent: u32, samples: &[Duration]) -> Self {
        let loss_rate_pct = if segments_sent == 0 {
            0.0
        } else {
            (1.0 - f64::from(segments_expected) / f64::from(segments_sent)) * 100.0
        };
        Self {
            segments_expected,
            segments_sent,
            loss_rate_pct,
            rtt: summarise(samples),
        }
    }
}

fn summarise(samples: &[Duration]) -> Option<RttSummary> {
    if samples.is_empty() {
        return None;
    }
    let ms: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
    let n = ms.len() as f64;
    let mean = ms.iter().sum::<f64>() / n;
    let variance = ms.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some(RttSummary {
        min_ms: ms.iter().copied().fold(f64::INFINITY, f64::min),
        max_ms: ms.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean_ms: mean,
        std_dev_ms: variance.sqrt(),
    })
}

impl std::fmt::Display for TransferReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== transfer statistics =====")?;
        writeln!(f, "loss rate:       {:.2}%", self.loss_rate_pct)?;
        writeln!(f, "segments sent:   {}", self.segments_sent)?;
        if let Some(rtt) = &self.rtt {
            writeln!(f, "max RTT:         {:.2} ms", rtt.max_ms)?;
            writeln!(f, "min RTT:         {:.2} ms", rtt.min_ms)?;
            writeln!(f, "mean RTT:        {:.2} ms", rtt.mean_ms)?;
            writeln!(f, "RTT std dev:     {:.2} ms", rtt.std_dev_ms)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn lossless_run_reports_zero_loss() {
        let r = TransferReport::from_run(30, 30, &[ms(1)]);
        assert_eq!(r.loss_rate_pct, 0.0);
        assert_eq!(r.segments_sent, 30);
    }

    #[test]
    fn loss_rate_counts_retransmissions() {
        // 30 useful segments over 35 transmissions.
        let r = TransferReport::from_run(30, 35, &[ms(1)]);
        assert!((r.loss_rate_pct - (1.0 - 30.0 / 35.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn rtt_summary_matches_hand_computation() {
        let r = TransferReport::from_run(3, 3, &[ms(50), ms(70), ms(90)]);
        let rtt = r.rtt.unwrap();
        assert!(close(rtt.min_ms, 50.0));
        assert!(close(rtt.max_ms, 90.0));
        assert!(close(rtt.mean_ms, 70.0));
        // population stddev: sqrt((400 + 0 + 400) / 3)
        assert!(close(rtt.std_dev_ms, (800.0f64 / 3.0).sqrt()));
    }

    #[test]
    fn empty_sample_list_omits_rtt_lines() {
        let r = TransferReport::from_run(30, 40, &[]);
        assert!(r.rtt.is_none());
        let text = r.to_string();
        assert!(text.contains("segments sent:   40"));
        assert!(!text.contains("RTT"));
    }

    #[test]
    fn single_sample_has_zero_std_dev() {
        let rtt = TransferReport::from_run(1, 1, &[ms(42)]).rtt.unwrap();
        assert!(close(rtt.mean_ms, 42.0));
        assert!(close(rtt.std_dev_ms, 0.0));
        assert_eq!(rtt.min_ms, rtt.max_ms);
    }
}
