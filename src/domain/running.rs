// ============================================================
// Layer 3 — Running Totals
// ============================================================
// Loss and accuracy accumulated over the batches of one phase
// (training or evaluation) of one epoch. Each phase starts from
// `RunningTotals::default()` and hands its totals back to the
// caller when it finishes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningTotals {
    /// Sum of per-batch mean losses
    pub loss_sum: f64,
    /// Number of correctly classified samples
    pub correct:  usize,
    /// Number of samples seen
    pub seen:     usize,
    /// Number of batches seen
    pub batches:  usize,
}

impl RunningTotals {
    /// Add one batch: its mean loss, its correct count and its size.
    pub fn update(&mut self, batch_loss: f64, correct: usize, batch_size: usize) {
        self.loss_sum += batch_loss;
        self.correct  += correct;
        self.seen     += batch_size;
        self.batches  += 1;
    }

    /// Mean of the per-batch losses, NaN before the first batch.
    pub fn mean_loss(&self) -> f64 {
        if self.batches > 0 {
            self.loss_sum / self.batches as f64
        } else {
            f64::NAN
        }
    }

    /// Fraction of samples classified correctly, 0 before the first batch.
    pub fn accuracy(&self) -> f64 {
        if self.seen > 0 {
            self.correct as f64 / self.seen as f64
        } else {
            0.0
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_totals() {
        let t = RunningTotals::default();
        assert!(t.mean_loss().is_nan());
        assert_eq!(t.accuracy(), 0.0);
    }

    #[test]
    fn test_accumulates_batches() {
        let mut t = RunningTotals::default();
        t.update(2.0, 30, 128);
        t.update(1.0, 70, 72);
        assert_eq!(t.batches, 2);
        assert_eq!(t.seen, 200);
        assert_eq!(t.correct, 100);
        assert_eq!(t.mean_loss(), 1.5);
        assert_eq!(t.accuracy(), 0.5);
    }
}
