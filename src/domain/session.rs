// ============================================================
// Layer 3 — Training Session
// ============================================================
// Owns the state that lives for a whole training run: the best
// test accuracy reached so far and the per-epoch summaries.
//
// The trainer asks `is_improvement` after each evaluation; only
// when it answers true is a checkpoint written, after which the
// trainer calls `promote` with the same accuracy. Best accuracy
// therefore never decreases.

use serde::{Deserialize, Serialize};

/// Summary of one finished epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch:      usize,
    pub lr:         f64,
    pub train_loss: f64,
    pub train_acc:  f64,
    pub test_loss:  f64,
    pub test_acc:   f64,
    pub improved:   bool,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingSession {
    best_accuracy: f64,
    best_epoch:    Option<usize>,
    history:       Vec<EpochSummary>,
}

impl TrainingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_accuracy(&self) -> f64 {
        self.best_accuracy
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    pub fn history(&self) -> &[EpochSummary] {
        &self.history
    }

    /// True iff `accuracy` strictly exceeds the best seen so far.
    pub fn is_improvement(&self, accuracy: f64) -> bool {
        accuracy > self.best_accuracy
    }

    /// Record `accuracy` as the new best. Ignored when it is not an
    /// improvement, so callers cannot lower the best by mistake.
    pub fn promote(&mut self, epoch: usize, accuracy: f64) {
        if self.is_improvement(accuracy) {
            self.best_accuracy = accuracy;
            self.best_epoch    = Some(epoch);
        }
    }

    pub fn record_epoch(&mut self, summary: EpochSummary) {
        self.history.push(summary);
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the session the way the trainer does and collect
    /// (checkpoint written?, best after epoch).
    fn simulate(accuracies: &[f64]) -> Vec<(bool, f64)> {
        let mut session = TrainingSession::new();
        accuracies
            .iter()
            .enumerate()
            .map(|(i, &acc)| {
                let saved = session.is_improvement(acc);
                if saved {
                    session.promote(i + 1, acc);
                }
                (saved, session.best_accuracy())
            })
            .collect()
    }

    #[test]
    fn test_best_trace_is_monotonic() {
        let trace = simulate(&[0.10, 0.42, 0.39, 0.55]);
        let best: Vec<f64>  = trace.iter().map(|t| t.1).collect();
        let saved: Vec<bool> = trace.iter().map(|t| t.0).collect();
        assert_eq!(best, vec![0.10, 0.42, 0.42, 0.55]);
        assert_eq!(saved, vec![true, true, false, true]);
    }

    #[test]
    fn test_equal_accuracy_is_not_an_improvement() {
        let trace = simulate(&[0.5, 0.5]);
        assert_eq!(trace, vec![(true, 0.5), (false, 0.5)]);
    }

    #[test]
    fn test_zero_accuracy_never_checkpoints() {
        let session = TrainingSession::new();
        assert!(!session.is_improvement(0.0));
        assert_eq!(session.best_epoch(), None);
    }

    #[test]
    fn test_promote_ignores_regressions() {
        let mut session = TrainingSession::new();
        session.promote(3, 0.7);
        session.promote(4, 0.6);
        assert_eq!(session.best_accuracy(), 0.7);
        assert_eq!(session.best_epoch(), Some(3));
    }
}
