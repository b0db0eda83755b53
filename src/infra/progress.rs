// ============================================================
// Layer 6 — Progress Line
// ============================================================
// Rewrites a single stdout line after every batch:
//
//   [2024-05-01 12:00:00] Training Epoch [3/200] Iter[17/391]  Training_Loss: 1.2345 Tr_Acc: 0.512
//   [2024-05-01 12:03:10] Testing Epoch [3/200] Iter[125/125]  Test_Loss: 1.0312 Te_Acc: 0.634
//
// The line starts with '\r' so the terminal overwrites it in
// place; `finish` moves to the next line once a phase is done.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::{self, Write};

use crate::domain::running::RunningTotals;

/// The two phases of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Training,
    Testing,
}

impl Phase {
    fn labels(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Phase::Training => ("Training", "Training_Loss", "Tr_Acc"),
            Phase::Testing  => ("Testing",  "Test_Loss",     "Te_Acc"),
        }
    }
}

/// Build one progress line (without the leading '\r').
pub fn format_progress(
    now:    DateTime<Local>,
    phase:  Phase,
    epoch:  usize,
    epochs: usize,
    iter:   usize,
    iters:  usize,
    totals: &RunningTotals,
) -> String {
    let (name, loss_label, acc_label) = phase.labels();
    format!(
        "[{}] {} Epoch [{}/{}] Iter[{}/{}]  {}: {:.4} {}: {:.3}",
        now.format("%Y-%m-%d %H:%M:%S"),
        name,
        epoch,
        epochs,
        iter,
        iters,
        loss_label,
        totals.mean_loss(),
        acc_label,
        totals.accuracy(),
    )
}

/// In-place progress printer for one phase of one epoch.
pub struct ProgressLine {
    phase:  Phase,
    epoch:  usize,
    epochs: usize,
    iters:  usize,
}

impl ProgressLine {
    pub fn new(phase: Phase, epoch: usize, epochs: usize, iters: usize) -> Self {
        Self { phase, epoch, epochs, iters }
    }

    /// Overwrite the current line with the totals after batch `iter` (1-based).
    pub fn update(&self, iter: usize, totals: &RunningTotals) -> Result<()> {
        let line = format_progress(
            Local::now(), self.phase, self.epoch, self.epochs, iter, self.iters, totals,
        );
        let mut out = io::stdout().lock();
        write!(out, "\r{line}")?;
        out.flush()?;
        Ok(())
    }

    /// End the in-place line.
    pub fn finish(&self) -> Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn totals() -> RunningTotals {
        let mut t = RunningTotals::default();
        t.update(1.5, 3, 4);
        t.update(0.5, 2, 4);
        t
    }

    #[test]
    fn test_training_line() {
        let now  = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 7).unwrap();
        let line = format_progress(now, Phase::Training, 3, 200, 2, 391, &totals());
        assert_eq!(
            line,
            "[2024-05-01 12:00:07] Training Epoch [3/200] Iter[2/391]  Training_Loss: 1.0000 Tr_Acc: 0.625"
        );
    }

    #[test]
    fn test_testing_line_uses_test_labels() {
        let now  = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 7).unwrap();
        let line = format_progress(now, Phase::Testing, 1, 1, 1, 1, &totals());
        assert!(line.contains("Testing Epoch [1/1]"));
        assert!(line.contains("Test_Loss: 1.0000"));
        assert!(line.ends_with("Te_Acc: 0.625"));
    }

    #[test]
    fn test_update_and_finish_report_success() {
        let progress = ProgressLine::new(Phase::Testing, 1, 1, 2);
        assert!(progress.update(1, &totals()).is_ok());
        assert!(progress.finish().is_ok());
    }
}
