// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1-based)
//   - lr:         learning rate used for the epoch
//   - train_loss: mean cross-entropy over training batches
//   - train_acc:  fraction of training samples classified correctly
//   - test_loss:  mean cross-entropy over test batches
//   - test_acc:   fraction of test samples classified correctly
//
// Output file: checkpoint/<variant>/metrics.csv
//
// Example CSV output:
//   epoch,lr,train_loss,train_acc,test_loss,test_acc
//   1,0.010000,1.834512,0.321400,1.512033,0.447100
//   2,0.010000,1.402281,0.488720,1.289310,0.536300
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::session::EpochSummary;

const HEADER: &str = "epoch,lr,train_loss,train_acc,test_loss,test_acc";

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger in `dir`.
    /// Writes the CSV header if the file doesn't exist yet, so a
    /// resumed run appends to the existing log.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochSummary) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", format_row(m))?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, test_acc={:.4}",
            m.epoch,
            m.train_loss,
            m.test_acc,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

fn format_row(m: &EpochSummary) -> String {
    format!(
        "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
        m.epoch, m.lr, m.train_loss, m.train_acc, m.test_loss, m.test_acc,
    )
}
