// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration
//   Step 2: Load the training split     (Layer 4 - data)
//   Step 3: Load the test split         (Layer 4 - data)
//   Step 4: Save config                 (Layer 6 - infra)
//   Step 5: Run training loop           (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::data::{cifar::CifarReader, dataset::CifarDataset};
use crate::domain::{session::TrainingSession, variant::ModelVariant};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{model::SqueezeNextConfig, trainer::run_training};

// ─── Training Configuration ──────────────────────────────────────────────────
// All parameters of a training run.
// Saved next to the checkpoint so `evaluate` can rebuild the same
// architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub variant:              ModelVariant,
    pub lr:                   f64,
    /// First epoch number; the schedule is evaluated on absolute epochs
    pub start_epoch:          usize,
    pub epochs:               usize,
    pub batch_size:           usize,
    pub test_batch_size:      usize,
    pub num_workers:          usize,
    pub seed:                 u64,
    pub weight_decay:         f64,
    pub train_dir:            String,
    pub test_dir:             String,
    pub checkpoint_root:      String,
    /// Carry Adam moment estimates across epochs instead of resetting them
    pub keep_optimizer_state: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            variant:              ModelVariant::Sqnxt23x1,
            lr:                   0.01,
            start_epoch:          1,
            epochs:               200,
            batch_size:           128,
            test_batch_size:      80,
            num_workers:          8,
            seed:                 42,
            weight_decay:         5e-4,
            train_dir:            "train_data".to_string(),
            test_dir:             "test_data".to_string(),
            checkpoint_root:      "checkpoint".to_string(),
            keep_optimizer_state: false,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> SqueezeNextConfig {
        SqueezeNextConfig::from_variant(self.variant)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.start_epoch >= 1, "--start-epoch must be at least 1 (epochs are 1-based)");
        ensure!(self.batch_size > 0, "--batch-size must be positive");
        ensure!(self.test_batch_size > 0, "--test-batch-size must be positive");
        ensure!(self.lr > 0.0, "--lr must be positive, got {}", self.lr);
        ensure!(self.weight_decay >= 0.0, "--weight-decay must not be negative");
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSession> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Steps 2-3: Load both splits, downloading on first run ────────────
        let train_dataset = CifarDataset::from_source(&CifarReader::train(&cfg.train_dir))?;
        let test_dataset  = CifarDataset::from_source(&CifarReader::test(&cfg.test_dir))?;
        tracing::info!(
            "Dataset ready: {} train, {} test samples",
            train_dataset.sample_count(),
            test_dataset.sample_count(),
        );

        // ── Step 4: Save config for evaluation ───────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_root, cfg.variant)?;
        ckpt_manager.save_config(cfg)?;

        // ── Step 5: Run training loop (Layer 5) ──────────────────────────────
        run_training(cfg, train_dataset, test_dataset, &ckpt_manager)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.batch_size, 128);
        assert_eq!(cfg.test_batch_size, 80);
        assert!(!cfg.keep_optimizer_state);
        assert_eq!(cfg.model_config().blocks, [6, 6, 8, 1]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_start_epoch_is_rejected() {
        let cfg = TrainConfig { start_epoch: 0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_json_uses_variant_name() {
        let cfg  = TrainConfig { variant: ModelVariant::Sqnxt23x2V5, ..TrainConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"SqNxt_23_2x_v5\""));

        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.variant, ModelVariant::Sqnxt23x2V5);
    }
}
