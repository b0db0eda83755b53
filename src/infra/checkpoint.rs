// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the best model of a run.
//
// One directory per variant, overwritten in place whenever test
// accuracy improves:
//
//   checkpoint/SqNxt_23_1x/
//     SqNxt_23_1x_Cifar10_model.mpk   ← model parameters
//     SqNxt_23_1x_Cifar10_optim.mpk   ← Adam moment estimates
//     SqNxt_23_1x_Cifar10.json        ← epoch, accuracy, losses
//     train_config.json               ← run configuration
//     metrics.csv                     ← per-epoch metrics
//
// Parameters are stored at full precision so that reloading a
// checkpoint yields bit-identical weights.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    optim::Optimizer,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::variant::ModelVariant;
use crate::ml::model::SqueezeNext;

type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Metadata stored next to the weights of the best model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub variant:    ModelVariant,
    pub epoch:      usize,
    /// Test accuracy in [0, 1]
    pub accuracy:   f64,
    /// Mean test loss of the epoch
    pub loss:       f64,
    pub train_loss: f64,
    pub lr:         f64,
}

/// Manages the single best-known checkpoint of one variant.
pub struct CheckpointManager {
    dir:  PathBuf,
    stem: String,
}

impl CheckpointManager {
    /// Checkpoint location for `variant` under `root`.
    /// Creates the directory if it doesn't already exist.
    pub fn new(root: impl AsRef<Path>, variant: ModelVariant) -> Result<Self> {
        let dir = root.as_ref().join(variant.name());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir, stem: format!("{variant}_Cifar10") })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Recorder paths are given without extension; the recorder adds ".mpk".
    fn model_path(&self) -> PathBuf {
        self.dir.join(format!("{}_model", self.stem))
    }

    fn optim_path(&self) -> PathBuf {
        self.dir.join(format!("{}_optim", self.stem))
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.stem))
    }

    pub fn exists(&self) -> bool {
        self.meta_path().exists()
    }

    /// Overwrite the checkpoint with the given model, optimizer state
    /// and metadata.
    pub fn save<B, O>(
        &self,
        model: &SqueezeNext<B>,
        optim: &O,
        meta:  &CheckpointMeta,
    ) -> Result<()>
    where
        B: AutodiffBackend,
        O: Optimizer<SqueezeNext<B>, B>,
    {
        self.save_model(model)?;

        let path = self.optim_path();
        CheckpointRecorder::new()
            .record(optim.to_record(), path.clone())
            .with_context(|| format!("Failed to save optimizer state to '{}'", path.display()))?;

        self.save_meta(meta)?;

        tracing::debug!("Saved checkpoint: epoch {}, acc {:.4}", meta.epoch, meta.accuracy);
        Ok(())
    }

    pub fn save_meta(&self, meta: &CheckpointMeta) -> Result<()> {
        let path = self.meta_path();
        fs::write(&path, serde_json::to_string_pretty(meta)?)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        Ok(())
    }

    /// Write only the model parameters.
    pub fn save_model<B: Backend>(&self, model: &SqueezeNext<B>) -> Result<()> {
        let path = self.model_path();
        CheckpointRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        Ok(())
    }

    /// Load the saved parameters into `model`, which must have the same
    /// architecture as the one that was saved.
    pub fn load_model<B: Backend>(
        &self,
        model:  SqueezeNext<B>,
        device: &B::Device,
    ) -> Result<SqueezeNext<B>> {
        let path = self.model_path();
        let record = CheckpointRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;
        Ok(model.load_record(record))
    }

    /// Restore the optimizer state saved alongside the model.
    pub fn load_optimizer<B, O>(&self, optim: O, device: &B::Device) -> Result<O>
    where
        B: AutodiffBackend,
        O: Optimizer<SqueezeNext<B>, B>,
    {
        let path = self.optim_path();
        let record = CheckpointRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load optimizer state '{}'", path.display()))?;
        Ok(optim.load_record(record))
    }

    pub fn load_meta(&self) -> Result<CheckpointMeta> {
        let path = self.meta_path();
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!("Cannot read '{}'. Have you run 'train' first?", path.display())
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the training configuration to JSON so `evaluate` can
    /// rebuild the same architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }
}
