// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Rebuilds the network from a saved run and scores it on the
// test split. Runs on a plain (non-autodiff) backend.

use anyhow::{ensure, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::data::{batcher::CifarBatcher, dataset::CifarDataset};
use crate::domain::running::RunningTotals;
use crate::infra::{
    checkpoint::{CheckpointManager, CheckpointMeta},
    progress::{Phase, ProgressLine},
};
use crate::ml::{model::SqueezeNext, trainer::evaluate_epoch};

pub type EvalBackend = burn::backend::Wgpu;

pub struct Evaluator<B: Backend> {
    model:  SqueezeNext<B>,
    meta:   CheckpointMeta,
    device: B::Device,
}

impl<B: Backend> Evaluator<B> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg  = ckpt_manager.load_config()?;
        let meta = ckpt_manager.load_meta()?;
        ensure!(
            cfg.variant == meta.variant,
            "Checkpoint holds {} but its training config says {}",
            meta.variant,
            cfg.variant,
        );

        let model: SqueezeNext<B> = cfg.model_config().init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint (epoch {})", meta.epoch);
        Ok(Self { model, meta, device })
    }

    /// Metadata of the loaded checkpoint.
    pub fn meta(&self) -> &CheckpointMeta {
        &self.meta
    }

    pub fn evaluate(
        &self,
        dataset:     CifarDataset,
        batch_size:  usize,
        num_workers: usize,
    ) -> Result<RunningTotals> {
        let workers = num_workers.max(1);
        let iters   = dataset.batch_count(batch_size, workers);
        let loader  = DataLoaderBuilder::new(CifarBatcher::<B>::evaluation(self.device.clone()))
            .batch_size(batch_size)
            .num_workers(workers)
            .build(dataset);

        let progress = ProgressLine::new(Phase::Testing, self.meta.epoch, self.meta.epoch, iters);
        let totals   = evaluate_epoch(&self.model, loader.iter(), |iter, totals| {
            progress.update(iter, totals)
        })?;
        progress.finish()?;
        Ok(totals)
    }
}
