// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + test loop using Burn's DataLoader and Adam.
//
//   - Training runs on an autodiff backend (Autodiff<Wgpu>)
//   - model.valid() returns the model on the inner backend, so
//     evaluation builds no graph and batch-norm uses its running
//     statistics
//   - the test batcher must therefore also use the inner backend
//
// Per epoch:
//   1. lr = lr_schedule(base_lr, epoch)
//   2. fresh Adam state (unless --keep-optimizer-state)
//   3. one pass over the training batches
//   4. one pass over the test batches
//   5. if test accuracy beats the best so far: save, reload, promote
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::{wgpu::WgpuDevice, Autodiff, Wgpu},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::time::Instant;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{CifarBatch, CifarBatcher},
    dataset::CifarDataset,
};
use crate::domain::{
    running::RunningTotals,
    schedule::lr_schedule,
    session::{EpochSummary, TrainingSession},
};
use crate::infra::{
    checkpoint::{CheckpointManager, CheckpointMeta},
    metrics::MetricsLogger,
    plot::LiveChart,
    progress::{Phase, ProgressLine},
};
use crate::ml::model::{count_correct, SqueezeNext, SqueezeNextConfig};

type TrainBackend = Autodiff<Wgpu>;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: CifarDataset,
    test_dataset:  CifarDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<TrainingSession> {
    let device = WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<TrainBackend>(
        cfg, &cfg.model_config(), train_dataset, test_dataset, ckpt_manager, device,
    )
}

/// Adam denominator term. Burn defaults to 1e-5.
pub const ADAM_EPSILON: f32 = 1e-8;

/// Adam with L2 weight decay.
pub fn optimizer_config(weight_decay: f64) -> AdamConfig {
    AdamConfig::new()
        .with_epsilon(ADAM_EPSILON)
        .with_weight_decay(Some(WeightDecayConfig::new(weight_decay as f32)))
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    model_cfg:     &SqueezeNextConfig,
    train_dataset: CifarDataset,
    test_dataset:  CifarDataset,
    ckpt_manager:  &CheckpointManager,
    device:        B::Device,
) -> Result<TrainingSession> {
    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: SqueezeNext<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} ({} blocks, {} parameters)",
        cfg.variant,
        model.block_count(),
        model.num_params(),
    );

    let optim_cfg = optimizer_config(cfg.weight_decay);
    let mut optim = optim_cfg.init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let workers     = cfg.num_workers.max(1);
    let train_iters = train_dataset.batch_count(cfg.batch_size, workers);
    let test_iters  = test_dataset.batch_count(cfg.test_batch_size, workers);

    let train_loader = DataLoaderBuilder::new(CifarBatcher::<B>::training(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(workers)
        .build(train_dataset);

    // Inner backend: no autodiff overhead during evaluation
    let test_loader = DataLoaderBuilder::new(CifarBatcher::<B::InnerBackend>::evaluation(device.clone()))
        .batch_size(cfg.test_batch_size)
        .num_workers(workers)
        .build(test_dataset);

    let metrics     = MetricsLogger::new(ckpt_manager.dir())?;
    tracing::info!("Logging metrics to '{}'", metrics.csv_path().display());
    let mut chart   = LiveChart::new();
    let mut session = TrainingSession::new();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in cfg.start_epoch..cfg.start_epoch + cfg.epochs {
        let started = Instant::now();
        let lr      = lr_schedule(cfg.lr, epoch);
        println!("{} LR: {:.4}", cfg.variant, lr);

        if !cfg.keep_optimizer_state {
            optim = optim_cfg.init();
        }

        // ── Training phase ────────────────────────────────────────────────────
        let progress = ProgressLine::new(Phase::Training, epoch, cfg.epochs, train_iters);
        let (trained, train_totals) = train_epoch(
            model,
            &mut optim,
            train_loader.iter(),
            lr,
            |iter, totals| progress.update(iter, totals),
        )?;
        model = trained;
        progress.finish()?;

        // ── Test phase ────────────────────────────────────────────────────────
        let progress    = ProgressLine::new(Phase::Testing, epoch, cfg.epochs, test_iters);
        let test_totals = evaluate_epoch(
            &model.valid(),
            test_loader.iter(),
            |iter, totals| progress.update(iter, totals),
        )?;
        progress.finish()?;

        // ── Checkpoint on improvement ─────────────────────────────────────────
        let accuracy = test_totals.accuracy();
        let improved = session.is_improvement(accuracy);
        if improved {
            println!("Saving Model...");
            let meta = CheckpointMeta {
                variant:    cfg.variant,
                epoch,
                accuracy,
                loss:       test_totals.mean_loss(),
                train_loss: train_totals.mean_loss(),
                lr,
            };
            ckpt_manager.save(&model, &optim, &meta)?;

            // Continue from exactly what was written
            model = ckpt_manager.load_model(model, &device)?;
            optim = ckpt_manager.load_optimizer::<B, _>(optim, &device)?;
            session.promote(epoch, accuracy);
            tracing::info!("Checkpoint saved and reloaded: epoch {}, acc {:.4}", epoch, accuracy);
        }

        let summary = EpochSummary {
            epoch,
            lr,
            train_loss: train_totals.mean_loss(),
            train_acc:  train_totals.accuracy(),
            test_loss:  test_totals.mean_loss(),
            test_acc:   accuracy,
            improved,
        };
        session.record_epoch(summary);
        metrics.log(&summary)?;

        println!();
        println!("Epoch #{} Cost {}s", epoch, started.elapsed().as_secs());
        chart.update(&summary);
        println!("{}", chart.render());
    }

    println!("Best Acc@1: {:.4}", session.best_accuracy() * 100.0);
    tracing::info!("Training complete!");
    Ok(session)
}

/// One pass over `batches`: forward, cross-entropy, backward and one
/// optimizer step per batch. `on_batch` receives the 1-based batch
/// index and the totals so far; its first error stops the pass.
pub fn train_epoch<B, O>(
    mut model:    SqueezeNext<B>,
    optim:        &mut O,
    batches:      impl IntoIterator<Item = CifarBatch<B>>,
    lr:           f64,
    mut on_batch: impl FnMut(usize, &RunningTotals) -> Result<()>,
) -> Result<(SqueezeNext<B>, RunningTotals)>
where
    B: AutodiffBackend,
    O: Optimizer<SqueezeNext<B>, B>,
{
    let mut totals = RunningTotals::default();

    for (idx, batch) in batches.into_iter().enumerate() {
        let batch_size     = batch.targets.dims()[0];
        let (loss, logits) = model.forward_classification(batch.images, batch.targets.clone());

        let loss_value: f64 = loss.clone().into_scalar().elem::<f64>();
        let correct = count_correct(logits.detach(), batch.targets);

        // Backward pass + Adam update
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optim.step(lr, model, grads);

        totals.update(loss_value, correct, batch_size);
        on_batch(idx + 1, &totals)?;
    }

    Ok((model, totals))
}

/// Forward-only pass accumulating loss and accuracy.
pub fn evaluate_epoch<B: Backend>(
    model:        &SqueezeNext<B>,
    batches:      impl IntoIterator<Item = CifarBatch<B>>,
    mut on_batch: impl FnMut(usize, &RunningTotals) -> Result<()>,
) -> Result<RunningTotals> {
    let mut totals = RunningTotals::default();

    for (idx, batch) in batches.into_iter().enumerate() {
        let batch_size     = batch.targets.dims()[0];
        let (loss, logits) = model.forward_classification(batch.images, batch.targets.clone());

        let loss_value: f64 = loss.into_scalar().elem::<f64>();
        totals.update(loss_value, count_correct(logits, batch.targets), batch_size);
        on_batch(idx + 1, &totals)?;
    }

    Ok(totals)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cifar::{CifarSample, IMAGE_BYTES};
    use crate::domain::variant::ModelVariant;
    use burn::{
        backend::{ndarray::NdArrayDevice, NdArray},
        data::dataloader::batcher::Batcher,
        tensor::Distribution,
    };

    type TestBackend         = NdArray;
    type TestAutodiffBackend = Autodiff<NdArray>;

    fn tiny_config() -> SqueezeNextConfig {
        SqueezeNextConfig::new(0.5, [1, 1, 1, 1])
    }

    fn random_batch<B: Backend>(n: usize, device: &B::Device) -> CifarBatch<B> {
        let labels: Vec<i32> = (0..n as i32).map(|i| i % 10).collect();
        CifarBatch {
            images:  Tensor::random([n, 3, 32, 32], Distribution::Normal(0.0, 1.0), device),
            targets: Tensor::from_ints(labels.as_slice(), device),
        }
    }

    fn samples(n: usize) -> Vec<CifarSample> {
        (0..n)
            .map(|i| CifarSample { image: vec![(i * 17 % 256) as u8; IMAGE_BYTES], label: (i % 10) as u8 })
            .collect()
    }

    #[test]
    fn test_train_epoch_accumulates_every_batch() {
        let device = Default::default();
        let model: SqueezeNext<TestAutodiffBackend> = tiny_config().init(&device);
        let mut optim = optimizer_config(5e-4).init();

        let batches = vec![random_batch(3, &device), random_batch(2, &device)];
        let mut seen = Vec::new();
        let (_, totals) = train_epoch(model, &mut optim, batches, 0.01, |i, t| {
            seen.push((i, t.seen));
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec![(1, 3), (2, 5)]);
        assert_eq!(totals.batches, 2);
        assert!(totals.mean_loss().is_finite());
        assert!(totals.correct <= 5);
    }

    #[test]
    fn test_train_epoch_updates_parameters() {
        let device = Default::default();
        let model: SqueezeNext<TestAutodiffBackend> = tiny_config().init(&device);
        let before: Vec<f32> = model.classifier.weight.val().into_data().iter::<f32>().collect();

        let mut optim = optimizer_config(5e-4).init();
        let (model, _) = train_epoch(model, &mut optim, vec![random_batch(4, &device)], 0.01, |_, _| Ok(()))
            .unwrap();

        let after: Vec<f32> = model.classifier.weight.val().into_data().iter::<f32>().collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_evaluate_epoch_on_inner_backend() {
        let device = Default::default();
        let model: SqueezeNext<TestBackend> = tiny_config().init(&device);

        let totals = evaluate_epoch(
            &model,
            vec![random_batch(4, &device), random_batch(4, &device), random_batch(1, &device)],
            |_, _| Ok(()),
        )
        .unwrap();
        assert_eq!(totals.seen, 9);
        assert_eq!(totals.batches, 3);
        assert!(totals.accuracy() <= 1.0);
    }

    #[test]
    fn test_evaluate_epoch_with_no_batches() {
        let device = Default::default();
        let model: SqueezeNext<TestBackend> = tiny_config().init(&device);
        let totals = evaluate_epoch(&model, Vec::<CifarBatch<TestBackend>>::new(), |_, _| Ok(()))
            .unwrap();
        assert!(totals.mean_loss().is_nan());
        assert_eq!(totals.accuracy(), 0.0);
    }

    #[test]
    fn test_batcher_feeds_training_step() {
        let device  = NdArrayDevice::Cpu;
        let batcher = CifarBatcher::<TestAutodiffBackend>::training(device.clone());
        let batch   = batcher.batch(samples(4));

        let model: SqueezeNext<TestAutodiffBackend> = tiny_config().init(&device);
        let mut optim = optimizer_config(5e-4).init();
        let (_, totals) = train_epoch(model, &mut optim, vec![batch], 0.01, |_, _| Ok(())).unwrap();
        assert_eq!(totals.seen, 4);
    }

    #[test]
    fn test_optimizer_config_epsilon_and_decay() {
        let json = serde_json::to_value(optimizer_config(5e-4)).unwrap();
        assert_eq!(json["epsilon"].as_f64().unwrap() as f32, ADAM_EPSILON);
        assert_eq!(json["weight_decay"]["penalty"].as_f64().unwrap() as f32, 5e-4f32);
        assert_eq!(json["beta_1"].as_f64().unwrap() as f32, 0.9f32);
        assert_eq!(json["beta_2"].as_f64().unwrap() as f32, 0.999f32);
    }

    #[test]
    fn test_callback_error_stops_the_pass() {
        let device = Default::default();
        let model: SqueezeNext<TestAutodiffBackend> = tiny_config().init(&device);
        let mut optim = optimizer_config(5e-4).init();

        let mut calls = 0;
        let result = train_epoch(
            model,
            &mut optim,
            vec![random_batch(2, &device), random_batch(2, &device)],
            0.01,
            |_, _| {
                calls += 1;
                anyhow::bail!("stdout closed")
            },
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);

        let model: SqueezeNext<TestBackend> = tiny_config().init(&device);
        let result = evaluate_epoch(&model, vec![random_batch(2, &device)], |_, _| {
            anyhow::bail!("stdout closed")
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_train_loop_records_every_epoch() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg = TrainConfig {
            variant:         ModelVariant::Sqnxt23x1,
            epochs:          2,
            batch_size:      4,
            test_batch_size: 4,
            num_workers:     2,
            checkpoint_root: dir.path().to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };
        let ckpt = CheckpointManager::new(dir.path(), cfg.variant).unwrap();

        let session = train_loop::<TestAutodiffBackend>(
            &cfg,
            &tiny_config(),
            CifarDataset::new(samples(8)),
            CifarDataset::new(samples(6)),
            &ckpt,
            device,
        )
        .unwrap();

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].epoch, 1);
        assert_eq!(history[1].lr, 0.01);

        // A checkpoint exists only if some epoch classified anything correctly
        let best = history.iter().map(|s| s.test_acc).fold(0.0, f64::max);
        assert_eq!(session.best_accuracy(), best);
        assert_eq!(ckpt.exists(), best > 0.0);
        if best > 0.0 {
            assert_eq!(ckpt.load_meta().unwrap().accuracy, best);
        }

        let csv = std::fs::read_to_string(ckpt.dir().join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
