// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Loads the best checkpoint of a variant and scores it on the
// CIFAR-10 test split.

use anyhow::Result;

use crate::data::{cifar::CifarReader, dataset::CifarDataset};
use crate::domain::{running::RunningTotals, variant::ModelVariant};
use crate::infra::checkpoint::{CheckpointManager, CheckpointMeta};
use crate::ml::evaluator::{EvalBackend, Evaluator};

/// Outcome of evaluating one checkpoint.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub meta:   CheckpointMeta,
    pub totals: RunningTotals,
}

pub struct EvaluateUseCase {
    variant:         ModelVariant,
    checkpoint_root: String,
    test_dir:        String,
    batch_size:      usize,
    num_workers:     usize,
}

impl EvaluateUseCase {
    pub fn new(
        variant:         ModelVariant,
        checkpoint_root: String,
        test_dir:        String,
        batch_size:      usize,
        num_workers:     usize,
    ) -> Self {
        Self { variant, checkpoint_root, test_dir, batch_size, num_workers }
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        let ckpt      = CheckpointManager::new(&self.checkpoint_root, self.variant)?;
        let evaluator = Evaluator::<EvalBackend>::from_checkpoint(&ckpt, Default::default())?;

        let dataset = CifarDataset::from_source(&CifarReader::test(&self.test_dir))?;
        tracing::info!("Evaluating on {} test samples", dataset.sample_count());

        let totals = evaluator.evaluate(dataset, self.batch_size, self.num_workers)?;
        Ok(EvaluationReport { meta: evaluator.meta().clone(), totals })
    }
}
