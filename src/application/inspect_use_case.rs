// ============================================================
// Layer 2 — Inspect Use Case
// ============================================================
// Smoke check of a variant: channel widths, parameter count and
// the logits shape of one forward pass. Needs no dataset and no
// checkpoint.

use crate::domain::variant::ModelVariant;
use crate::ml::{
    model::SqueezeNextConfig,
    summary::{summarize, ModelSummary},
};

pub struct InspectUseCase {
    variant: ModelVariant,
}

impl InspectUseCase {
    pub fn new(variant: ModelVariant) -> Self {
        Self { variant }
    }

    pub fn execute(&self) -> ModelSummary {
        let config = SqueezeNextConfig::from_variant(self.variant);
        tracing::debug!("Inspecting {} (width {}, blocks {:?})", self.variant, config.width, config.blocks);
        summarize(&config)
    }
}
