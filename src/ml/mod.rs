// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network, optimizer and backend code lives here.
//
//   init.rs        per-layer weight initialization
//   model.rs       residual block and the four-stage network
//   trainer.rs     train / test loop with checkpointing
//   evaluator.rs   scores a saved checkpoint
//   summary.rs     one-image shape check on the CPU backend
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Gholami et al. (2018) SqueezeNext

/// Weight initialization per layer kind
pub mod init;

/// SqueezeNext architecture
pub mod model;

/// Full training loop with evaluation and checkpointing
pub mod trainer;

/// Checkpoint evaluation on the test split
pub mod evaluator;

/// Variant inspection
pub mod summary;
