// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the training loop:
//
//   checkpoint.rs   best-model persistence (full-precision
//                   MessagePack records) plus the run config
//                   and checkpoint metadata as JSON
//
//   metrics.rs      per-epoch CSV log
//
//   progress.rs     in-place per-batch progress line
//
//   plot.rs         text charts of loss and accuracy
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Per-batch progress output
pub mod progress;

/// Live loss / accuracy chart
pub mod plot;
