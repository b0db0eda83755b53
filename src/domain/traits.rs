// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Seams between the domain and the layers that implement it.
//
//   SampleSource     CifarReader loads labelled images from disk
//   ImageTransform   RandomCropFlip (training) and Identity
//                    (evaluation) rewrite one image before batching
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the complete list of samples of
/// one dataset split.
pub trait SampleSource {
    type Sample;

    /// Load every sample of the split, in file order.
    fn load_all(&self) -> Result<Vec<Self::Sample>>;
}

// ─── ImageTransform ───────────────────────────────────────────────────────────
/// A per-image transformation applied while batching.
///
/// Images are channel-major `u8` buffers (`C × H × W`). Implementations
/// must return a buffer of the same length.
pub trait ImageTransform: Send + Sync {
    fn apply(&self, image: &[u8]) -> Vec<u8>;
}
