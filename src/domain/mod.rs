// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing the training run: which network
// variant is trained, how its blocks are wired, how the
// learning rate evolves and how a session tracks its best
// accuracy.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, functions and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// The four supported SqueezeNext configurations
pub mod variant;

/// Per-block channel configuration, computed up front
pub mod channel_plan;

/// Epoch → learning rate step schedule
pub mod schedule;

/// Running loss / accuracy totals for one phase of an epoch
pub mod running;

/// Best-accuracy bookkeeping for a whole training run
pub mod session;

/// Core abstractions (traits) that other layers implement
pub mod traits;
