// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one command each.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

// Download data, train, checkpoint the best model
pub mod train_use_case;

// Score a saved checkpoint on the test split
pub mod evaluate_use_case;

// Build a variant and report its shapes
pub mod inspect_use_case;
