// ============================================================
// Layer 3 — Learning-Rate Schedule
// ============================================================
// Step decay by epoch (epochs are 1-based):
//
//   epoch        factor
//   1 ..= 60     1
//   61 ..= 120   0.2
//   121 ..= 160  0.04
//   161 ..       0.008

/// Multiplier applied at each step boundary
pub const DECAY: f64 = 0.2;

/// Last epoch of each step; the schedule has `len + 1` plateaus.
pub const MILESTONES: [usize; 3] = [60, 120, 160];

/// Number of decay steps already taken at `epoch`.
pub fn decay_steps(epoch: usize) -> i32 {
    MILESTONES.iter().filter(|&&m| epoch > m).count() as i32
}

/// Learning rate for `epoch` given the base rate.
pub fn lr_schedule(base_lr: f64, epoch: usize) -> f64 {
    base_lr * DECAY.powi(decay_steps(epoch))
}
