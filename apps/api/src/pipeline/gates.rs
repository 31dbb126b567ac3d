//! Fixed pass thresholds for the scored stages.

/// Minimum resume score (0–100) that unlocks the coding stage.
pub const RESUME_PASS_THRESHOLD: f64 = 70.0;

/// Minimum coding score (0–100) that unlocks the interview.
pub const CODING_PASS_THRESHOLD: f64 = 60.0;

pub fn resume_passes(score: f64) -> bool {
    score.is_finite() && score >= RESUME_PASS_THRESHOLD
}

pub fn coding_passes(score: f64) -> bool {
    score.is_finite() && score >= CODING_PASS_THRESHOLD
}
