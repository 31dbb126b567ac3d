// Session integrity: focus-loss counting for proctored stages (coding test,
// live interview). Violations are recorded on the stage result, never enforced.

pub mod handlers;
pub mod sessions;
pub mod tracker;

pub use sessions::{SessionRegistry, StageSession};
pub use tracker::{integrity_score, IntegrityTracker};
