/// Points deducted from the integrity percentage per violation.
pub const PENALTY_PER_VIOLATION: u32 = 5;

/// Focus-loss counter for one proctored stage session.
///
/// Events only count while armed. Arming starts a fresh session at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityTracker {
    armed: bool,
    violations: u32,
}

impl IntegrityTracker {
    pub fn armed() -> Self {
        let mut tracker = Self::default();
        tracker.arm();
        tracker
    }

    pub fn arm(&mut self) {
        self.armed = true;
        self.violations = 0;
    }

    /// Counts one violation; returns whether it was counted.
    pub fn on_focus_lost(&mut self) -> bool {
        if self.armed {
            self.violations = self.violations.saturating_add(1);
        }
        self.armed
    }

    /// Stops counting and returns the final tally.
    pub fn disarm(&mut self) -> u32 {
        self.armed = false;
        self.violations
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn violations(&self) -> u32 {
        self.violations
    }
}

/// Display metric: `max(0, 100 - 5 * violations)`.
pub fn integrity_score(violations: u32) -> u32 {
    100u32.saturating_sub(violations.saturating_mul(PENALTY_PER_VIOLATION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_only_while_armed() {
        let mut tracker = IntegrityTracker::default();
        assert!(!tracker.on_focus_lost());
        assert_eq!(tracker.violations(), 0);

        tracker.arm();
        assert!(tracker.on_focus_lost());
        assert!(tracker.on_focus_lost());
        assert_eq!(tracker.violations(), 2);

        assert_eq!(tracker.disarm(), 2);
        assert!(!tracker.on_focus_lost());
        assert_eq!(tracker.violations(), 2);
    }

    #[test]
    fn test_monotonic_then_reset_on_new_session() {
        let mut tracker = IntegrityTracker::armed();
        let mut last = 0;
        for _ in 0..4 {
            tracker.on_focus_lost();
            assert!(tracker.violations() > last);
            last = tracker.violations();
        }

        tracker.arm();
        assert_eq!(tracker.violations(), 0);
        assert!(tracker.is_armed());
    }

    #[test]
    fn test_integrity_score_floor() {
        assert_eq!(integrity_score(0), 100);
        assert_eq!(integrity_score(3), 85);
        assert_eq!(integrity_score(20), 0);
        assert_eq!(integrity_score(u32::MAX), 0);
    }
}
