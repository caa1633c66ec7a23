use std::time::Duration;

/// Ticks a single advance may release; a stalled frame drops the rest.
const MAX_CATCH_UP: u32 = 8;

/// Fixed-period timer fed with frame deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    period: Duration,
    carry: Duration,
}

impl FixedStep {
    /// `period` is clamped to at least one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            carry: Duration::ZERO,
        }
    }

    /// Shorthand for [`FixedStep::new`] in milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Length of one step.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Adds `dt` and returns how many whole periods are now due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.carry += dt;
        let mut due = 0;
        while self.carry >= self.period {
            self.carry -= self.period;
            due += 1;
        }
        if due > MAX_CATCH_UP {
            due = MAX_CATCH_UP;
        }
        due
    }

    /// Discards any accumulated time.
    pub fn reset(&mut self) {
        self.carry = Duration::ZERO;
    }
}
