use std::time::Duration;

/// Bounded exponential backoff. `max_attempts` counts completion calls,
/// not sleeps: a three-attempt schedule yields at most two delays.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    max_attempts: u8,
    base_delay: Duration,
    attempted: u8,
}

impl RetrySchedule {
    pub fn new(max_attempts: u8, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            attempted: 0,
        }
    }

    /// Failed attempts recorded so far.
    pub fn attempts_made(&self) -> u8 {
        self.attempted
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempted >= self.max_attempts
    }

    /// Record one failed attempt. Returns the delay to wait before the
    /// next try, doubling each time, or `None` once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempted = self.attempted.saturating_add(1);
        if self.attempted >= self.max_attempts {
            return None;
        }
        let factor = 1u32 << (self.attempted - 1).min(16);
        Some(self.base_delay.saturating_mul(factor))
    }
}
