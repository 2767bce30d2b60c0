use std::time::Duration;

/// Decision taken after a pass that did not reach success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The attempt budget is spent.
    GiveUp,
    /// Start another pass after the given delay (may be zero).
    RetryAfter(Duration),
}

/// Attempt budget with exponential backoff between passes.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of passes (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff. Zero disables waiting.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::ZERO,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Budget of `max_attempts` passes with no delay between them.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Decide what happens after failed pass number `attempt` (1-based).
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        // base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}
