use std::time::Duration;

use crate::RetryConfig;

/// Bounded attempts with a table of delays between them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.backoff_secs.iter().map(|s| Duration::from_secs(*s)).collect(),
        )
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Retry immediately; for tests and scripted backends
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Vec::new())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    /// Delay after failed attempt `attempt` (1-based) before the next one.
    ///
    /// Attempts past the end of the table reuse its last entry; an empty table means no delay.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let idx = (attempt.max(1) - 1) as usize;
        self.backoff
            .get(idx)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_after(1), Duration::from_secs(30));
        assert_eq!(policy.delay_after(2), Duration::from_secs(60));
        assert_eq!(policy.delay_after(3), Duration::from_secs(120));
        assert!(!policy.is_last(2));
        assert!(policy.is_last(3));
    }

    #[test]
    fn test_last_delay_repeats() {
        let policy = RetryPolicy::new(6, vec![Duration::from_secs(1), Duration::from_secs(5)]);
        assert_eq!(policy.delay_after(2), Duration::from_secs(5));
        assert_eq!(policy.delay_after(5), Duration::from_secs(5));
    }

    #[test]
    fn test_immediate_and_zero_attempts() {
        let policy = RetryPolicy::immediate(0);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_after(1), Duration::ZERO);
    }
}
