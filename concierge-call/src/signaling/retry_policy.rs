use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Задержка между попытками переподключения к relay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryPolicy {
    Fixed {
        delay_ms: u64,
    },
    Exponential {
        initial_ms: u64,
        max_ms: u64,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed {
            delay_ms: delay.as_millis() as u64,
        }
    }

    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self::Exponential {
            initial_ms: initial.as_millis() as u64,
            max_ms: max.as_millis() as u64,
            multiplier: 2.0,
        }
    }

    /// Delay before reconnect attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            RetryPolicy::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            RetryPolicy::Exponential {
                initial_ms,
                max_ms,
                multiplier,
            } => {
                let factor = multiplier.max(1.0).powi(attempt.min(32) as i32);
                let delay = (initial_ms as f64 * factor).min(max_ms as f64);
                Duration::from_millis(delay as u64)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(Duration::from_secs(5), Duration::from_secs(60))
    }
}
