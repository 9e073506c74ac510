//! Exponential backoff policy

use std::time::Duration;

use rand::Rng;

/// Backoff schedule and stopping rule for retried remote calls.
///
/// With neither `max_attempts` nor `max_elapsed` set the policy never gives up;
/// the process supervisor is then the outer bound.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Growth factor applied per attempt
    pub multiplier: f64,
    /// Upper bound of a single delay
    pub max_interval: Duration,
    /// Jitter: each delay is drawn from `base * [1 - f, 1 + f]`
    pub randomization_factor: f64,
    /// Total invocations allowed, including the first one
    pub max_attempts: Option<u32>,
    /// Wall time after which no further retry is scheduled
    pub max_elapsed: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            max_interval: Duration::from_secs(60),
            randomization_factor: 0.5,
            max_attempts: None,
            max_elapsed: None,
        }
    }
}

impl RetryPolicy {
    /// Retry forever without sleeping
    pub fn immediate() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            randomization_factor: 0.0,
            ..Default::default()
        }
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    pub fn with_max_elapsed(mut self, elapsed: Duration) -> Self {
        self.max_elapsed = Some(elapsed);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.max_elapsed.is_some()
    }

    /// Un-jittered delay before retry number `retry` (0-indexed)
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let base = self.initial_interval.as_secs_f64() * self.multiplier.powi(retry as i32);
        let capped = base.min(self.max_interval.as_secs_f64());

        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Delay before retry number `retry` with jitter applied
    pub fn jittered_delay(&self, retry: u32) -> Duration {
        let base = self.delay_for_retry(retry);

        if self.randomization_factor <= 0.0 || base.is_zero() {
            return base;
        }

        let spread = base.as_secs_f64() * self.randomization_factor;
        let low = base.as_secs_f64() - spread;
        let high = base.as_secs_f64() + spread;

        Duration::from_secs_f64(rand::thread_rng().gen_range(low..=high))
    }

    /// Shorten `delay` so a bounded policy never sleeps past `max_elapsed`
    pub fn clamp_to_deadline(&self, delay: Duration, elapsed: Duration) -> Duration {
        match self.max_elapsed {
            Some(max) => delay.min(max.saturating_sub(elapsed)),
            None => delay,
        }
    }

    /// Whether another attempt may follow `attempts` failed ones
    pub fn allows_retry(&self, attempts: u32, elapsed: Duration) -> bool {
        if let Some(max) = self.max_attempts {
            if attempts >= max {
                return false;
            }
        }

        if let Some(max) = self.max_elapsed {
            if elapsed >= max {
                return false;
            }
        }

        true
    }
}
