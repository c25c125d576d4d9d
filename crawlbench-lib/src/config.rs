use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, Result};

/// Default maximum request rate, 10 requests per second.
pub const DEFAULT_MAX_RATE: f64 = 10.0;
/// Default total number of attempts per target, 3.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
/// Default initial wait time between attempts, 1 second.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
/// Default backoff multiplier, 2.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
/// Default per-request timeout, 20 seconds.
pub const DEFAULT_PER_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Default worker-pool width, 5 workers.
pub const DEFAULT_POOL_SIZE: usize = 5;
/// Default fixed inter-request delay of the sequential baseline, 1 second.
pub const DEFAULT_SEQUENTIAL_DELAY: Duration = Duration::from_secs(1);

/// Configuration surface consumed by the core.
///
/// These are plain values; reading them from files or flags is the
/// driver's concern. All strategies built from the same config produce
/// the same logical outcome set, only wall-clock latency differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// Maximum requests per second admitted by the shared rate limiter
    pub max_rate: f64,

    /// Maximum concurrently admitted requests; `None` leaves only the
    /// timing gate
    pub max_concurrent: Option<NonZeroUsize>,

    /// Total attempts per target, including the first
    pub max_attempts: usize,

    /// Initial wait time between attempts
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,

    /// Multiplier applied to the wait time after each attempt
    pub backoff_factor: f64,

    /// Timeout bounding every single request attempt
    #[serde(with = "humantime_serde")]
    pub per_request_timeout: Duration,

    /// Number of workers in the worker-pool strategy
    pub pool_size: usize,

    /// Fixed inter-request delay of the sequential baseline
    #[serde(with = "humantime_serde")]
    pub sequential_delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_rate: DEFAULT_MAX_RATE,
            max_concurrent: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            per_request_timeout: DEFAULT_PER_REQUEST_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            sequential_delay: DEFAULT_SEQUENTIAL_DELAY,
        }
    }
}

impl CrawlConfig {
    /// Check all bounds of the configuration surface.
    ///
    /// # Errors
    ///
    /// Returns the first violated bound: `max_rate` must be positive and
    /// finite, `max_attempts` at least 1, `backoff_factor` at least 1,
    /// `per_request_timeout` greater than zero and `pool_size` at
    /// least 1.
    pub fn validate(&self) -> Result<()> {
        if !self.max_rate.is_finite() || self.max_rate <= 0.0 {
            return Err(ErrorKind::InvalidRateLimit(self.max_rate));
        }
        if self.max_attempts == 0 {
            return Err(ErrorKind::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(ErrorKind::InvalidRetryPolicy(format!(
                "backoff_factor must be at least 1, got {}",
                self.backoff_factor
            )));
        }
        if self.per_request_timeout.is_zero() {
            return Err(ErrorKind::InvalidConfig(
                "per_request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.pool_size == 0 {
            return Err(ErrorKind::InvalidConfig(
                "pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_rate, 10.0);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.backoff_factor, 2.0);
    }

    #[test]
    fn test_bounds() {
        let mut config = CrawlConfig {
            max_rate: 0.0,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ErrorKind::InvalidRateLimit(_))
        ));

        config.max_rate = 1.0;
        config.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ErrorKind::InvalidRetryPolicy(_))
        ));

        config.max_attempts = 1;
        config.backoff_factor = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ErrorKind::InvalidRetryPolicy(_))
        ));

        config.backoff_factor = 1.0;
        config.per_request_timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ErrorKind::InvalidConfig(_))));

        config.per_request_timeout = Duration::from_secs(5);
        config.pool_size = 0;
        assert!(matches!(config.validate(), Err(ErrorKind::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_deserialization() {
        let config: CrawlConfig = toml::from_str(
            r#"
            max_rate = 2.5
            max_concurrent = 4
            max_attempts = 5
            initial_delay = "500ms"
            backoff_factor = 3.0
            per_request_timeout = "10s"
            pool_size = 8
            sequential_delay = "250ms"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_rate, 2.5);
        assert_eq!(config.max_concurrent, NonZeroUsize::new(4));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_delay, Duration::from_millis(500));
        assert_eq!(config.per_request_timeout, Duration::from_secs(10));
        assert_eq!(config.sequential_delay, Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CrawlConfig = toml::from_str("max_rate = 1.0").unwrap();
        assert_eq!(config.max_rate, 1.0);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.per_request_timeout, DEFAULT_PER_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(toml::from_str::<CrawlConfig>("max_workers = 3").is_err());
    }
}
