use std::time::Duration;

/// Retry behavior for rate-limited (429) responses.
///
/// Fixed at client construction; nothing mutates it afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryConfig {
    /// Enables or disables automatic retries.
    pub enabled: bool,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base backoff delay; actual waits grow exponentially with jitter.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            base_delay: Duration::from_millis(3_000),
        }
    }
}

impl RetryConfig {
    /// Returns a config with retries switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Sets the maximum number of retries after the initial attempt.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base backoff delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }
}

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout, applied to each attempt individually.
    pub timeout: Duration,
    /// Retry behavior for 429 responses.
    pub retry: RetryConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientOptions {
    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry config.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientOptions, RetryConfig};

    #[test]
    fn retry_defaults_match_documented_values() {
        let retry = RetryConfig::default();
        assert!(retry.enabled);
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.base_delay, Duration::from_millis(3_000));
    }

    #[test]
    fn disabled_keeps_other_defaults() {
        let retry = RetryConfig::disabled();
        assert!(!retry.enabled);
        assert_eq!(retry.max_retries, 3);
    }

    #[test]
    fn mutators_compose() {
        let options = ClientOptions::default()
            .with_timeout(Duration::from_secs(2))
            .with_retry(
                RetryConfig::default()
                    .with_max_retries(1)
                    .with_base_delay(Duration::from_millis(10)),
            );
        assert_eq!(options.timeout, Duration::from_secs(2));
        assert_eq!(options.retry.max_retries, 1);
        assert_eq!(options.retry.base_delay, Duration::from_millis(10));
    }
}
