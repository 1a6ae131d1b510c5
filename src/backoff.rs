use std::time::Duration;

use rand::Rng;

/// Exponential backoff with jitter for rate-limited requests.
///
/// The wait before retry `n` (0-based) is `base * 2^n` plus or minus a
/// uniform jitter in `[0, base)`, clamped so it never drops below `base`.
/// Jitter keeps many clients that were throttled together from retrying
/// in lockstep.
#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    base: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Computes the wait before retry `attempt` using the process RNG.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay_with(attempt, &mut rand::rng())
    }

    /// Computes the wait before retry `attempt` using a caller-supplied RNG.
    ///
    /// Taking the RNG as a parameter keeps the policy deterministic under a
    /// seeded generator.
    pub fn delay_with<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let base_ms = self.base.as_millis() as u64;
        if base_ms == 0 {
            return Duration::ZERO;
        }

        // Cap the exponent so the shift cannot overflow; waits this long are
        // bounded by the caller's timeout anyway.
        let exponent = attempt.min(16);
        let target_ms = base_ms.saturating_mul(1u64 << exponent);

        let jitter_ms = rng.random_range(0..base_ms);
        let wait_ms = if rng.random_bool(0.5) {
            target_ms.saturating_add(jitter_ms)
        } else {
            target_ms.saturating_sub(jitter_ms)
        };

        Duration::from_millis(wait_ms.max(base_ms))
    }
}
