//! Estimated token timing.
//!
//! The client makes one non-streaming call, so genuine per-token timestamps
//! do not exist. These values are **simulated estimates** derived from the
//! total call duration — illustrative telemetry, not a measured streaming
//! contract. Dashboards reading them should treat them accordingly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Share of the total call attributed to reaching the first token.
///
/// A rough stand-in for prompt-processing latency; carries no product
/// meaning beyond making the two metrics distinguishable.
const FIRST_TOKEN_FRACTION: f64 = 0.15;

/// First/last token latency attached to each generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenTiming {
    /// Estimated milliseconds until the first token.
    pub time_to_first_token_ms: u64,
    /// Estimated milliseconds until the last token (= total call duration).
    pub time_to_last_token_ms: u64,
}

impl TokenTiming {
    /// Estimate timing from the total call duration.
    #[must_use]
    pub fn estimate(total: Duration) -> Self {
        let total_ms = total.as_secs_f64() * 1000.0;
        Self {
            time_to_first_token_ms: (total_ms * FIRST_TOKEN_FRACTION) as u64,
            time_to_last_token_ms: total_ms as u64,
        }
    }

    /// Zero timing, reported on cache hits.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_with_duration() {
        let timing = TokenTiming::estimate(Duration::from_millis(1000));
        assert_eq!(timing.time_to_last_token_ms, 1000);
        assert_eq!(timing.time_to_first_token_ms, 150);
    }

    #[test]
    fn first_token_never_exceeds_last() {
        for ms in [0u64, 1, 10, 500, 60_000] {
            let timing = TokenTiming::estimate(Duration::from_millis(ms));
            assert!(timing.time_to_first_token_ms <= timing.time_to_last_token_ms);
        }
    }

    #[test]
    fn zero_timing_for_cache_hits() {
        let timing = TokenTiming::zero();
        assert_eq!(timing.time_to_first_token_ms, 0);
        assert_eq!(timing.time_to_last_token_ms, 0);
    }
}
