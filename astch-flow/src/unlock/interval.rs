//! Poll interval schedule for the unlock poller.

use std::time::Duration;

use rand::Rng;

/// Returns the delay before the next status poll, given how many polls have
/// already happened. Fast while the pipeline usually answers, slower once
/// the wait drags on.
pub fn poll_backoff(attempt: u32) -> Duration {
    match attempt {
        0..=4 => Duration::from_secs(2),
        5..=9 => Duration::from_secs(5),
        10..=19 => Duration::from_secs(10),
        _ => Duration::from_secs(30),
    }
}

/// Spread a delay by ±20% so users returning from the gateway at the same
/// moment do not poll in lockstep.
pub fn with_jitter(base: Duration) -> Duration {
    let base_ms = base.as_millis() as u64;
    let spread = base_ms / 5;
    if spread == 0 {
        return base;
    }
    let offset = rand::rng().random_range(0..=2 * spread);
    Duration::from_millis(base_ms - spread + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_monotone_non_decreasing() {
        let mut previous = Duration::ZERO;
        for attempt in 0..50 {
            let delay = poll_backoff(attempt);
            assert!(delay >= previous, "attempt {attempt} shrank the delay");
            previous = delay;
        }
    }

    #[test]
    fn backoff_steps_match_schedule() {
        assert_eq!(poll_backoff(0), Duration::from_secs(2));
        assert_eq!(poll_backoff(5), Duration::from_secs(5));
        assert_eq!(poll_backoff(10), Duration::from_secs(10));
        assert_eq!(poll_backoff(20), Duration::from_secs(30));
        assert_eq!(poll_backoff(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let base = Duration::from_secs(10);
        for _ in 0..100 {
            let jittered = with_jitter(base);
            assert!(jittered >= Duration::from_secs(8));
            assert!(jittered <= Duration::from_secs(12));
        }
    }

    #[test]
    fn jitter_leaves_tiny_delays_alone() {
        let base = Duration::from_millis(3);
        assert_eq!(with_jitter(base), base);
    }
}
