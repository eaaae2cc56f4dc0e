//! ---
//! sigtap_section: "03-tick-scheduling"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Runtime helpers supporting the tick driver."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

/// Async rate limiter yielding once per simulation period.
///
/// Missed ticks are delayed rather than bursted so a stalled host never advances
/// the scenario clock several seconds at once.
#[derive(Debug)]
pub struct RateLimiter {
    period: Duration,
    interval: tokio::time::Interval,
}

impl RateLimiter {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { period, interval }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_are_spaced_by_period() {
        let mut limiter = RateLimiter::new(Duration::from_millis(100));
        let first = limiter.tick().await;
        let second = limiter.tick().await;
        let third = limiter.tick().await;
        assert_eq!(second - first, Duration::from_millis(100));
        assert_eq!(third - second, Duration::from_millis(100));
        assert_eq!(limiter.period(), Duration::from_millis(100));
    }
}
