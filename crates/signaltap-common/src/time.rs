//! ---
//! sigtap_section: "02-shared-runtime"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Deterministic uptime clock and HH:MM:SS formatting."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::time::Duration;

use chrono::NaiveTime;

const SECONDS_PER_DAY: u64 = 86_400;

/// Monotonic uptime counter advanced explicitly by the tick driver.
///
/// The engine never reads the wall clock, so two runs with the same seed and the
/// same tick period stamp alarms identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UptimeClock {
    elapsed_ms: u64,
}

impl UptimeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, period: Duration) {
        let step = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms = self.elapsed_ms.saturating_add(step);
    }

    /// Milliseconds since the clock was created.
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Uptime rendered as a 24h `HH:MM:SS` label.
    pub fn hms(&self) -> String {
        format_uptime_hms(self.elapsed_ms)
    }
}

/// Format an uptime in milliseconds as `HH:MM:SS`, wrapping every 24 hours.
pub fn format_uptime_hms(uptime_ms: u64) -> String {
    let seconds = (uptime_ms / 1000) % SECONDS_PER_DAY;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "00:00:00".to_owned())
}

/// Signed difference between an observed and an expected interval in microseconds.
pub fn jitter_us(actual: Duration, expected: Duration) -> i64 {
    let actual_us = actual.as_secs_f64() * 1_000_000.0;
    let expected_us = expected.as_secs_f64() * 1_000_000.0;
    (actual_us - expected_us).round() as i64
}
