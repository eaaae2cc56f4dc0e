//! ---
//! sigtap_section: "02-shared-runtime"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Tick jitter collection for the real-time driver."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

/// Collects absolute tick jitter samples in nanoseconds.
#[derive(Debug, Default)]
pub struct JitterHistogram {
    samples: Mutex<Vec<f64>>,
}

impl JitterHistogram {
    pub fn record(&self, jitter: Duration) {
        let nanos = jitter.as_secs_f64() * 1_000_000_000.0;
        self.samples.lock().push(nanos);
    }

    pub fn summary(&self) -> Option<JitterSummary> {
        let samples = self.samples.lock();
        let slice = samples.as_slice();
        if slice.is_empty() {
            return None;
        }
        let count = slice.len() as f64;
        let mean = slice.iter().sum::<f64>() / count;
        let variance = if slice.len() > 1 {
            let sum_sq = slice
                .iter()
                .map(|value| {
                    let delta = value - mean;
                    delta * delta
                })
                .sum::<f64>();
            sum_sq / (count - 1.0)
        } else {
            0.0
        };
        let max = slice.iter().copied().fold(f64::MIN, f64::max);
        let min = slice.iter().copied().fold(f64::MAX, f64::min);
        Some(JitterSummary {
            mean_ns: mean,
            std_dev_ns: variance.sqrt(),
            max_ns: max,
            min_ns: min,
            samples: slice.len() as u64,
        })
    }

    /// Write the summary as pretty JSON; nothing is written when no samples exist.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(summary) = self.summary() {
            let mut file = File::create(path)?;
            let json = serde_json::to_vec_pretty(&summary).map_err(std::io::Error::other)?;
            file.write_all(&json)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JitterSummary {
    pub mean_ns: f64,
    pub std_dev_ns: f64,
    pub max_ns: f64,
    pub min_ns: f64,
    pub samples: u64,
}

/// Helper for measuring simulation tick intervals against the configured period.
#[derive(Debug)]
pub struct LoopTimingReporter {
    target_interval: Duration,
    last_tick: Mutex<Option<Instant>>,
    histogram: JitterHistogram,
}

impl LoopTimingReporter {
    pub fn new(target_interval: Duration) -> Self {
        Self {
            target_interval,
            last_tick: Mutex::new(None),
            histogram: JitterHistogram::default(),
        }
    }

    pub fn record_tick(&self) {
        self.record_tick_at(Instant::now());
    }

    /// Record a tick observed at `now`; the first tick only primes the reporter.
    pub fn record_tick_at(&self, now: Instant) {
        let mut last_tick = self.last_tick.lock();
        if let Some(previous) = *last_tick {
            let actual = now.saturating_duration_since(previous);
            let jitter = if actual > self.target_interval {
                actual - self.target_interval
            } else {
                self.target_interval - actual
            };
            self.histogram.record(jitter);
        }
        *last_tick = Some(now);
    }

    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }

    pub fn histogram(&self) -> &JitterHistogram {
        &self.histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_only_primes() {
        let reporter = LoopTimingReporter::new(Duration::from_secs(1));
        reporter.record_tick_at(Instant::now());
        assert!(reporter.histogram().summary().is_none());
    }

    #[test]
    fn records_absolute_jitter() {
        let reporter = LoopTimingReporter::new(Duration::from_millis(100));
        let start = Instant::now();
        reporter.record_tick_at(start);
        reporter.record_tick_at(start + Duration::from_millis(110));
        reporter.record_tick_at(start + Duration::from_millis(200));
        let summary = reporter.histogram().summary().unwrap();
        assert_eq!(summary.samples, 2);
        assert!((summary.max_ns - 10_000_000.0).abs() < 1.0);
        assert!((summary.min_ns - 10_000_000.0).abs() < 1.0);
    }

    #[test]
    fn write_json_skips_empty_histogram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jitter.json");
        JitterHistogram::default().write_json(&path).unwrap();
        assert!(!path.exists());
    }
}
