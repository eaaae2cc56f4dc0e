//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Simulated firmware download with progress and completion alarm."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use serde::Serialize;

use crate::alarms::AlarmSink;
use crate::rng::SimRng;

/// Progress reported by one call to [`OtaSimulator::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaStep {
    Idle,
    Downloading { progress: u8 },
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtaSimulator {
    in_progress: bool,
    progress: u8,
    target_version: String,
}

impl OtaSimulator {
    pub fn new(target_version: impl Into<String>) -> Self {
        Self {
            in_progress: false,
            progress: 0,
            target_version: target_version.into(),
        }
    }

    /// Begin (or restart) a download from 0%.
    pub fn start(&mut self, alarms: &mut AlarmSink<'_>) {
        self.in_progress = true;
        self.progress = 0;
        let message = format!(
            "Firmware update started - downloading v{}",
            self.target_version
        );
        alarms.info(&message);
    }

    pub fn advance(&mut self, rng: &mut SimRng, alarms: &mut AlarmSink<'_>) -> OtaStep {
        if !self.in_progress {
            return OtaStep::Idle;
        }
        let step = 2 + rng.between(0, 2) as u8;
        self.progress = self.progress.saturating_add(step);
        if self.progress < 100 {
            return OtaStep::Downloading {
                progress: self.progress,
            };
        }
        self.progress = 100;
        self.in_progress = false;
        let message = format!(
            "Firmware update completed successfully (v{})",
            self.target_version
        );
        alarms.info(&message);
        OtaStep::Completed
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::AlarmRegistry;

    #[test]
    fn start_raises_info_and_resets_progress() {
        let mut registry = AlarmRegistry::new();
        let mut ota = OtaSimulator::new("1.1.0");
        ota.start(&mut AlarmSink::new(&mut registry, 0));
        assert!(ota.in_progress());
        assert_eq!(ota.progress(), 0);
        assert!(registry.is_active("Firmware update started - downloading v1.1.0"));
    }

    #[test]
    fn download_completes_once_between_25_and_50_ticks() {
        let mut registry = AlarmRegistry::new();
        let mut rng = SimRng::seeded(77);
        let mut ota = OtaSimulator::new("1.1.0");
        ota.start(&mut AlarmSink::new(&mut registry, 0));

        let mut last = 0;
        let mut ticks = 0;
        let mut completions = 0;
        for tick in 1..=60u64 {
            let mut sink = AlarmSink::new(&mut registry, tick * 1000);
            match ota.advance(&mut rng, &mut sink) {
                OtaStep::Downloading { progress } => {
                    let delta = progress - last;
                    assert!((2..=4).contains(&delta));
                    last = progress;
                    ticks += 1;
                }
                OtaStep::Completed => {
                    completions += 1;
                    ticks += 1;
                }
                OtaStep::Idle => {}
            }
        }
        assert_eq!(completions, 1);
        assert!((25..=50).contains(&ticks));
        assert_eq!(ota.progress(), 100);
        assert!(!ota.in_progress());
        assert!(registry.is_active("Firmware update completed successfully (v1.1.0)"));
    }

    #[test]
    fn restart_during_download_goes_back_to_zero() {
        let mut registry = AlarmRegistry::new();
        let mut rng = SimRng::seeded(3);
        let mut ota = OtaSimulator::new("2.0.0");
        ota.start(&mut AlarmSink::new(&mut registry, 0));
        for _ in 0..5 {
            ota.advance(&mut rng, &mut AlarmSink::new(&mut registry, 0));
        }
        assert!(ota.progress() >= 10);
        ota.start(&mut AlarmSink::new(&mut registry, 0));
        assert_eq!(ota.progress(), 0);
        assert!(ota.in_progress());
    }

    #[test]
    fn idle_simulator_never_moves() {
        let mut registry = AlarmRegistry::new();
        let mut rng = SimRng::seeded(3);
        let mut ota = OtaSimulator::new("1.1.0");
        let step = ota.advance(&mut rng, &mut AlarmSink::new(&mut registry, 0));
        assert_eq!(step, OtaStep::Idle);
        assert_eq!(ota.progress(), 0);
        assert_eq!(registry.active_count(), 0);
    }
}
