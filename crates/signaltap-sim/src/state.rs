//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Per-profile simulation state: scenario clock, targets, history, alarms, OTA."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use crate::alarms::AlarmRegistry;
use crate::history::SensorHistory;
use crate::ota::OtaSimulator;
use crate::physics::ScenarioTargets;
use crate::profile::{ProfileDefinition, SENSOR_COUNT};
use crate::scenario::{ScenarioClock, ScenarioState, ScenarioTransition};

/// Everything the engine tracks for one profile besides its live readings.
///
/// Each profile keeps its own state, so switching away and back resumes the
/// scenario where it left off.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub(crate) clock: ScenarioClock,
    pub(crate) targets: ScenarioTargets,
    pub(crate) history: [SensorHistory; SENSOR_COUNT],
    pub(crate) alarms: AlarmRegistry,
    pub(crate) ota: OtaSimulator,
}

impl SimulationState {
    /// Fresh state in Normal with targets seeded from the profile baseline.
    pub fn new(definition: &ProfileDefinition, firmware_version: &str) -> Self {
        let targets = ScenarioTargets {
            sensors: [
                definition.sensors[0].value,
                definition.sensors[1].value,
                definition.sensors[2].value,
            ],
            health: definition.ai.health_score,
            failure: definition.ai.failure_probability,
        };
        Self {
            clock: ScenarioClock::new(),
            targets,
            history: Default::default(),
            alarms: AlarmRegistry::new(),
            ota: OtaSimulator::new(firmware_version),
        }
    }

    /// Advance the scenario clock by one tick. Entering Recovery drops every
    /// unacknowledged error alarm.
    pub(crate) fn advance_scenario(&mut self, now_ms: u64) -> Option<ScenarioTransition> {
        let transition = self.clock.advance(now_ms)?;
        if transition.to == ScenarioState::Recovery {
            self.alarms.clear_unacked_errors();
        }
        Some(transition)
    }

    pub fn scenario_state(&self) -> ScenarioState {
        self.clock.state()
    }

    pub fn state_timer(&self) -> u32 {
        self.clock.state_timer()
    }

    pub fn state_entered_at_ms(&self) -> u64 {
        self.clock.entered_at_ms()
    }

    pub fn cycle_count(&self) -> u32 {
        self.clock.cycle_count()
    }

    pub fn clock(&self) -> &ScenarioClock {
        &self.clock
    }

    pub fn targets(&self) -> &ScenarioTargets {
        &self.targets
    }

    pub fn sensor_targets(&self) -> [f32; SENSOR_COUNT] {
        self.targets.sensors
    }

    pub fn target_health_score(&self) -> f32 {
        self.targets.health
    }

    pub fn target_failure_prob(&self) -> f32 {
        self.targets.failure
    }

    pub fn history(&self, index: usize) -> Option<&SensorHistory> {
        self.history.get(index)
    }

    pub fn alarms(&self) -> &AlarmRegistry {
        &self.alarms
    }

    /// Highest alarm slot ever used, plus one.
    pub fn dynamic_alarm_count(&self) -> usize {
        self.alarms.high_water_mark()
    }

    pub fn ota(&self) -> &OtaSimulator {
        &self.ota
    }

    pub fn ota_in_progress(&self) -> bool {
        self.ota.in_progress()
    }

    pub fn ota_progress(&self) -> u8 {
        self.ota.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::AlarmSeverity;
    use crate::profile::ProfileCatalog;

    fn cnc_state() -> SimulationState {
        let catalog = ProfileCatalog::builtin().expect("builtin catalog");
        let (_, definition) = catalog.get(0).expect("cnc");
        SimulationState::new(definition, "1.1.0")
    }

    #[test]
    fn seeded_from_baseline() {
        let state = cnc_state();
        assert_eq!(state.scenario_state(), ScenarioState::Normal);
        assert_eq!(state.sensor_targets(), [67.2, 12.5, 4200.0]);
        assert_eq!(state.target_health_score(), 87.0);
        assert!(state.history(0).is_some_and(|h| h.is_empty()));
        assert!(state.history(3).is_none());
        assert_eq!(state.dynamic_alarm_count(), 0);
        assert!(!state.ota_in_progress());
    }

    #[test]
    fn entering_recovery_clears_unacked_errors_only() {
        let mut state = cnc_state();
        state.alarms.raise(AlarmSeverity::Error, "unacked error", 0);
        state.alarms.raise(AlarmSeverity::Error, "acked error", 0);
        state.alarms.raise(AlarmSeverity::Warning, "warning", 0);
        assert!(state.alarms.acknowledge(1));

        let mut now = 0;
        while state.scenario_state() != ScenarioState::Fault {
            now += 1_000;
            state.advance_scenario(now);
        }
        assert_eq!(state.alarms().active_count(), 3);

        let mut entered = None;
        while entered.is_none() {
            now += 1_000;
            entered = state
                .advance_scenario(now)
                .filter(|t| t.to == ScenarioState::Recovery);
        }
        assert_eq!(state.alarms().active_count(), 2);
        assert!(!state.alarms().is_active("unacked error"));
        assert!(state.alarms().is_active("acked error"));
        assert!(state.alarms().is_active("warning"));
        assert_eq!(state.state_entered_at_ms(), now);
    }
}
