//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Flat per-tick record of the active profile for CSV and JSON export."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::engine::{SimulationEngine, TickReport};

/// One row of a simulation trace. Fields are flat so the record maps onto a CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub uptime_ms: u64,
    pub profile: String,
    pub scenario: String,
    pub state_timer: u32,
    pub cycle: u32,
    pub sensor_1: f32,
    pub sensor_2: f32,
    pub sensor_3: f32,
    pub health_score: f32,
    pub failure_probability: f32,
    pub anomaly_count: u8,
    pub alarm_count: usize,
    pub new_alarms: usize,
    pub ota_progress: u8,
    pub ota_active: bool,
}

impl TickRecord {
    /// Snapshot the active profile right after `report` was produced.
    pub fn capture(engine: &SimulationEngine, report: &TickReport) -> Option<Self> {
        let profile = engine.active_profile()?;
        let state = engine.state()?;
        let [sensor_1, sensor_2, sensor_3] = profile.sensor_values();
        Some(Self {
            tick: report.tick,
            uptime_ms: report.uptime_ms,
            profile: profile.id().to_string(),
            scenario: state.scenario_state().as_str().to_string(),
            state_timer: state.state_timer(),
            cycle: state.cycle_count(),
            sensor_1,
            sensor_2,
            sensor_3,
            health_score: profile.ai().health_score,
            failure_probability: profile.ai().failure_probability,
            anomaly_count: profile.ai().anomaly_count,
            alarm_count: state.alarms().active_count(),
            new_alarms: report.new_alarms,
            ota_progress: state.ota_progress(),
            ota_active: state.ota_in_progress(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOptions;
    use crate::profile::ProfileCatalog;

    #[test]
    fn capture_reflects_engine_after_tick() -> anyhow::Result<()> {
        let catalog = ProfileCatalog::builtin()?;
        let mut engine = SimulationEngine::new(&catalog, EngineOptions::default());
        let report = engine.tick().expect("profiles loaded");
        let record = TickRecord::capture(&engine, &report).expect("active profile");
        assert_eq!(record.tick, 1);
        assert_eq!(record.profile, "cnc");
        assert_eq!(record.scenario, "normal");
        assert_eq!(record.state_timer, 1);
        assert_eq!(record.anomaly_count, 0);
        let json = serde_json::to_value(&record)?;
        assert_eq!(json["profile"], "cnc");
        Ok(())
    }
}
