//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "physics"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Screw air compressor: tank pressure, oil temperature, motor current."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use crate::outputs::CompressorMode;
use crate::profile::ProfileKind;
use crate::scenario::ScenarioState;

use super::{FaultInsight, PhysicsContext, PhysicsInput, PhysicsModel};

const STATE_KPI: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompressorModel;

impl PhysicsModel for CompressorModel {
    fn kind(&self) -> ProfileKind {
        ProfileKind::Compressor
    }

    fn step(&self, input: PhysicsInput, ctx: &mut PhysicsContext<'_>) {
        let p = input.progress;
        let rng = &mut *ctx.rng;

        let mode = match input.state {
            ScenarioState::Normal => {
                ctx.targets.set_sensors([
                    8.0 + rng.noise(0.3),
                    75.0 + rng.noise(2.0),
                    32.0 + rng.noise(1.5),
                ]);
                ctx.targets.set_ai(94.0, 3.0);
                // Unload for two ticks out of every eight.
                let mode = if input.state_timer % 8 < 2 {
                    CompressorMode::Idle
                } else {
                    CompressorMode::Load
                };
                ctx.set_kpi(STATE_KPI, mode.as_str(), Some(true));
                Some(mode)
            }
            ScenarioState::Degradation => {
                ctx.targets.set_sensors([
                    8.0 - p * 1.5 + rng.noise(0.2),
                    75.0 + p * 18.0 + rng.noise(1.5),
                    32.0 + p * 8.0 + rng.noise(1.0),
                ]);
                ctx.targets.set_ai(94.0 - p * 14.0, 3.0 + p * 12.0);
                if p > 0.5 {
                    ctx.alarms.warning("Oil temperature trending above normal");
                }
                if p > 0.7 {
                    ctx.alarms
                        .info("Tank pressure below optimal - check for leaks");
                }
                Some(CompressorMode::Load)
            }
            ScenarioState::Warning => {
                ctx.targets.set_sensors([
                    6.2 - p * 1.2 + rng.noise(0.3),
                    95.0 + p * 15.0 + rng.noise(2.0),
                    42.0 + p * 10.0 + rng.noise(1.5),
                ]);
                ctx.targets.set_ai(80.0 - p * 20.0, 18.0 + p * 25.0);
                ctx.alarms.warning("Oil temp approaching high limit (100C)");
                if p > 0.5 {
                    ctx.alarms.error("Tank pressure critically low");
                }
                ctx.set_kpi(STATE_KPI, CompressorMode::Load.as_str(), None);
                None
            }
            ScenarioState::Fault => {
                ctx.targets.set_sensors([
                    4.5 - p * 2.5 + rng.noise(0.2),
                    112.0 + rng.noise(1.0),
                    5.0 * (1.0 - p) + rng.noise(0.5),
                ]);
                ctx.targets.set_ai(55.0 - p * 25.0, 50.0 + p * 40.0);
                ctx.set_kpi(STATE_KPI, CompressorMode::Fault.as_str(), Some(false));
                ctx.alarms
                    .error("THERMAL SHUTDOWN: Oil temperature exceeded limit");
                Some(CompressorMode::Fault)
            }
            ScenarioState::Recovery => {
                ctx.targets.set_sensors([
                    2.5 + p * 5.5 + rng.noise(0.2),
                    110.0 - p * 35.0 + rng.noise(1.0),
                    5.0 + p * 27.0 + rng.noise(1.0),
                ]);
                ctx.targets.set_ai(35.0 + p * 59.0, 85.0 - p * 82.0);
                let mode = if p > 0.4 {
                    ctx.set_kpi(STATE_KPI, CompressorMode::Load.as_str(), Some(true));
                    CompressorMode::Load
                } else {
                    CompressorMode::Idle
                };
                ctx.alarms
                    .info("Compressor cooling down - restart in progress");
                Some(mode)
            }
        };

        let targets = ctx.targets.sensors;
        if let Some(out) = ctx.outputs.as_compressor_mut() {
            out.pressure = targets[0];
            out.oil_temp = targets[1];
            if let Some(mode) = mode {
                out.mode = mode;
            }
        }
    }

    fn fault_insight(&self) -> FaultInsight {
        FaultInsight {
            title: "Thermal Shutdown",
            description: "Oil overtemperature caused compressor safety shutdown",
            timeframe: "immediate",
        }
    }
}
