//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "physics"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "PLC-controlled process chamber with discrete and analog I/O."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use crate::profile::ProfileKind;
use crate::scenario::ScenarioState;

use super::{FaultInsight, PhysicsContext, PhysicsInput, PhysicsModel};

const MODE_KPI: usize = 3;

/// Analog output percentage; fractional parts are dropped, not rounded.
fn percent(value: f32) -> u8 {
    value.trunc().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlcModel;

impl PhysicsModel for PlcModel {
    fn kind(&self) -> ProfileKind {
        ProfileKind::Plc
    }

    fn step(&self, input: PhysicsInput, ctx: &mut PhysicsContext<'_>) {
        let p = input.progress;
        let rng = &mut *ctx.rng;

        match input.state {
            ScenarioState::Normal => {
                ctx.targets.set_sensors([
                    85.0 + rng.noise(1.5),
                    500.0 + rng.noise(15.0),
                    5.0 + rng.noise(0.2),
                ]);
                ctx.targets.set_ai(92.0, 4.0);
                let jitter = rng.noise(3.0).trunc();
                if let Some(io) = ctx.outputs.as_plc_mut() {
                    // Load/unload handshake toggles every three ticks.
                    let phase = input.state_timer % 6 < 3;
                    io.di[0] = phase;
                    io.di[1] = !phase;
                    io.di[2] = phase;
                    io.dq[0] = phase;
                    io.dq[3] = phase;
                    io.aq0 = percent(65.0 + jitter);
                }
                ctx.set_kpi(MODE_KPI, "AUTO", Some(true));
            }
            ScenarioState::Degradation => {
                ctx.targets.set_sensors([
                    85.0 + p * 30.0 + rng.noise(2.0),
                    500.0 + p * 150.0 + rng.noise(10.0),
                    5.0 - p * 0.8 + rng.noise(0.15),
                ]);
                ctx.targets.set_ai(92.0 - p * 15.0, 4.0 + p * 12.0);
                if let Some(io) = ctx.outputs.as_plc_mut() {
                    io.aq0 = percent(65.0 + p * 20.0);
                    if p > 0.5 {
                        io.di[5] = true;
                    }
                }
                if p > 0.5 {
                    ctx.alarms
                        .warning("Chamber temperature drifting above setpoint");
                }
            }
            ScenarioState::Warning => {
                ctx.targets.set_sensors([
                    120.0 + p * 40.0 + rng.noise(3.0),
                    660.0 + p * 200.0 + rng.noise(20.0),
                    4.0 - p + rng.noise(0.2),
                ]);
                ctx.targets.set_ai(75.0 - p * 15.0, 18.0 + p * 25.0);
                if let Some(io) = ctx.outputs.as_plc_mut() {
                    io.aq0 = percent((90.0 + p * 10.0).min(100.0));
                    io.di[5] = true;
                    io.di[6] = true;
                }
                ctx.alarms.warning("Chamber temp approaching safety limit");
                if p > 0.7 {
                    ctx.alarms
                        .error("Pressure spike detected - process deviation");
                }
            }
            ScenarioState::Fault => {
                ctx.targets.set_sensors([
                    165.0 + rng.noise(2.0),
                    850.0 + rng.noise(30.0),
                    2.0 + rng.noise(0.3),
                ]);
                ctx.targets.set_ai(50.0 - p * 20.0, 55.0 + p * 35.0);
                if let Some(io) = ctx.outputs.as_plc_mut() {
                    io.dq = [false; 8];
                    io.di[6] = true;
                    io.di[7] = true;
                    io.aq0 = 0;
                }
                ctx.set_kpi(MODE_KPI, "STOP", Some(false));
                ctx.alarms.error("SAFETY SHUTDOWN: Chamber overtemperature");
            }
            ScenarioState::Recovery => {
                ctx.targets.set_sensors([
                    160.0 - p * 75.0 + rng.noise(2.0),
                    850.0 - p * 350.0 + rng.noise(15.0),
                    2.5 + p * 2.5 + rng.noise(0.15),
                ]);
                ctx.targets.set_ai(35.0 + p * 57.0, 80.0 - p * 76.0);
                if let Some(io) = ctx.outputs.as_plc_mut() {
                    if p > 0.4 {
                        io.dq[0] = true;
                        io.dq[3] = true;
                        io.di[6] = false;
                        io.di[7] = false;
                        io.aq0 = percent(p * 65.0);
                    }
                    if p > 0.7 {
                        io.di[5] = false;
                    }
                }
                if p > 0.7 {
                    ctx.set_kpi(MODE_KPI, "AUTO", Some(true));
                }
                ctx.alarms.info("Process restarting - chamber cooling");
            }
        }
    }

    fn fault_insight(&self) -> FaultInsight {
        FaultInsight {
            title: "Process Safety Shutdown",
            description: "Chamber overtemperature triggered emergency stop",
            timeframe: "immediate",
        }
    }
}
