//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "physics"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Cold storage chiller: compressor power, supply and return temperature."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use crate::outputs::ChillerOutputs;
use crate::profile::ProfileKind;
use crate::scenario::ScenarioState;

use super::{FaultInsight, PhysicsContext, PhysicsInput, PhysicsModel};

const COEFFICIENT_KPI: usize = 0;
const STATUS_KPI: usize = 3;
const TRIP_CODE: &str = "E07";

#[derive(Debug, Clone, Copy, Default)]
pub struct ChillerModel;

impl PhysicsModel for ChillerModel {
    fn kind(&self) -> ProfileKind {
        ProfileKind::Chiller
    }

    fn step(&self, input: PhysicsInput, ctx: &mut PhysicsContext<'_>) {
        let p = input.progress;
        let rng = &mut *ctx.rng;

        match input.state {
            ScenarioState::Normal => {
                ctx.targets.set_sensors([
                    26.0 + rng.noise(1.0),
                    2.0 + rng.noise(0.3),
                    7.5 + rng.noise(0.3),
                ]);
                ctx.targets.set_ai(88.0, 5.0);
                set_error_code(ctx, ChillerOutputs::NO_ERROR);
                ctx.set_kpi(COEFFICIENT_KPI, "5.5", None);
                ctx.set_kpi(STATUS_KPI, "OK", Some(true));
            }
            ScenarioState::Degradation => {
                ctx.targets.set_sensors([
                    26.0 + p * 10.0 + rng.noise(0.8),
                    2.0 + p * 3.0 + rng.noise(0.2),
                    7.5 + p * 2.0 + rng.noise(0.2),
                ]);
                ctx.targets.set_ai(88.0 - p * 18.0, 5.0 + p * 18.0);
                if p > 0.4 {
                    ctx.alarms
                        .warning("Supply temperature rising above setpoint");
                    ctx.set_kpi(COEFFICIENT_KPI, "4.0", None);
                }
                if p > 0.7 {
                    ctx.alarms.warning("Compressor power consumption elevated");
                }
            }
            ScenarioState::Warning => {
                ctx.targets.set_sensors([
                    38.0 + p * 8.0 + rng.noise(1.5),
                    5.5 + p * 3.0 + rng.noise(0.4),
                    10.0 + p * 3.0 + rng.noise(0.3),
                ]);
                ctx.targets.set_ai(70.0 - p * 15.0, 25.0 + p * 20.0);
                ctx.alarms.warning("High discharge pressure detected");
                ctx.set_kpi(COEFFICIENT_KPI, "3.0", None);
                ctx.set_kpi(STATUS_KPI, "WARN", Some(false));
                if p > 0.5 {
                    set_error_code(ctx, TRIP_CODE);
                }
            }
            ScenarioState::Fault => {
                ctx.targets.set_sensors([
                    8.0 + rng.noise(2.0),
                    9.0 + p * 6.0 + rng.noise(0.5),
                    14.0 + p * 5.0 + rng.noise(0.4),
                ]);
                ctx.targets.set_ai(50.0 - p * 20.0, 55.0 + p * 35.0);
                set_error_code(ctx, TRIP_CODE);
                ctx.set_kpi(STATUS_KPI, "FAULT", Some(false));
                ctx.alarms
                    .error("E07: High discharge pressure - compressor tripped");
            }
            ScenarioState::Recovery => {
                ctx.targets.set_sensors([
                    12.0 + p * 16.0 + rng.noise(1.0),
                    14.0 - p * 12.0 + rng.noise(0.3),
                    18.0 - p * 10.5 + rng.noise(0.3),
                ]);
                ctx.targets.set_ai(35.0 + p * 53.0, 80.0 - p * 75.0);
                if p > 0.3 {
                    set_error_code(ctx, ChillerOutputs::NO_ERROR);
                }
                if p > 0.6 {
                    ctx.set_kpi(STATUS_KPI, "OK", Some(true));
                    ctx.set_kpi(COEFFICIENT_KPI, "5.0", None);
                }
                ctx.alarms.info("Chiller recovery - compressor restarting");
            }
        }
    }

    fn fault_insight(&self) -> FaultInsight {
        FaultInsight {
            title: "Compressor Trip",
            description: "High discharge pressure caused safety cutout",
            timeframe: "immediate",
        }
    }
}

fn set_error_code(ctx: &mut PhysicsContext<'_>, code: &str) {
    if let Some(out) = ctx.outputs.as_chiller_mut() {
        if out.error_code != code {
            out.error_code = code.to_string();
        }
    }
}
