//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "physics"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "CNC machining centre: spindle load, coolant flow, spindle speed."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use crate::outputs::StackLight;
use crate::profile::ProfileKind;
use crate::scenario::ScenarioState;

use super::{FaultInsight, PhysicsContext, PhysicsInput, PhysicsModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct CncModel;

impl PhysicsModel for CncModel {
    fn kind(&self) -> ProfileKind {
        ProfileKind::Cnc
    }

    fn step(&self, input: PhysicsInput, ctx: &mut PhysicsContext<'_>) {
        let p = input.progress;
        let rng = &mut *ctx.rng;
        let Some(out) = ctx.outputs.as_cnc_mut() else {
            return;
        };

        match input.state {
            ScenarioState::Normal => {
                ctx.targets.set_sensors([
                    55.0 + rng.noise(3.0),
                    13.0 + rng.noise(0.5),
                    4500.0 + rng.noise(100.0),
                ]);
                ctx.targets.set_ai(90.0, 5.0);
                out.stack_light = StackLight::Green;
                out.leds.run = true;
                out.leds.ready = true;
                out.leds.error = false;
                out.leds.fault = false;
                if rng.chance(8) {
                    out.part_count = out.part_count.saturating_add(1);
                }
            }
            ScenarioState::Degradation => {
                ctx.targets.set_sensors([
                    55.0 + p * 25.0 + rng.noise(2.0),
                    13.0 - p * 4.0 + rng.noise(0.3),
                    4500.0 - p * 500.0 + rng.noise(80.0),
                ]);
                ctx.targets.set_ai(90.0 - p * 15.0, 5.0 + p * 15.0);
                if p > 0.5 {
                    out.stack_light = StackLight::Yellow;
                }
                if p > 0.3 {
                    ctx.alarms.info("Spindle load trending upward");
                }
                if p > 0.7 {
                    ctx.alarms.warning("Coolant flow below optimal range");
                    out.leds.coolant = false;
                }
                if rng.chance(5) {
                    out.part_count = out.part_count.saturating_add(1);
                }
            }
            ScenarioState::Warning => {
                ctx.targets.set_sensors([
                    82.0 + p * 8.0 + rng.noise(2.0),
                    8.5 - p * 2.0 + rng.noise(0.3),
                    3800.0 - p * 400.0 + rng.noise(60.0),
                ]);
                ctx.targets.set_ai(75.0 - p * 15.0, 20.0 + p * 20.0);
                out.stack_light = StackLight::Yellow;
                ctx.alarms.warning("Spindle load above 80% threshold");
                if p > 0.6 {
                    ctx.alarms.error("Coolant level critically low");
                }
                out.leds.coolant = false;
                if rng.chance(3) {
                    out.part_count = out.part_count.saturating_add(1);
                }
            }
            ScenarioState::Fault => {
                ctx.targets.set_sensors([
                    95.0 + rng.noise(3.0),
                    4.0 + rng.noise(0.5),
                    1000.0 * (1.0 - p) + rng.noise(50.0),
                ]);
                ctx.targets.set_ai(55.0 - p * 15.0, 65.0 + p * 25.0);
                out.stack_light = StackLight::Red;
                out.leds.error = true;
                out.leds.fault = true;
                out.leds.run = false;
                out.leds.spindle = false;
                ctx.alarms.error("FAULT: Spindle overload protection tripped");
            }
            ScenarioState::Recovery => {
                ctx.targets.set_sensors([
                    90.0 - p * 35.0 + rng.noise(2.0),
                    5.0 + p * 8.0 + rng.noise(0.3),
                    500.0 + p * 4000.0 + rng.noise(100.0),
                ]);
                ctx.targets.set_ai(45.0 + p * 45.0, 80.0 - p * 75.0);
                out.stack_light = if p < 0.3 {
                    StackLight::Yellow
                } else {
                    StackLight::Green
                };
                if p > 0.5 {
                    out.leds.run = true;
                    out.leds.spindle = true;
                    out.leds.coolant = true;
                    out.leds.error = false;
                    out.leds.fault = false;
                }
                ctx.alarms.info("System recovery in progress");
            }
        }
    }

    fn fault_insight(&self) -> FaultInsight {
        FaultInsight {
            title: "Spindle Bearing Overload",
            description: "Bearing overload detected - immediate inspection required",
            timeframe: "immediate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::harness::ModelHarness;
    use super::*;

    #[test]
    fn fault_trips_stack_light_and_leds() {
        let mut harness = ModelHarness::for_kind(ProfileKind::Cnc);
        harness.step(ScenarioState::Fault, 0.5, 6);
        let out = harness.outputs.as_cnc().expect("cnc outputs");
        assert_eq!(out.stack_light, StackLight::Red);
        assert!(out.leds.error && out.leds.fault);
        assert!(!out.leds.run && !out.leds.spindle);
        assert!(harness.has_alarm("FAULT: Spindle overload protection tripped"));
        let speed = harness.targets.sensors[2];
        assert!((450.0..=550.0).contains(&speed));
    }

    #[test]
    fn degradation_alarms_follow_progress() {
        let mut harness = ModelHarness::for_kind(ProfileKind::Cnc);
        harness.step(ScenarioState::Degradation, 0.2, 4);
        assert_eq!(harness.alarms.active_count(), 0);

        harness.step(ScenarioState::Degradation, 0.4, 8);
        assert!(harness.has_alarm("Spindle load trending upward"));
        assert!(!harness.has_alarm("Coolant flow below optimal range"));

        harness.step(ScenarioState::Degradation, 0.75, 15);
        assert!(harness.has_alarm("Coolant flow below optimal range"));
        let out = harness.outputs.as_cnc().expect("cnc outputs");
        assert!(!out.leds.coolant);
        assert_eq!(out.stack_light, StackLight::Yellow);
        assert!((harness.targets.health - (90.0 - 0.75 * 15.0)).abs() < 1e-4);
    }

    #[test]
    fn warning_always_flags_spindle_threshold() {
        let mut harness = ModelHarness::for_kind(ProfileKind::Cnc);
        harness.step(ScenarioState::Warning, 0.0, 0);
        assert!(harness.has_alarm("Spindle load above 80% threshold"));
        assert!(!harness.has_alarm("Coolant level critically low"));
        harness.step(ScenarioState::Warning, 0.8, 12);
        assert!(harness.has_alarm("Coolant level critically low"));
    }

    #[test]
    fn recovery_restores_run_leds_late_in_dwell() {
        let mut harness = ModelHarness::for_kind(ProfileKind::Cnc);
        harness.step(ScenarioState::Fault, 0.9, 11);
        harness.step(ScenarioState::Recovery, 0.1, 1);
        let out = harness.outputs.as_cnc().expect("cnc outputs");
        assert_eq!(out.stack_light, StackLight::Yellow);
        assert!(out.leds.fault);

        harness.step(ScenarioState::Recovery, 0.6, 6);
        let out = harness.outputs.as_cnc().expect("cnc outputs");
        assert_eq!(out.stack_light, StackLight::Green);
        assert!(out.leds.run && out.leds.spindle && !out.leds.fault);
        assert!(harness.has_alarm("System recovery in progress"));
    }

    #[test]
    fn part_count_never_decreases() {
        let mut harness = ModelHarness::for_kind(ProfileKind::Cnc);
        let start = harness.outputs.as_cnc().map(|o| o.part_count).unwrap_or(0);
        for timer in 0..200 {
            harness.step(ScenarioState::Normal, 0.0, timer);
        }
        let end = harness.outputs.as_cnc().map(|o| o.part_count).unwrap_or(0);
        assert!(end >= start);
        assert!(end > start, "8% chance over 200 ticks should add parts");
    }
}
