//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Per-equipment physics models producing scenario targets."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
//! Each equipment kind has one [`PhysicsModel`]. A model never touches live
//! sensor values directly: it writes targets, raises alarms, and updates the
//! KPI tiles and auxiliary outputs. Smoothing toward the targets happens
//! afterwards in the engine.

use serde::Serialize;

use crate::alarms::AlarmSink;
use crate::outputs::AuxOutputs;
use crate::profile::{Kpi, ProfileKind, KPI_COUNT, SENSOR_COUNT};
use crate::rng::SimRng;
use crate::scenario::{ScenarioClock, ScenarioState};

mod chiller;
mod cnc;
mod compressor;
mod plc;

pub use chiller::ChillerModel;
pub use cnc::CncModel;
pub use compressor::CompressorModel;
pub use plc::PlcModel;

/// Values the live readings are smoothed toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct ScenarioTargets {
    pub sensors: [f32; SENSOR_COUNT],
    pub health: f32,
    pub failure: f32,
}

impl ScenarioTargets {
    pub fn set_sensors(&mut self, values: [f32; SENSOR_COUNT]) {
        self.sensors = values;
    }

    pub fn set_ai(&mut self, health: f32, failure: f32) {
        self.health = health;
        self.failure = failure;
    }
}

/// Scenario position handed to a model for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsInput {
    pub state: ScenarioState,
    /// `state_timer / dwell`, in `[0, 1)`.
    pub progress: f32,
    pub state_timer: u32,
}

impl PhysicsInput {
    pub fn from_clock(clock: &ScenarioClock) -> Self {
        Self {
            state: clock.state(),
            progress: clock.progress(),
            state_timer: clock.state_timer(),
        }
    }
}

/// Mutable view over everything a model may change during one tick.
///
/// Fields are disjoint borrows so a model can hold its outputs while raising
/// alarms or drawing noise.
#[derive(Debug)]
pub struct PhysicsContext<'a> {
    pub targets: &'a mut ScenarioTargets,
    pub alarms: AlarmSink<'a>,
    pub rng: &'a mut SimRng,
    pub kpis: &'a mut [Kpi; KPI_COUNT],
    pub outputs: &'a mut AuxOutputs,
}

impl PhysicsContext<'_> {
    /// Overwrite KPI tile `index`, optionally changing its good/bad flag.
    pub fn set_kpi(&mut self, index: usize, value: &str, good: Option<bool>) {
        if let Some(kpi) = self.kpis.get_mut(index) {
            if kpi.value != value {
                kpi.value = value.to_string();
            }
            if let Some(good) = good {
                kpi.good = good;
            }
        }
    }
}

/// Insight text substituted into slot 0 while the equipment is faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultInsight {
    pub title: &'static str,
    pub description: &'static str,
    pub timeframe: &'static str,
}

pub trait PhysicsModel: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ProfileKind;

    /// Compute targets and side effects for the current scenario position.
    fn step(&self, input: PhysicsInput, ctx: &mut PhysicsContext<'_>);

    fn fault_insight(&self) -> FaultInsight;
}

/// The physics model driving profiles of `kind`.
pub fn model_for(kind: ProfileKind) -> &'static dyn PhysicsModel {
    match kind {
        ProfileKind::Cnc => &CncModel,
        ProfileKind::Chiller => &ChillerModel,
        ProfileKind::Compressor => &CompressorModel,
        ProfileKind::Plc => &PlcModel,
    }
}
