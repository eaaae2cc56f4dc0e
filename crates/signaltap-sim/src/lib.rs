//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Scenario simulation engine for industrial equipment monitoring."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
//! Deterministic, tick-driven simulation of four kinds of industrial
//! equipment. Each tick advances a scenario cycle (Normal → Degradation →
//! Warning → Fault → Recovery), runs the equipment physics, smooths readings
//! into a rolling history and maintains a bounded alarm list plus an OTA
//! progress model.

pub mod ai;
pub mod alarms;
pub mod engine;
pub mod error;
pub mod history;
pub mod live;
pub mod ota;
pub mod outputs;
pub mod physics;
pub mod profile;
pub mod rng;
pub mod scenario;
pub mod smoother;
pub mod state;
pub mod trace;

pub use alarms::{AlarmRegistry, AlarmSeverity, DynamicAlarm, MAX_DYNAMIC_ALARMS};
pub use engine::{EngineOptions, SimulationEngine, TickReport};
pub use error::ProfileError;
pub use history::{HistoryRingBuffer, SensorHistory, SENSOR_HISTORY_LEN};
pub use live::LiveProfile;
pub use ota::{OtaSimulator, OtaStep};
pub use outputs::AuxOutputs;
pub use physics::{PhysicsModel, ScenarioTargets};
pub use profile::{AiState, Insight, InsightSeverity, Kpi, ProfileCatalog, ProfileKind};
pub use scenario::{ScenarioState, ScenarioTransition, FULL_CYCLE_TICKS};
pub use state::SimulationState;
pub use trace::TickRecord;
