//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Simulation engine owning every profile and driving the per-tick update."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
//! [`SimulationEngine`] owns one [`LiveProfile`] and one [`SimulationState`]
//! per catalog entry. Only the active profile advances on [`SimulationEngine::tick`];
//! the others stay frozen until selected again.

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use signaltap_common::{SimulationConfig, UptimeClock};
use tracing::{debug, info, warn};

use crate::ai::{apply_fault_insight, restore_baseline_insight, AiEstimator};
use crate::alarms::{AlarmSink, DynamicAlarm};
use crate::history::SensorHistory;
use crate::live::LiveProfile;
use crate::ota::OtaStep;
use crate::physics::{model_for, PhysicsContext, PhysicsInput};
use crate::profile::ProfileCatalog;
use crate::rng::SimRng;
use crate::scenario::{ScenarioState, ScenarioTransition};
use crate::smoother::Smoother;
use crate::state::SimulationState;

/// Construction parameters for [`SimulationEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub seed: u64,
    /// Uptime added per tick; also the spacing of alarm timestamps.
    pub tick_period: Duration,
    pub firmware_version: String,
    pub initial_profile: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for EngineOptions {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            seed: config.random_seed,
            tick_period: config.tick_interval,
            firmware_version: config.firmware_version.clone(),
            initial_profile: config.initial_profile,
        }
    }
}

/// What happened during one [`SimulationEngine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub uptime_ms: u64,
    pub transition: Option<ScenarioTransition>,
    pub ota: OtaStep,
    /// Alarms newly written to the registry this tick.
    pub new_alarms: usize,
}

#[derive(Debug, Clone)]
struct ProfileSlot {
    live: LiveProfile,
    sim: SimulationState,
}

#[derive(Debug, Clone)]
pub struct SimulationEngine {
    slots: Vec<ProfileSlot>,
    active: usize,
    rng: SimRng,
    uptime: UptimeClock,
    tick_period: Duration,
    ticks: u64,
    smoother: Smoother,
    estimator: AiEstimator,
}

impl Default for SimulationEngine {
    /// An engine with no profiles; every query returns a neutral value.
    fn default() -> Self {
        Self::with_slots(Vec::new(), &EngineOptions::default())
    }
}

impl SimulationEngine {
    pub fn new(catalog: &ProfileCatalog, options: EngineOptions) -> Self {
        let slots = catalog
            .iter()
            .map(|(id, definition)| ProfileSlot {
                sim: SimulationState::new(definition, &options.firmware_version),
                live: LiveProfile::new(id, definition.clone()),
            })
            .collect();
        let mut engine = Self::with_slots(slots, &options);
        if !engine.set_active_profile(options.initial_profile) && !engine.slots.is_empty() {
            warn!(
                requested = options.initial_profile,
                available = engine.slots.len(),
                "initial profile out of range, using first profile"
            );
        }
        info!(
            profiles = engine.slots.len(),
            seed = options.seed,
            tick_ms = options.tick_period.as_millis() as u64,
            "simulation engine initialised"
        );
        engine
    }

    /// Build from configuration, loading the catalog from `profiles_path` or the built-in set.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let catalog = ProfileCatalog::load(config.profiles_path.as_deref())
            .context("failed to load profile catalog")?;
        ensure!(
            config.initial_profile < catalog.len(),
            "initial_profile {} out of range; catalog has {} profiles",
            config.initial_profile,
            catalog.len()
        );
        Ok(Self::new(&catalog, EngineOptions::from(config)))
    }

    fn with_slots(slots: Vec<ProfileSlot>, options: &EngineOptions) -> Self {
        Self {
            slots,
            active: 0,
            rng: SimRng::seeded(options.seed),
            uptime: UptimeClock::new(),
            tick_period: options.tick_period,
            ticks: 0,
            smoother: Smoother::sensor(),
            estimator: AiEstimator::default(),
        }
    }

    /// Advance the active profile by one tick. Returns `None` when the engine has no profiles.
    pub fn tick(&mut self) -> Option<TickReport> {
        let slot = self.slots.get_mut(self.active)?;
        self.uptime.advance(self.tick_period);
        self.ticks += 1;
        let now_ms = self.uptime.now_ms();
        let rng = &mut self.rng;
        let ProfileSlot { live, sim } = slot;

        let transition = sim.advance_scenario(now_ms);
        if let Some(transition) = &transition {
            info!(
                profile = live.id(),
                from = %transition.from,
                to = %transition.to,
                "scenario transition"
            );
            if transition.completes_cycle() {
                info!(
                    profile = live.id(),
                    cycles = sim.cycle_count(),
                    "scenario cycle completed"
                );
            }
        }

        let input = PhysicsInput::from_clock(&sim.clock);
        let model = model_for(live.kind());
        let mut new_alarms = {
            let mut ctx = PhysicsContext {
                targets: &mut sim.targets,
                alarms: AlarmSink::new(&mut sim.alarms, now_ms),
                rng: &mut *rng,
                kpis: &mut live.kpis,
                outputs: &mut live.outputs,
            };
            model.step(input, &mut ctx);
            ctx.alarms.raised()
        };

        match input.state {
            ScenarioState::Fault => {
                apply_fault_insight(&mut live.ai.insights[0], model.fault_insight());
            }
            ScenarioState::Recovery => {
                restore_baseline_insight(&mut live.ai.insights[0], &live.definition.ai.insights[0]);
            }
            _ => {}
        }

        for (index, spec) in live.definition.sensors.iter().enumerate() {
            let value = self.smoother.step(
                live.sensors[index],
                sim.targets.sensors[index],
                spec.min,
                spec.max,
            );
            live.sensors[index] = value;
            sim.history[index].push(value);
        }

        self.estimator
            .step(&mut live.ai, input.state, &sim.targets, &mut *rng);

        let mut sink = AlarmSink::new(&mut sim.alarms, now_ms);
        let ota = sim.ota.advance(&mut *rng, &mut sink);
        new_alarms += sink.raised();
        match ota {
            OtaStep::Completed => info!(
                profile = live.id(),
                version = sim.ota.target_version(),
                "firmware update completed"
            ),
            OtaStep::Downloading { progress } => {
                debug!(profile = live.id(), progress, "firmware download progress")
            }
            OtaStep::Idle => {}
        }

        Some(TickReport {
            tick: self.ticks,
            uptime_ms: now_ms,
            transition,
            ota,
            new_alarms,
        })
    }

    pub fn scenario(&self) -> ScenarioState {
        self.state()
            .map(SimulationState::scenario_state)
            .unwrap_or_default()
    }

    pub fn scenario_name(&self) -> &'static str {
        self.scenario().label()
    }

    pub fn history(&self, sensor: usize) -> Option<&SensorHistory> {
        self.state().and_then(|state| state.history(sensor))
    }

    pub fn alarm_count(&self) -> usize {
        self.state()
            .map(|state| state.alarms().active_count())
            .unwrap_or(0)
    }

    /// The `index`-th active alarm of the active profile.
    pub fn alarm(&self, index: usize) -> Option<&DynamicAlarm> {
        self.state().and_then(|state| state.alarms().get(index))
    }

    pub fn alarms(&self) -> impl Iterator<Item = &DynamicAlarm> + '_ {
        self.state().into_iter().flat_map(|state| state.alarms().active())
    }

    pub fn ack_alarm(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(self.active) else {
            return false;
        };
        let acked = slot.sim.alarms.acknowledge(index);
        if acked {
            debug!(profile = slot.live.id(), index, "alarm acknowledged");
        }
        acked
    }

    /// Start (or restart) a firmware download on the active profile.
    pub fn start_ota(&mut self) -> bool {
        let now_ms = self.uptime.now_ms();
        let Some(slot) = self.slots.get_mut(self.active) else {
            return false;
        };
        slot.sim
            .ota
            .start(&mut AlarmSink::new(&mut slot.sim.alarms, now_ms));
        info!(
            profile = slot.live.id(),
            version = slot.sim.ota.target_version(),
            "firmware update started"
        );
        true
    }

    pub fn ota_active(&self) -> bool {
        self.state()
            .map(SimulationState::ota_in_progress)
            .unwrap_or(false)
    }

    pub fn ota_progress(&self) -> u8 {
        self.state().map(SimulationState::ota_progress).unwrap_or(0)
    }

    /// Full state of the active profile.
    pub fn state(&self) -> Option<&SimulationState> {
        self.slots.get(self.active).map(|slot| &slot.sim)
    }

    pub fn active_profile(&self) -> Option<&LiveProfile> {
        self.slots.get(self.active).map(|slot| &slot.live)
    }

    pub fn profile(&self, index: usize) -> Option<(&LiveProfile, &SimulationState)> {
        self.slots.get(index).map(|slot| (&slot.live, &slot.sim))
    }

    pub fn set_active_profile(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get(index) else {
            return false;
        };
        if index != self.active {
            info!(
                profile = slot.live.id(),
                index,
                scenario = %slot.sim.scenario_state(),
                "active profile switched"
            );
        }
        self.active = index;
        true
    }

    /// Rotate to the next profile, wrapping around. Returns the new index.
    pub fn next_profile(&mut self) -> usize {
        if !self.slots.is_empty() {
            let next = (self.active + 1) % self.slots.len();
            self.set_active_profile(next);
        }
        self.active
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn profile_count(&self) -> usize {
        self.slots.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn uptime(&self) -> &UptimeClock {
        &self.uptime
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }
}
