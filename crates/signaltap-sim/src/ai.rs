//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Scenario-coupled predictive maintenance estimates."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use crate::physics::{FaultInsight, ScenarioTargets};
use crate::profile::{AiState, Insight, InsightSeverity};
use crate::rng::SimRng;
use crate::scenario::ScenarioState;
use crate::smoother::Smoother;

const MIN_CONFIDENCE: u32 = 40;
const MAX_CONFIDENCE: u32 = 99;

/// Smooths health and failure estimates and derives anomaly and confidence
/// figures from the scenario state.
#[derive(Debug, Clone, Copy)]
pub struct AiEstimator {
    health: Smoother,
    failure: Smoother,
}

impl Default for AiEstimator {
    fn default() -> Self {
        Self {
            health: Smoother::health(),
            failure: Smoother::failure(),
        }
    }
}

impl AiEstimator {
    pub fn anomaly_count(state: ScenarioState, rng: &mut SimRng) -> u8 {
        match state {
            ScenarioState::Normal => 0,
            ScenarioState::Degradation => 1,
            ScenarioState::Warning => 2,
            ScenarioState::Fault => 3 + rng.between(0, 1) as u8,
            ScenarioState::Recovery => 1,
        }
    }

    pub fn insight_confidence(state: ScenarioState, rng: &mut SimRng) -> u8 {
        let base = match state {
            ScenarioState::Fault => 88 + rng.between(0, 9),
            ScenarioState::Warning => 75 + rng.between(0, 14),
            _ => 55 + rng.between(0, 24),
        };
        base.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8
    }

    /// Per-tick increment of the model's data-point counter.
    pub fn data_point_increment(rng: &mut SimRng) -> u64 {
        u64::from(rng.between(10, 39))
    }

    pub fn step(
        &self,
        ai: &mut AiState,
        state: ScenarioState,
        targets: &ScenarioTargets,
        rng: &mut SimRng,
    ) {
        ai.health_score = self.health.step(ai.health_score, targets.health, 0.0, 100.0);
        ai.failure_probability =
            self.failure
                .step(ai.failure_probability, targets.failure, 0.0, 100.0);
        ai.anomaly_count = Self::anomaly_count(state, rng);
        ai.data_points = ai
            .data_points
            .saturating_add(Self::data_point_increment(rng));
        for insight in ai.insights.iter_mut() {
            insight.confidence = Self::insight_confidence(state, rng);
        }
    }
}

/// Replace the headline insight with the equipment's fault explanation.
pub fn apply_fault_insight(insight: &mut Insight, fault: FaultInsight) {
    insight.title = fault.title.to_string();
    insight.description = fault.description.to_string();
    insight.timeframe = fault.timeframe.to_string();
    insight.severity = InsightSeverity::Critical;
}

/// Restore the headline insight text from the profile baseline while recovering.
pub fn restore_baseline_insight(insight: &mut Insight, baseline: &Insight) {
    insight.title.clone_from(&baseline.title);
    insight.description.clone_from(&baseline.description);
    insight.timeframe.clone_from(&baseline.timeframe);
    insight.severity = InsightSeverity::Warning;
}
