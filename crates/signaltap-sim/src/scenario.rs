//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Scenario state cycle and dwell-time clock."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating phase of a simulated piece of equipment.
///
/// The phases form a fixed cycle: Normal → Degradation → Warning → Fault →
/// Recovery → Normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioState {
    /// Healthy, stable operation.
    #[default]
    Normal,
    /// Gradual drift and early warning signs.
    Degradation,
    /// Thresholds approached or crossed.
    Warning,
    /// Active fault condition.
    Fault,
    /// Returning to normal after a fault.
    Recovery,
}

impl ScenarioState {
    /// Ticks spent in this state before the clock moves on.
    pub const fn dwell_ticks(self) -> u32 {
        match self {
            ScenarioState::Normal => 45,
            ScenarioState::Degradation => 20,
            ScenarioState::Warning => 15,
            ScenarioState::Fault => 12,
            ScenarioState::Recovery => 10,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            ScenarioState::Normal => ScenarioState::Degradation,
            ScenarioState::Degradation => ScenarioState::Warning,
            ScenarioState::Warning => ScenarioState::Fault,
            ScenarioState::Fault => ScenarioState::Recovery,
            ScenarioState::Recovery => ScenarioState::Normal,
        }
    }

    /// Badge label shown on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            ScenarioState::Normal => "Normal",
            ScenarioState::Degradation => "Degrading",
            ScenarioState::Warning => "Warning",
            ScenarioState::Fault => "FAULT",
            ScenarioState::Recovery => "Recovering",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioState::Normal => "normal",
            ScenarioState::Degradation => "degradation",
            ScenarioState::Warning => "warning",
            ScenarioState::Fault => "fault",
            ScenarioState::Recovery => "recovery",
        }
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticks needed to walk the whole cycle once.
pub const FULL_CYCLE_TICKS: u32 = ScenarioState::Normal.dwell_ticks()
    + ScenarioState::Degradation.dwell_ticks()
    + ScenarioState::Warning.dwell_ticks()
    + ScenarioState::Fault.dwell_ticks()
    + ScenarioState::Recovery.dwell_ticks();

/// A state change produced by [`ScenarioClock::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioTransition {
    pub from: ScenarioState,
    pub to: ScenarioState,
    pub at_ms: u64,
}

impl ScenarioTransition {
    /// Re-entering Normal closes a full cycle.
    pub fn completes_cycle(&self) -> bool {
        self.to == ScenarioState::Normal
    }
}

/// Tracks time spent in the current scenario state and drives transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioClock {
    state: ScenarioState,
    state_timer: u32,
    entered_at_ms: u64,
    cycle_count: u32,
}

impl ScenarioClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one tick; returns the transition when the dwell time is exhausted.
    pub fn advance(&mut self, now_ms: u64) -> Option<ScenarioTransition> {
        self.state_timer = self.state_timer.saturating_add(1);
        if self.state_timer < self.state.dwell_ticks() {
            return None;
        }
        let from = self.state;
        self.state = from.next();
        self.state_timer = 0;
        self.entered_at_ms = now_ms;
        if self.state == ScenarioState::Normal {
            self.cycle_count = self.cycle_count.saturating_add(1);
        }
        Some(ScenarioTransition {
            from,
            to: self.state,
            at_ms: now_ms,
        })
    }

    /// Fraction of the current dwell time already elapsed, in `[0, 1)`.
    pub fn progress(&self) -> f32 {
        self.state_timer as f32 / self.state.dwell_ticks() as f32
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn state_timer(&self) -> u32 {
        self.state_timer
    }

    pub fn entered_at_ms(&self) -> u64 {
        self.entered_at_ms
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_is_102_ticks() {
        assert_eq!(FULL_CYCLE_TICKS, 102);
    }

    #[test]
    fn cycle_order_is_fixed() {
        let mut state = ScenarioState::Normal;
        let mut seen = Vec::new();
        for _ in 0..5 {
            state = state.next();
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                ScenarioState::Degradation,
                ScenarioState::Warning,
                ScenarioState::Fault,
                ScenarioState::Recovery,
                ScenarioState::Normal,
            ]
        );
    }

    #[test]
    fn transitions_after_dwell_and_resets_timer() {
        let mut clock = ScenarioClock::new();
        for tick in 1..45 {
            assert!(clock.advance(tick * 1000).is_none());
            assert_eq!(clock.state_timer(), tick as u32);
        }
        let transition = clock.advance(45_000).expect("normal dwell exhausted");
        assert_eq!(transition.from, ScenarioState::Normal);
        assert_eq!(transition.to, ScenarioState::Degradation);
        assert!(!transition.completes_cycle());
        assert_eq!(clock.state_timer(), 0);
        assert_eq!(clock.entered_at_ms(), 45_000);
        assert_eq!(clock.cycle_count(), 0);
    }

    #[test]
    fn re_entering_normal_counts_a_cycle() {
        let mut clock = ScenarioClock::new();
        let mut completed = 0;
        for tick in 1..=u64::from(FULL_CYCLE_TICKS) {
            if let Some(transition) = clock.advance(tick) {
                if transition.completes_cycle() {
                    completed += 1;
                    assert_eq!(tick, u64::from(FULL_CYCLE_TICKS));
                }
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(clock.cycle_count(), 1);
        assert_eq!(clock.state(), ScenarioState::Normal);
    }

    #[test]
    fn timer_never_reaches_dwell() {
        let mut clock = ScenarioClock::new();
        for tick in 0..500 {
            clock.advance(tick);
            assert!(clock.state_timer() < clock.state().dwell_ticks());
            assert!(clock.progress() < 1.0);
        }
    }

    #[test]
    fn labels_match_dashboard_badges() {
        assert_eq!(ScenarioState::Degradation.label(), "Degrading");
        assert_eq!(ScenarioState::Fault.label(), "FAULT");
        assert_eq!(ScenarioState::Recovery.to_string(), "recovery");
    }
}
