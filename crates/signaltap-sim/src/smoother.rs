//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Exponential approach smoothing toward scenario targets."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---

pub const SENSOR_SMOOTHING_RATE: f32 = 0.15;
pub const HEALTH_SMOOTHING_RATE: f32 = 0.12;
pub const FAILURE_SMOOTHING_RATE: f32 = 0.10;

/// One step of `current + (target - current) * rate`.
pub fn approach(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}

/// Clamp without panicking on an inverted range.
pub fn clamp_to(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Bounded first-order smoother: the target is clamped before the step and the
/// result after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    rate: f32,
}

impl Smoother {
    pub const fn new(rate: f32) -> Self {
        Self { rate }
    }

    pub const fn sensor() -> Self {
        Self::new(SENSOR_SMOOTHING_RATE)
    }

    pub const fn health() -> Self {
        Self::new(HEALTH_SMOOTHING_RATE)
    }

    pub const fn failure() -> Self {
        Self::new(FAILURE_SMOOTHING_RATE)
    }

    pub fn step(&self, current: f32, target: f32, min: f32, max: f32) -> f32 {
        let target = clamp_to(target, min, max);
        clamp_to(approach(current, target, self.rate), min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_fifteen_percent() {
        let value = Smoother::sensor().step(0.0, 100.0, 0.0, 100.0);
        assert!((value - 15.0).abs() < 1e-4);
    }

    #[test]
    fn out_of_range_target_is_clamped_first() {
        let value = Smoother::sensor().step(90.0, 500.0, 0.0, 100.0);
        assert!((value - 91.5).abs() < 1e-4);
    }

    #[test]
    fn repeated_steps_converge_monotonically() {
        let smoother = Smoother::health();
        let mut value = 40.0;
        let mut previous = value;
        for _ in 0..200 {
            value = smoother.step(value, 90.0, 0.0, 100.0);
            assert!(value >= previous);
            assert!(value <= 90.0);
            previous = value;
        }
        assert!((value - 90.0).abs() < 0.01);
    }

    #[test]
    fn clamp_handles_bounds() {
        assert_eq!(clamp_to(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp_to(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp_to(0.5, 0.0, 1.0), 0.5);
    }
}
