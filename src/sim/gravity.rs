//! Gravity sources for a level
//!
//! - `Static`: the scene keeps its own gravity, nothing is written
//! - `Sensor`: every tick the accelerometer sample is scaled by the base gravity
//! - `Oscillating`: the base gravity, redrawn from zero-biased discrete sets
//!   every [`GRAVITY_OSCILLATION_PERIOD`] seconds

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY_OSCILLATION_PERIOD, GRAVITY_STEP};

/// Where a level's gravity comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GravityMode {
    #[default]
    Static,
    Sensor,
    Oscillating,
}

impl GravityMode {
    /// Map the level's `(deviation, fixed)` flags to a mode
    pub fn from_flags(deviation_enabled: bool, fixed: bool) -> Self {
        match (deviation_enabled, fixed) {
            (false, _) => GravityMode::Static,
            (true, false) => GravityMode::Sensor,
            (true, true) => GravityMode::Oscillating,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GravityMode::Static => "static",
            GravityMode::Sensor => "sensor",
            GravityMode::Oscillating => "oscillating",
        }
    }
}

/// Weighted x-axis draws (zero-biased)
const X_CHOICES: [f32; 6] = [GRAVITY_STEP, -GRAVITY_STEP, 0.0, 0.0, 0.0, 0.0];
/// Weighted y-axis draws (biased toward zero and down)
const Y_CHOICES: [f32; 9] = [
    GRAVITY_STEP,
    -GRAVITY_STEP,
    0.0,
    -GRAVITY_STEP,
    -GRAVITY_STEP,
    0.0,
    0.0,
    -GRAVITY_STEP,
    -GRAVITY_STEP,
];

/// Periodic gravity redraw for oscillating levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityOscillator {
    pub period: f32,
}

impl Default for GravityOscillator {
    fn default() -> Self {
        Self {
            period: GRAVITY_OSCILLATION_PERIOD,
        }
    }
}

impl GravityOscillator {
    /// Draw a new gravity vector. Never returns zero gravity: `(0, 0)` is
    /// corrected to straight down.
    pub fn draw(&self, rng: &mut impl Rng) -> Vec2 {
        let x = X_CHOICES.choose(rng).copied().unwrap_or(0.0);
        let y = Y_CHOICES.choose(rng).copied().unwrap_or(-GRAVITY_STEP);
        if x == 0.0 && y == 0.0 {
            Vec2::new(0.0, -GRAVITY_STEP)
        } else {
            Vec2::new(x, y)
        }
    }
}

/// Gravity produced by a sensor sample on a sensor-driven level
pub fn scale_sensor_sample(sample: Vec2, base: Vec2) -> Vec2 {
    sample * base
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(GravityMode::from_flags(false, true), GravityMode::Static);
        assert_eq!(GravityMode::from_flags(false, false), GravityMode::Static);
        assert_eq!(GravityMode::from_flags(true, false), GravityMode::Sensor);
        assert_eq!(GravityMode::from_flags(true, true), GravityMode::Oscillating);
    }

    #[test]
    fn test_draws_cover_the_grid() {
        let osc = GravityOscillator::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut seen_zero_x = false;
        let mut seen_up = false;
        for _ in 0..500 {
            let g = osc.draw(&mut rng);
            assert!([GRAVITY_STEP, -GRAVITY_STEP, 0.0].contains(&g.x));
            assert!([GRAVITY_STEP, -GRAVITY_STEP, 0.0].contains(&g.y));
            seen_zero_x |= g.x == 0.0;
            seen_up |= g.y > 0.0;
        }
        assert!(seen_zero_x);
        assert!(seen_up);
    }

    #[test]
    fn test_sensor_scaling() {
        let g = scale_sensor_sample(Vec2::new(0.5, -0.25), Vec2::new(10.0, 10.0));
        assert_eq!(g, Vec2::new(5.0, -2.5));
    }

    proptest! {
        #[test]
        fn draw_never_yields_zero_gravity(seed in any::<u64>()) {
            let osc = GravityOscillator::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..20 {
                let g = osc.draw(&mut rng);
                prop_assert!(g != Vec2::ZERO);
            }
        }
    }
}
