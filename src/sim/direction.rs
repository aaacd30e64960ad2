//! Discrete gravity directions
//!
//! Two classifiers live here and they are deliberately kept apart:
//! - [`resolve_exact`] matches only the eight canonical `(±8, 0)`, `(0, ±8)`,
//!   `(±8, ±8)` pairs and drives turbulence impulses.
//! - [`resolve_threshold`] bins continuous sensor-derived vectors and drives
//!   the on-screen gravity arrow.
//!
//! They disagree on non-canonical input (and even on `(0, -8)`, which the
//! threshold classifier reports as `DownLeft`). Callers pick the one that
//! matches their context.

use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY_STEP;

/// Half-width of the band treated as "near zero" by the threshold classifier
pub const NEAR_ZERO_BAND: f32 = 1.5;
/// Smallest value treated as strictly positive by the threshold classifier
pub const POSITIVE_EPSILON: f32 = 0.01;

/// One of eight compass headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Left,
    Up,
    #[default]
    Down,
    DownRight,
    DownLeft,
    UpRight,
    UpLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
        Direction::DownRight,
        Direction::DownLeft,
        Direction::UpRight,
        Direction::UpLeft,
    ];

    /// The canonical gravity pair that resolves to this direction
    pub fn canonical_gravity(self) -> (f32, f32) {
        let s = GRAVITY_STEP;
        match self {
            Direction::Right => (s, 0.0),
            Direction::Left => (-s, 0.0),
            Direction::Up => (0.0, s),
            Direction::Down => (0.0, -s),
            Direction::DownRight => (s, -s),
            Direction::DownLeft => (-s, -s),
            Direction::UpRight => (s, s),
            Direction::UpLeft => (-s, s),
        }
    }

    /// Arrow glyph name for the presentation layer
    pub fn arrow_name(self) -> &'static str {
        match self {
            Direction::Right => "arrow.right",
            Direction::Left => "arrow.left",
            Direction::Up => "arrow.up",
            Direction::Down => "arrow.down",
            Direction::DownRight => "arrow.down.right",
            Direction::DownLeft => "arrow.down.left",
            Direction::UpRight => "arrow.up.right",
            Direction::UpLeft => "arrow.up.left",
        }
    }
}

/// Classify a discretely-set gravity pair. Anything off the eight canonical
/// pairs falls back to `Down`.
pub fn resolve_exact(x: f32, y: f32) -> Direction {
    Direction::ALL
        .into_iter()
        .find(|dir| dir.canonical_gravity() == (x, y))
        .unwrap_or_default()
}

/// Classify a continuous gravity vector by sign and threshold bands.
///
/// Bands are tested in a fixed order and the first hit wins, so the axis
/// bands shadow the diagonals whenever the other axis is near zero.
pub fn resolve_threshold(x: f32, y: f32) -> Direction {
    let near_zero = |v: f32| (-NEAR_ZERO_BAND..=NEAR_ZERO_BAND).contains(&v);
    let positive = |v: f32| v >= POSITIVE_EPSILON;
    let non_positive = |v: f32| v <= 0.0;

    if positive(x) && near_zero(y) {
        Direction::Right
    } else if near_zero(x) && positive(y) {
        Direction::Up
    } else if positive(x) && positive(y) {
        Direction::UpRight
    } else if non_positive(x) && non_positive(y) {
        Direction::DownLeft
    } else if non_positive(x) && near_zero(y) {
        Direction::Left
    } else if near_zero(x) && non_positive(y) {
        Direction::Down
    } else if non_positive(x) && positive(y) {
        Direction::UpLeft
    } else if positive(x) && non_positive(y) {
        Direction::DownRight
    } else {
        Direction::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_matches_every_canonical_pair() {
        for dir in Direction::ALL {
            let (x, y) = dir.canonical_gravity();
            assert_eq!(resolve_exact(x, y), dir, "pair ({x}, {y})");
        }
    }

    #[test]
    fn test_exact_falls_back_to_down() {
        assert_eq!(resolve_exact(0.0, 0.0), Direction::Down);
        assert_eq!(resolve_exact(10.0, 10.0), Direction::Down);
        assert_eq!(resolve_exact(7.9, 0.0), Direction::Down);
        assert_eq!(resolve_exact(0.0, -10.0), Direction::Down);
    }

    #[test]
    fn test_exact_accepts_negative_zero() {
        assert_eq!(resolve_exact(-0.0, 8.0), Direction::Up);
    }

    #[test]
    fn test_threshold_axis_bands() {
        assert_eq!(resolve_threshold(5.0, 1.0), Direction::Right);
        assert_eq!(resolve_threshold(1.0, 5.0), Direction::Up);
        assert_eq!(resolve_threshold(-5.0, 1.0), Direction::Left);
        assert_eq!(resolve_threshold(1.0, -5.0), Direction::Down);
    }

    #[test]
    fn test_threshold_diagonals() {
        assert_eq!(resolve_threshold(5.0, 5.0), Direction::UpRight);
        assert_eq!(resolve_threshold(-5.0, -5.0), Direction::DownLeft);
        assert_eq!(resolve_threshold(-5.0, 5.0), Direction::UpLeft);
        assert_eq!(resolve_threshold(5.0, -5.0), Direction::DownRight);
    }

    #[test]
    fn test_policies_diverge_on_canonical_down() {
        // Both axes non-positive hits the DownLeft band first
        assert_eq!(resolve_exact(0.0, -8.0), Direction::Down);
        assert_eq!(resolve_threshold(0.0, -8.0), Direction::DownLeft);
        assert_eq!(resolve_threshold(0.0, 0.0), Direction::DownLeft);
    }

    #[test]
    fn test_threshold_gap_defaults_to_down() {
        // Strictly between 0 and the positive epsilon on x, positive y outside the band
        assert_eq!(resolve_threshold(0.005, 1.0), Direction::Up);
        assert_eq!(resolve_threshold(0.005, -3.0), Direction::Down);
        assert_eq!(resolve_threshold(f32::NAN, f32::NAN), Direction::Down);
    }

    proptest! {
        #[test]
        fn exact_is_down_off_the_canonical_grid(x in -20.0f32..20.0, y in -20.0f32..20.0) {
            let canonical = Direction::ALL.iter().any(|d| d.canonical_gravity() == (x, y));
            prop_assume!(!canonical);
            prop_assert_eq!(resolve_exact(x, y), Direction::Down);
        }

        #[test]
        fn threshold_quadrants_outside_band(x in 1.6f32..50.0, y in 1.6f32..50.0) {
            prop_assert_eq!(resolve_threshold(x, y), Direction::UpRight);
            prop_assert_eq!(resolve_threshold(-x, y), Direction::UpLeft);
            prop_assert_eq!(resolve_threshold(x, -y), Direction::DownRight);
            prop_assert_eq!(resolve_threshold(-x, -y), Direction::DownLeft);
        }
    }
}
