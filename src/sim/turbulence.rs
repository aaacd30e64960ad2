//! Turbulence impulses
//!
//! The player has two turbulence buttons. Each direction maps the level's
//! deviation magnitudes onto the impulse axes; the button picks the sign.
//! On the two downward diagonals the second button doubles the vertical kick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Direction;

/// Which turbulence button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurbulenceSide {
    /// Button tag 0
    Primary,
    /// Button tag 1
    Secondary,
}

impl TurbulenceSide {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(TurbulenceSide::Primary),
            1 => Some(TurbulenceSide::Secondary),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            TurbulenceSide::Primary => 0,
            TurbulenceSide::Secondary => 1,
        }
    }
}

/// Impulse for a turbulence press
pub fn impulse(direction: Direction, side: TurbulenceSide, deviation_x: i32, deviation_y: i32) -> Vec2 {
    let dx = deviation_x as f32;
    let dy = deviation_y as f32;
    let primary = side == TurbulenceSide::Primary;
    let pick = |a: f32, b: f32| if primary { a } else { b };

    let (x, y) = match direction {
        Direction::Right => (-dy, pick(dx, -dx)),
        Direction::Left => (dy, pick(dx, -dx)),
        Direction::Up => (pick(-dx, dx), -dy),
        Direction::Down => (pick(dx, -dx), dy),
        Direction::DownRight => (-dy, pick(dx, -dx * 2.0)),
        Direction::DownLeft => (dy, pick(dx, -dx * 2.0)),
        Direction::UpRight => (pick(-dy, dx), -dy),
        Direction::UpLeft => (pick(-dx, dy), -dy),
    };
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DX: i32 = 300;
    const DY: i32 = 1000;

    fn both(direction: Direction) -> (Vec2, Vec2) {
        (
            impulse(direction, TurbulenceSide::Primary, DX, DY),
            impulse(direction, TurbulenceSide::Secondary, DX, DY),
        )
    }

    #[test]
    fn test_axis_directions() {
        assert_eq!(
            both(Direction::Down),
            (Vec2::new(300.0, 1000.0), Vec2::new(-300.0, 1000.0))
        );
        assert_eq!(
            both(Direction::Up),
            (Vec2::new(-300.0, -1000.0), Vec2::new(300.0, -1000.0))
        );
        assert_eq!(
            both(Direction::Right),
            (Vec2::new(-1000.0, 300.0), Vec2::new(-1000.0, -300.0))
        );
        assert_eq!(
            both(Direction::Left),
            (Vec2::new(1000.0, 300.0), Vec2::new(1000.0, -300.0))
        );
    }

    #[test]
    fn test_down_diagonals_double_on_secondary() {
        assert_eq!(
            both(Direction::DownRight),
            (Vec2::new(-1000.0, 300.0), Vec2::new(-1000.0, -600.0))
        );
        assert_eq!(
            both(Direction::DownLeft),
            (Vec2::new(1000.0, 300.0), Vec2::new(1000.0, -600.0))
        );
    }

    #[test]
    fn test_up_diagonals_mix_magnitudes() {
        assert_eq!(
            both(Direction::UpRight),
            (Vec2::new(-1000.0, -1000.0), Vec2::new(300.0, -1000.0))
        );
        assert_eq!(
            both(Direction::UpLeft),
            (Vec2::new(-300.0, -1000.0), Vec2::new(1000.0, -1000.0))
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(TurbulenceSide::from_tag(0), Some(TurbulenceSide::Primary));
        assert_eq!(TurbulenceSide::from_tag(1), Some(TurbulenceSide::Secondary));
        assert_eq!(TurbulenceSide::from_tag(2), None);
        assert_eq!(TurbulenceSide::Secondary.tag(), 1);
    }

    proptest! {
        #[test]
        fn impulse_only_uses_deviation_magnitudes(dx in -5000i32..5000, dy in -5000i32..5000, tag in 0u8..2) {
            let side = TurbulenceSide::from_tag(tag).unwrap();
            let allowed = [dx.abs() as f32, dy.abs() as f32, (dx * 2).abs() as f32];
            for dir in Direction::ALL {
                let v = impulse(dir, side, dx, dy);
                prop_assert!(allowed.contains(&v.x.abs()));
                prop_assert!(allowed.contains(&v.y.abs()));
            }
        }
    }
}
