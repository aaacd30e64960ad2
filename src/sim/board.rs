//! Level board layout
//!
//! Clouds are laid out in rows that shrink from `max_clouds_in_range` down to
//! `min_clouds_in_range`, each row centred on x = 0 and spaced four drop
//! diameters apart. The second row marks the target slots: every column of
//! that row gets an aim marker and a fire below the board, plus smoke on the
//! aim marker.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ObstacleKind, TargetKind};
use crate::level::LevelConfig;

/// Vertical rows are three drop diameters apart
const ROW_SPACING: f32 = 3.0;
/// Horizontal cloud spacing in drop diameters
const COLUMN_SPACING: f32 = 4.0;
/// Aim marker offset below the board baseline
const AIM_DROP: f32 = 210.0;
/// Fire offset below the board baseline
const FIRE_DROP: f32 = 240.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudPlacement {
    pub position: Vec2,
    pub kind: ObstacleKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPlacement {
    pub position: Vec2,
    pub kind: TargetKind,
}

/// Everything the scene has to place when a level is built
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardLayout {
    pub clouds: Vec<CloudPlacement>,
    pub targets: Vec<TargetPlacement>,
}

impl BoardLayout {
    /// Lay out the board with the lowest cloud row at `baseline`
    pub fn generate(config: &LevelConfig, baseline: f32, rng: &mut impl Rng) -> Self {
        let d = config.drop_diameter;
        let max = config.max_clouds_in_range;
        let min = config.min_clouds_in_range.min(max);
        let mut layout = BoardLayout::default();

        for range in (min..=max).rev() {
            let row = max - range;
            let y = baseline + row as f32 * d * ROW_SPACING;
            let half_span = (range as f32 - 1.0) / 2.0 * COLUMN_SPACING * d;

            for column in 0..range {
                let x = half_span - column as f32 * COLUMN_SPACING * d;
                let kind = if rng.random_bool(0.5) {
                    ObstacleKind::StormCloud
                } else {
                    ObstacleKind::Cloud
                };
                layout.clouds.push(CloudPlacement {
                    position: Vec2::new(x, y),
                    kind,
                });

                if row == 1 {
                    let aim = Vec2::new(x, baseline - AIM_DROP);
                    layout.targets.extend([
                        TargetPlacement {
                            position: aim,
                            kind: TargetKind::Aim,
                        },
                        TargetPlacement {
                            position: Vec2::new(x, baseline - FIRE_DROP),
                            kind: TargetKind::Fire,
                        },
                        TargetPlacement {
                            position: aim,
                            kind: TargetKind::Smoke,
                        },
                    ]);
                }
            }
        }

        layout
    }

    /// Number of target slots (columns carrying targets)
    pub fn slot_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.kind == TargetKind::Aim)
            .count()
    }
}
