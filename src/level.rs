//! Level tuning
//!
//! A [`LevelTuning`] is the data-driven description of one level. The
//! built-in [`LevelCatalog`] covers levels 0-9 and can be replaced by a JSON
//! catalog. Resolving a tuning with the player's level index and score yields
//! the immutable [`LevelConfig`] a level runs with.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::sim::GravityMode;
use crate::sim::CloudPrices;

/// Scene used by every built-in level
pub const DEFAULT_SCENE: &str = "base_level";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid level catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level {level}: min_clouds_in_range ({min}) exceeds max_clouds_in_range ({max})")]
    CloudRange { level: u32, min: u32, max: u32 },
    #[error("level {level}: drop diameter must be positive, got {diameter}")]
    DropDiameter { level: u32, diameter: f32 },
    #[error("level {level}: empty choice list for turbulence deviation")]
    EmptyDeviation { level: u32 },
}

/// A turbulence deviation: fixed, or drawn when the level is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deviation {
    Fixed(i32),
    /// One of `choices`, with a random sign
    Random { choices: Vec<i32> },
}

impl Deviation {
    fn resolve(&self, rng: &mut impl Rng) -> i32 {
        match self {
            Deviation::Fixed(v) => *v,
            Deviation::Random { choices } => {
                let magnitude = choices.choose(rng).copied().unwrap_or(0);
                if rng.random_bool(0.5) { magnitude } else { -magnitude }
            }
        }
    }
}

/// Data-driven parameters of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    pub scene: String,
    pub gravity_deviation: bool,
    pub gravity_fixed: bool,
    pub gravity: (f32, f32),
    /// Seconds; the actual fire respawn delay is this times 1.6
    pub wildfire_respawn_interval: f32,
    pub max_clouds_in_range: u32,
    pub min_clouds_in_range: u32,
    pub drop_diameter: f32,
    pub evaporation_price: u32,
    pub turbulence_price: u32,
    pub turbulence_deviation_x: Deviation,
    pub turbulence_deviation_y: Deviation,
    pub cloud_collision_reward: u32,
    pub storm_cloud_collision_penalty: u32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            scene: DEFAULT_SCENE.to_string(),
            gravity_deviation: false,
            gravity_fixed: true,
            gravity: (10.0, 10.0),
            wildfire_respawn_interval: 30.0,
            max_clouds_in_range: 4,
            min_clouds_in_range: 2,
            drop_diameter: 80.0,
            evaporation_price: 50,
            turbulence_price: 15,
            turbulence_deviation_x: Deviation::Fixed(1000),
            turbulence_deviation_y: Deviation::Fixed(1000),
            cloud_collision_reward: 1,
            storm_cloud_collision_penalty: 2,
        }
    }
}

impl LevelTuning {
    /// Tuning for level 0 and for any level without its own entry
    pub fn fallback() -> Self {
        Self {
            wildfire_respawn_interval: 40.0,
            ..Self::default()
        }
    }

    pub fn gravity_mode(&self) -> GravityMode {
        GravityMode::from_flags(self.gravity_deviation, self.gravity_fixed)
    }

    pub fn validate(&self, level: u32) -> Result<(), ConfigError> {
        if self.min_clouds_in_range > self.max_clouds_in_range {
            return Err(ConfigError::CloudRange {
                level,
                min: self.min_clouds_in_range,
                max: self.max_clouds_in_range,
            });
        }
        if self.drop_diameter.is_nan() || self.drop_diameter <= 0.0 {
            return Err(ConfigError::DropDiameter {
                level,
                diameter: self.drop_diameter,
            });
        }
        for deviation in [&self.turbulence_deviation_x, &self.turbulence_deviation_y] {
            if matches!(deviation, Deviation::Random { choices } if choices.is_empty()) {
                return Err(ConfigError::EmptyDeviation { level });
            }
        }
        Ok(())
    }

    /// Freeze this tuning into the config for one level run
    pub fn resolve(&self, level_index: u32, starting_score: i64, rng: &mut impl Rng) -> LevelConfig {
        LevelConfig {
            scene_identifier: self.scene.clone(),
            gravity_deviation_enabled: self.gravity_deviation,
            gravity_fixed: self.gravity_fixed,
            base_gravity: Vec2::new(self.gravity.0, self.gravity.1),
            wildfire_respawn_interval: self.wildfire_respawn_interval,
            max_clouds_in_range: self.max_clouds_in_range,
            min_clouds_in_range: self.min_clouds_in_range,
            drop_diameter: self.drop_diameter,
            evaporation_price: self.evaporation_price,
            turbulence_price: self.turbulence_price,
            turbulence_deviation_x: self.turbulence_deviation_x.resolve(rng),
            turbulence_deviation_y: self.turbulence_deviation_y.resolve(rng),
            cloud_collision_reward: self.cloud_collision_reward,
            storm_cloud_collision_penalty: self.storm_cloud_collision_penalty,
            level_index,
            starting_score,
        }
    }
}

/// Immutable per-level constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub scene_identifier: String,
    pub gravity_deviation_enabled: bool,
    pub gravity_fixed: bool,
    pub base_gravity: Vec2,
    pub wildfire_respawn_interval: f32,
    pub max_clouds_in_range: u32,
    pub min_clouds_in_range: u32,
    pub drop_diameter: f32,
    pub evaporation_price: u32,
    pub turbulence_price: u32,
    pub turbulence_deviation_x: i32,
    pub turbulence_deviation_y: i32,
    pub cloud_collision_reward: u32,
    pub storm_cloud_collision_penalty: u32,
    pub level_index: u32,
    pub starting_score: i64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let tuning = LevelTuning::fallback();
        Self {
            scene_identifier: tuning.scene,
            gravity_deviation_enabled: tuning.gravity_deviation,
            gravity_fixed: tuning.gravity_fixed,
            base_gravity: Vec2::new(tuning.gravity.0, tuning.gravity.1),
            wildfire_respawn_interval: tuning.wildfire_respawn_interval,
            max_clouds_in_range: tuning.max_clouds_in_range,
            min_clouds_in_range: tuning.min_clouds_in_range,
            drop_diameter: tuning.drop_diameter,
            evaporation_price: tuning.evaporation_price,
            turbulence_price: tuning.turbulence_price,
            turbulence_deviation_x: 1000,
            turbulence_deviation_y: 1000,
            cloud_collision_reward: tuning.cloud_collision_reward,
            storm_cloud_collision_penalty: tuning.storm_cloud_collision_penalty,
            level_index: 0,
            starting_score: 0,
        }
    }
}

impl LevelConfig {
    pub fn gravity_mode(&self) -> GravityMode {
        GravityMode::from_flags(self.gravity_deviation_enabled, self.gravity_fixed)
    }

    pub fn cloud_prices(&self) -> CloudPrices {
        CloudPrices {
            reward: self.cloud_collision_reward,
            storm_penalty: self.storm_cloud_collision_penalty,
        }
    }
}

/// Level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCatalog {
    #[serde(default)]
    pub levels: BTreeMap<u32, LevelTuning>,
    #[serde(default = "LevelTuning::fallback")]
    pub fallback: LevelTuning,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelCatalog {
    /// The shipped level table
    pub fn builtin() -> Self {
        let base = LevelTuning::default;
        let mut levels = BTreeMap::new();

        levels.insert(0, LevelTuning::fallback());
        levels.insert(
            1,
            LevelTuning {
                max_clouds_in_range: 5,
                min_clouds_in_range: 2,
                wildfire_respawn_interval: 50.0,
                drop_diameter: 60.0,
                turbulence_price: 17,
                turbulence_deviation_x: Deviation::Fixed(900),
                ..base()
            },
        );
        levels.insert(
            2,
            LevelTuning {
                turbulence_deviation_y: Deviation::Random {
                    choices: vec![5000, 10000, 3000, 100, 500, 1000, 1000, 100],
                },
                drop_diameter: 50.0,
                max_clouds_in_range: 6,
                min_clouds_in_range: 2,
                turbulence_price: 22,
                evaporation_price: 55,
                turbulence_deviation_x: Deviation::Fixed(300),
                cloud_collision_reward: 1,
                storm_cloud_collision_penalty: 3,
                wildfire_respawn_interval: 60.0,
                ..base()
            },
        );
        levels.insert(
            3,
            LevelTuning {
                drop_diameter: 40.0,
                max_clouds_in_range: 7,
                min_clouds_in_range: 2,
                turbulence_price: 30,
                evaporation_price: 60,
                turbulence_deviation_x: Deviation::Fixed(500),
                cloud_collision_reward: 1,
                storm_cloud_collision_penalty: 3,
                gravity_deviation: true,
                gravity_fixed: false,
                gravity: (10.0, 10.0),
                wildfire_respawn_interval: 10.0,
                ..base()
            },
        );
        levels.insert(
            4,
            LevelTuning {
                drop_diameter: 30.0,
                max_clouds_in_range: 8,
                min_clouds_in_range: 3,
                evaporation_price: 65,
                turbulence_price: 15,
                turbulence_deviation_x: Deviation::Fixed(200),
                cloud_collision_reward: 2,
                storm_cloud_collision_penalty: 4,
                gravity_deviation: true,
                gravity_fixed: true,
                gravity: (0.0, -10.0),
                wildfire_respawn_interval: 60.0,
                ..base()
            },
        );
        levels.insert(
            5,
            LevelTuning {
                drop_diameter: 30.0,
                max_clouds_in_range: 9,
                min_clouds_in_range: 2,
                evaporation_price: 70,
                turbulence_price: 50,
                turbulence_deviation_x: Deviation::Fixed(100),
                cloud_collision_reward: 2,
                storm_cloud_collision_penalty: 5,
                wildfire_respawn_interval: 100.0,
                ..base()
            },
        );
        levels.insert(
            6,
            LevelTuning {
                drop_diameter: 30.0,
                max_clouds_in_range: 10,
                min_clouds_in_range: 2,
                evaporation_price: 100,
                turbulence_price: 300,
                turbulence_deviation_x: Deviation::Fixed(100),
                cloud_collision_reward: 3,
                storm_cloud_collision_penalty: 100,
                gravity_deviation: true,
                gravity_fixed: false,
                gravity: (10.0, 10.0),
                wildfire_respawn_interval: 20.0,
                ..base()
            },
        );
        levels.insert(
            7,
            LevelTuning {
                drop_diameter: 25.0,
                max_clouds_in_range: 11,
                min_clouds_in_range: 3,
                evaporation_price: 250,
                turbulence_price: 20,
                turbulence_deviation_x: Deviation::Fixed(90),
                cloud_collision_reward: 10,
                storm_cloud_collision_penalty: 50,
                gravity_deviation: true,
                gravity_fixed: true,
                gravity: (0.0, 8.0),
                wildfire_respawn_interval: 160.0,
                ..base()
            },
        );
        levels.insert(
            8,
            LevelTuning {
                drop_diameter: 25.0,
                max_clouds_in_range: 12,
                min_clouds_in_range: 2,
                evaporation_price: 80,
                turbulence_price: 70,
                turbulence_deviation_x: Deviation::Fixed(100),
                cloud_collision_reward: 20,
                storm_cloud_collision_penalty: 50,
                wildfire_respawn_interval: 120.0,
                ..base()
            },
        );
        levels.insert(
            9,
            LevelTuning {
                drop_diameter: 22.0,
                max_clouds_in_range: 14,
                min_clouds_in_range: 5,
                evaporation_price: 50,
                turbulence_price: 5,
                turbulence_deviation_x: Deviation::Fixed(100),
                cloud_collision_reward: 90,
                storm_cloud_collision_penalty: 100,
                wildfire_respawn_interval: 10.0,
                ..base()
            },
        );

        Self {
            levels,
            fallback: LevelTuning::fallback(),
        }
    }

    /// Parse and validate a JSON catalog
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: LevelCatalog = serde_json::from_str(json)?;
        for (level, tuning) in &catalog.levels {
            tuning.validate(*level)?;
        }
        catalog.fallback.validate(u32::MAX)?;
        log::info!("Loaded level catalog with {} levels", catalog.levels.len());
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Tuning for `level`, falling back to the default tuning
    pub fn tuning_for(&self, level: u32) -> &LevelTuning {
        match self.levels.get(&level) {
            Some(tuning) => tuning,
            None => {
                log::warn!("No tuning for level {level}, using default tuning");
                &self.fallback
            }
        }
    }

    /// Build the config for one run of `level`
    pub fn config_for(&self, level: u32, starting_score: i64, rng: &mut impl Rng) -> LevelConfig {
        self.tuning_for(level).resolve(level, starting_score, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.levels.len(), 10);
        for (level, tuning) in &catalog.levels {
            tuning.validate(*level).unwrap();
        }
    }

    #[test]
    fn test_level_two_prices() {
        let mut rng = Pcg32::seed_from_u64(11);
        let cfg = LevelCatalog::builtin().config_for(2, 40, &mut rng);
        assert_eq!(cfg.drop_diameter, 50.0);
        assert_eq!(cfg.evaporation_price, 55);
        assert_eq!(cfg.turbulence_price, 22);
        assert_eq!(cfg.cloud_collision_reward, 1);
        assert_eq!(cfg.storm_cloud_collision_penalty, 3);
        assert_eq!(cfg.level_index, 2);
        assert_eq!(cfg.starting_score, 40);
        let allowed = [5000, 10000, 3000, 100, 500, 1000];
        assert!(allowed.contains(&cfg.turbulence_deviation_y.abs()));
    }

    #[test]
    fn test_gravity_modes() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.tuning_for(0).gravity_mode(), GravityMode::Static);
        assert_eq!(catalog.tuning_for(3).gravity_mode(), GravityMode::Sensor);
        assert_eq!(catalog.tuning_for(4).gravity_mode(), GravityMode::Oscillating);
        assert_eq!(catalog.tuning_for(7).gravity, (0.0, 8.0));
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let mut rng = Pcg32::seed_from_u64(1);
        let catalog = LevelCatalog::builtin();
        let cfg = catalog.config_for(42, 0, &mut rng);
        assert_eq!(cfg.drop_diameter, 80.0);
        assert_eq!(cfg.wildfire_respawn_interval, 40.0);
        assert_eq!(cfg.level_index, 42);
    }

    #[test]
    fn test_json_partial_entries_take_base_defaults() {
        let json = r#"{
            "levels": {
                "1": { "drop_diameter": 55.0, "turbulence_deviation_y": { "choices": [10, 20] } }
            }
        }"#;
        let catalog = LevelCatalog::from_json(json).unwrap();
        let tuning = catalog.tuning_for(1);
        assert_eq!(tuning.drop_diameter, 55.0);
        assert_eq!(tuning.evaporation_price, 50);
        assert_eq!(tuning.turbulence_deviation_x, Deviation::Fixed(1000));
        assert_eq!(catalog.fallback, LevelTuning::fallback());
    }

    #[test]
    fn test_json_rejects_inverted_cloud_range() {
        let json = r#"{ "levels": { "3": { "max_clouds_in_range": 2, "min_clouds_in_range": 5 } } }"#;
        assert!(matches!(
            LevelCatalog::from_json(json),
            Err(ConfigError::CloudRange { level: 3, .. })
        ));
        assert!(matches!(
            LevelCatalog::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip_of_builtin() {
        let catalog = LevelCatalog::builtin();
        let json = catalog.to_json().unwrap();
        assert_eq!(LevelCatalog::from_json(&json).unwrap(), catalog);
    }
}
