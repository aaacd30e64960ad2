//! Rainmaker - level economy for a gravity-steered drop puzzle
//!
//! Core modules:
//! - `sim`: Deterministic level simulation (directions, drop lifecycle, scoring, timers)
//! - `level`: Data-driven level tuning and the built-in level table
//! - `progress`: Player record and level outcome rules
//! - `persistence`: Save/load of the player record
//! - `platform`: Scene/sensor collaborator contracts and a headless scene

pub mod level;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod sim;

pub use level::{GravityMode, LevelCatalog, LevelConfig, LevelTuning};
pub use progress::{LevelOutcome, PlayerProgress, ProgressSink, ProgressSnapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Points awarded for putting out a target
    pub const TARGET_CONTACT_REWARD: i64 = 100;
    /// Score deducted once when a level starts
    pub const ENTRY_TOLL: i64 = 1;

    /// Delay before a new drop appears after a target contact (seconds)
    pub const DROP_RESPAWN_DELAY: f32 = 1.0;
    /// Grace period between the last target going out and `LevelCompleted`
    pub const COMPLETION_GRACE: f32 = 0.4;
    /// Gravity redraw period for oscillating levels (seconds)
    pub const GRAVITY_OSCILLATION_PERIOD: f32 = 10.0;

    /// Every Nth successful contact brings a fire back
    pub const EXTINGUISH_CYCLE: u8 = 3;
    /// Multiplier applied to the level's wildfire respawn interval
    pub const WILDFIRE_RESPAWN_FACTOR: f32 = 1.6;

    /// Drop spawns within +/- this many diameters of the centre line
    pub const DROP_SPAWN_SPREAD: f32 = 3.5;
    /// Level index from which drops are drawn larger
    pub const LARGE_DROP_LEVEL: u32 = 3;
    pub const SMALL_DROP_SCALE: f32 = 1.2;
    pub const LARGE_DROP_SCALE: f32 = 1.5;

    /// Magnitude of a discrete gravity axis
    pub const GRAVITY_STEP: f32 = 8.0;

    /// Last level of the campaign
    pub const FINAL_LEVEL: u32 = 9;
}
