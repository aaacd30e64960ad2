//! Deterministic level simulation
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - Timers run off the level's own clock, advanced from `tick`
//! - The scene is reached only through the `platform::Scene` trait

pub mod board;
pub mod contact;
pub mod controller;
pub mod direction;
pub mod drop;
pub mod events;
pub mod gravity;
pub mod schedule;
pub mod scoring;
pub mod state;
pub mod turbulence;
pub mod wildfire;

pub use board::{BoardLayout, CloudPlacement, TargetPlacement};
pub use contact::{BodyCategory, ContactBody, ContactEvent, ContactKind, classify};
pub use controller::{ActionError, ContactOutcome, LevelEconomyController, LevelTask};
pub use direction::{Direction, resolve_exact, resolve_threshold};
pub use drop::{DropError, DropLifecycle, DropState, Droplet};
pub use events::{EventBus, EventListener, GameEvent};
pub use gravity::{GravityMode, GravityOscillator};
pub use schedule::{Scheduler, TimerId};
pub use scoring::{CloudPrices, CloudStreak, ObstacleKind, ScoreChange, ScoringEngine};
pub use state::{GameState, LevelPhase, NodeId};
pub use turbulence::{TurbulenceSide, impulse};
pub use wildfire::{Extinguished, TargetKind, WildfireError, WildfireTracker};
