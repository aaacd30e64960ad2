//! Level state
//!
//! Everything a running level mutates lives here. Only the level controller
//! writes to it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::direction::{Direction, resolve_exact, resolve_threshold};
use super::drop::DropLifecycle;
use super::scoring::{CloudStreak, ScoringEngine};
use super::wildfire::WildfireTracker;

/// Scene node identity. Clouds, targets and drops all get one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Built, waiting for `start`
    #[default]
    Pending,
    /// Active gameplay
    Playing,
    /// Last target is out, completion announced after the grace delay
    Completing,
    /// `LevelCompleted` emitted
    Completed,
    /// Abandoned; nothing runs anymore
    TornDown,
}

impl LevelPhase {
    /// Contacts and player actions are only honoured while playing
    pub fn accepts_input(self) -> bool {
        self == LevelPhase::Playing
    }

    pub fn is_finished(self) -> bool {
        matches!(self, LevelPhase::Completed | LevelPhase::TornDown)
    }
}

/// Mutable state of one level instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Level index
    pub level: u32,
    pub phase: LevelPhase,
    /// Score and best score
    pub scoring: ScoringEngine,
    /// Gravity last written to the scene
    pub gravity: Vec2,
    /// Heading used for turbulence impulses (exact policy)
    pub direction: Direction,
    /// Heading shown on the gravity arrow (threshold policy)
    pub indicator: Direction,
    pub drop: DropLifecycle,
    pub clouds: CloudStreak,
    pub wildfires: WildfireTracker,
    /// Charged evaporations this level
    pub evaporation_count: u32,
    /// Turbulence presses this level
    pub turbulence_count: u32,
    /// Next node ID
    next_id: u32,
}

impl GameState {
    pub fn new(level: u32, starting_score: i64, best_score: i64, gravity: Vec2) -> Self {
        Self {
            level,
            phase: LevelPhase::Pending,
            scoring: ScoringEngine::new(starting_score, best_score),
            gravity,
            direction: resolve_exact(gravity.x, gravity.y),
            indicator: resolve_threshold(gravity.x, gravity.y),
            drop: DropLifecycle::new(),
            clouds: CloudStreak::new(),
            wildfires: WildfireTracker::new(),
            evaporation_count: 0,
            turbulence_count: 0,
            next_id: 1,
        }
    }

    /// Allocate a new node ID
    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Write gravity and re-resolve both headings
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
        self.direction = resolve_exact(gravity.x, gravity.y);
        self.indicator = resolve_threshold(gravity.x, gravity.y);
    }

    pub fn score(&self) -> i64 {
        self.scoring.score()
    }

    pub fn best_score(&self) -> i64 {
        self.scoring.best_score()
    }

    pub fn drop_active(&self) -> bool {
        self.drop.is_active()
    }

    pub fn collision_suppressed(&self) -> bool {
        self.clouds.is_suppressed()
    }

    pub fn repeat_cloud_streak(&self) -> u32 {
        self.clouds.repeat_count()
    }

    pub fn wildfires_remaining(&self) -> u32 {
        self.wildfires.remaining()
    }

    pub fn extinguish_cycle_counter(&self) -> u8 {
        self.wildfires.cycle_counter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_resolves_headings() {
        let state = GameState::new(4, 120, 300, Vec2::new(-8.0, 8.0));
        assert_eq!(state.direction, Direction::UpLeft);
        assert_eq!(state.indicator, Direction::UpLeft);
        assert_eq!(state.score(), 120);
        assert_eq!(state.best_score(), 300);
        assert_eq!(state.phase, LevelPhase::Pending);
        assert!(!state.drop_active());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let mut state = GameState::new(0, 0, 0, Vec2::ZERO);
        let a = state.next_node_id();
        let b = state.next_node_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_set_gravity_keeps_policies_apart() {
        let mut state = GameState::new(0, 0, 0, Vec2::ZERO);
        state.set_gravity(Vec2::new(0.0, -8.0));
        assert_eq!(state.direction, Direction::Down);
        assert_eq!(state.indicator, Direction::DownLeft);

        state.set_gravity(Vec2::new(3.2, 0.4));
        assert_eq!(state.direction, Direction::Down);
        assert_eq!(state.indicator, Direction::Right);
    }
}
