//! Score economy
//!
//! Every mutation returns a [`ScoreChange`] so the caller can publish it.
//! Cloud hits go through [`CloudStreak`] first: hitting the same cloud twice
//! in a row does not score again until a different cloud is touched.

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::consts::{ENTRY_TOLL, TARGET_CONTACT_REWARD};

/// Obstacle flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Rewards on contact
    Cloud,
    /// Penalizes on contact
    StormCloud,
}

impl ObstacleKind {
    pub fn is_storm(self) -> bool {
        self == ObstacleKind::StormCloud
    }
}

/// Per-level cloud prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudPrices {
    pub reward: u32,
    pub storm_penalty: u32,
}

/// Score before and after one mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    pub before: i64,
    pub after: i64,
}

impl ScoreChange {
    pub fn delta(&self) -> i64 {
        self.after - self.before
    }
}

/// Repeat-hit guard for cloud contacts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudStreak {
    last: Option<NodeId>,
    /// Consecutive contacts with `last`
    streak: u32,
    suppressed: bool,
}

impl CloudStreak {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contact with `cloud`. Returns whether scoring is suppressed.
    pub fn observe(&mut self, cloud: NodeId) -> bool {
        if self.last == Some(cloud) {
            self.streak += 1;
        } else {
            self.last = Some(cloud);
            self.streak = 1;
        }
        self.suppressed = self.streak >= 2;
        self.suppressed
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Repeat contacts beyond the first with the current cloud
    pub fn repeat_count(&self) -> u32 {
        self.streak.saturating_sub(1)
    }
}

/// Running score and best score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringEngine {
    score: i64,
    best_score: i64,
}

impl ScoringEngine {
    pub fn new(starting_score: i64, best_score: i64) -> Self {
        Self {
            score: starting_score,
            best_score,
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn best_score(&self) -> i64 {
        self.best_score
    }

    /// One-off deduction taken right after a level starts
    pub fn apply_entry_toll(&mut self) -> ScoreChange {
        self.apply(-ENTRY_TOLL)
    }

    /// Storm clouds cost the penalty, normal clouds pay the reward.
    /// Nothing happens while the repeat-hit guard is up.
    pub fn apply_cloud_collision(
        &mut self,
        kind: ObstacleKind,
        prices: CloudPrices,
        suppressed: bool,
    ) -> Option<ScoreChange> {
        if suppressed {
            return None;
        }
        let delta = match kind {
            ObstacleKind::StormCloud => -i64::from(prices.storm_penalty),
            ObstacleKind::Cloud => i64::from(prices.reward),
        };
        Some(self.apply(delta))
    }

    pub fn apply_target_contact(&mut self) -> ScoreChange {
        self.apply(TARGET_CONTACT_REWARD)
    }

    pub fn apply_turbulence(&mut self, price: u32) -> ScoreChange {
        self.apply(-i64::from(price))
    }

    pub fn apply_evaporation(&mut self, price: u32) -> ScoreChange {
        self.apply(-i64::from(price))
    }

    /// Returns true if the best score moved
    pub fn update_best_score(&mut self) -> bool {
        if self.score > self.best_score {
            self.best_score = self.score;
            true
        } else {
            false
        }
    }

    fn apply(&mut self, delta: i64) -> ScoreChange {
        let before = self.score;
        self.score += delta;
        self.update_best_score();
        ScoreChange {
            before,
            after: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICES: CloudPrices = CloudPrices {
        reward: 1,
        storm_penalty: 3,
    };

    #[test]
    fn test_cloud_prices() {
        let mut s = ScoringEngine::new(10, 0);
        let storm = s
            .apply_cloud_collision(ObstacleKind::StormCloud, PRICES, false)
            .unwrap();
        assert_eq!((storm.before, storm.after), (10, 7));

        let normal = s
            .apply_cloud_collision(ObstacleKind::Cloud, PRICES, false)
            .unwrap();
        assert_eq!(normal.delta(), 1);
        assert_eq!(s.score(), 8);
    }

    #[test]
    fn test_suppressed_collision_is_ignored() {
        let mut s = ScoringEngine::new(5, 0);
        assert!(
            s.apply_cloud_collision(ObstacleKind::StormCloud, PRICES, true)
                .is_none()
        );
        assert_eq!(s.score(), 5);
    }

    #[test]
    fn test_actions_and_target_reward() {
        let mut s = ScoringEngine::new(0, 0);
        s.apply_turbulence(22);
        s.apply_evaporation(55);
        assert_eq!(s.score(), -77);
        s.apply_target_contact();
        assert_eq!(s.score(), 23);
    }

    #[test]
    fn test_best_score_tracks_maximum() {
        let mut s = ScoringEngine::new(0, 50);
        s.apply_target_contact();
        assert_eq!(s.best_score(), 100);
        s.apply_evaporation(60);
        assert_eq!(s.best_score(), 100);
        assert!(!s.update_best_score());
    }

    #[test]
    fn test_entry_toll() {
        let mut s = ScoringEngine::new(0, 0);
        assert_eq!(s.apply_entry_toll().after, -1);
    }

    #[test]
    fn test_streak_suppresses_second_hit_on_same_cloud() {
        let mut streak = CloudStreak::new();
        assert!(!streak.observe(NodeId(1)));
        assert!(streak.observe(NodeId(1)));
        assert!(streak.observe(NodeId(1)));
        assert_eq!(streak.repeat_count(), 2);

        assert!(!streak.observe(NodeId(2)));
        assert!(!streak.is_suppressed());
        assert_eq!(streak.repeat_count(), 0);
    }

    #[test]
    fn test_streak_alternating_clouds_never_suppress() {
        let mut streak = CloudStreak::new();
        for i in 0..10 {
            assert!(!streak.observe(NodeId(i % 2)));
        }
    }
}
