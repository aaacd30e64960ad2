//! Player record across levels
//!
//! Tracks score, level, best score and action counters, and decides what a
//! completed level means for the campaign.

use serde::{Deserialize, Serialize};

use crate::consts::{ENTRY_TOLL, FINAL_LEVEL};

/// What gets persisted after every score change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub score: i64,
    pub level: u32,
    pub best_score: i64,
    #[serde(default)]
    pub evaporation_count: u32,
    #[serde(default)]
    pub turbulence_count: u32,
}

/// Pure sink for progress snapshots
pub trait ProgressSink {
    fn record(&mut self, snapshot: &ProgressSnapshot);
}

/// How a completed level resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// Positive score: move on to `next_level`
    Advance { next_level: u32 },
    /// Positive score on the last level
    Finished,
    /// No positive score: replay the level. A negative score is rolled back
    /// to the score saved at level start; zero is kept as is.
    Retry { restored_score: i64 },
}

impl LevelOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, LevelOutcome::Retry { .. })
    }
}

/// Player record plus the score banked when the current level started
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub snapshot: ProgressSnapshot,
    /// Score at the start of the current level
    saved_score: i64,
}

impl PlayerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a persisted snapshot
    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            snapshot,
            saved_score: snapshot.score,
        }
    }

    pub fn level(&self) -> u32 {
        self.snapshot.level
    }

    pub fn score(&self) -> i64 {
        self.snapshot.score
    }

    pub fn saved_score(&self) -> i64 {
        self.saved_score
    }

    /// Bank the current score as the retry point for the level about to start
    pub fn begin_level(&mut self) {
        self.saved_score = self.snapshot.score;
    }

    /// Fold a live snapshot from the running level into the record. The
    /// live counters are campaign totals (see
    /// `LevelEconomyController::with_campaign_counters`).
    pub fn absorb(&mut self, live: &ProgressSnapshot) {
        self.snapshot.score = live.score;
        self.snapshot.level = live.level;
        self.snapshot.best_score = self.snapshot.best_score.max(live.best_score).max(live.score);
        self.snapshot.evaporation_count = live.evaporation_count;
        self.snapshot.turbulence_count = live.turbulence_count;
    }

    /// Resolve a finished level and move the record on accordingly
    pub fn complete_level(&mut self, score: i64, level: u32) -> LevelOutcome {
        self.snapshot.score = score;
        self.snapshot.level = level;
        self.snapshot.best_score = self.snapshot.best_score.max(score);

        let outcome = if score > 0 {
            if level < FINAL_LEVEL {
                LevelOutcome::Advance {
                    next_level: level + 1,
                }
            } else {
                LevelOutcome::Finished
            }
        } else if score < 0 {
            LevelOutcome::Retry {
                restored_score: self.saved_score,
            }
        } else {
            LevelOutcome::Retry { restored_score: score }
        };

        match outcome {
            LevelOutcome::Advance { next_level } => self.snapshot.level = next_level,
            LevelOutcome::Finished => self.snapshot.level = FINAL_LEVEL + 1,
            LevelOutcome::Retry { restored_score } => self.snapshot.score = restored_score,
        }
        outcome
    }

    /// Whether every level has been cleared
    pub fn campaign_finished(&self) -> bool {
        self.snapshot.level > FINAL_LEVEL
    }
}

/// Score shown on the completion screen. The entry toll is handed back on
/// every level except the last.
pub fn display_score(score: i64, level: u32) -> i64 {
    if level < FINAL_LEVEL {
        score + ENTRY_TOLL
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_score_advances() {
        let mut progress = PlayerProgress::new();
        progress.begin_level();
        let outcome = progress.complete_level(42, 2);
        assert_eq!(outcome, LevelOutcome::Advance { next_level: 3 });
        assert!(outcome.is_success());
        assert_eq!(progress.level(), 3);
        assert_eq!(progress.score(), 42);
        assert_eq!(progress.snapshot.best_score, 42);
    }

    #[test]
    fn test_non_positive_score_retries_from_saved() {
        let mut progress = PlayerProgress::from_snapshot(ProgressSnapshot {
            score: 120,
            level: 4,
            best_score: 300,
            ..Default::default()
        });
        progress.begin_level();

        assert_eq!(
            progress.complete_level(-15, 4),
            LevelOutcome::Retry { restored_score: 120 }
        );
        assert_eq!(progress.level(), 4);
        assert_eq!(progress.score(), 120);

    }

    #[test]
    fn test_zero_score_replays_keeping_zero() {
        let mut progress = PlayerProgress::from_snapshot(ProgressSnapshot {
            score: 120,
            level: 4,
            best_score: 300,
            ..Default::default()
        });
        progress.begin_level();

        let outcome = progress.complete_level(0, 4);
        assert_eq!(outcome, LevelOutcome::Retry { restored_score: 0 });
        assert!(!outcome.is_success());
        assert_eq!(progress.level(), 4);
        assert_eq!(progress.score(), 0);
    }

    #[test]
    fn test_last_level_finishes_campaign() {
        let mut progress = PlayerProgress::new();
        assert_eq!(progress.complete_level(10, FINAL_LEVEL), LevelOutcome::Finished);
        assert!(progress.campaign_finished());
    }

    #[test]
    fn test_absorb_keeps_best() {
        let mut progress = PlayerProgress::new();
        progress.absorb(&ProgressSnapshot {
            score: 80,
            level: 1,
            best_score: 80,
            evaporation_count: 2,
            turbulence_count: 5,
        });
        progress.absorb(&ProgressSnapshot {
            score: 10,
            level: 1,
            best_score: 0,
            evaporation_count: 3,
            turbulence_count: 5,
        });
        assert_eq!(progress.snapshot.best_score, 80);
        assert_eq!(progress.snapshot.evaporation_count, 3);
    }

    #[test]
    fn test_display_score_returns_toll() {
        assert_eq!(display_score(41, 2), 42);
        assert_eq!(display_score(41, FINAL_LEVEL), 41);
    }
}
