//! Wildfire (target) counter that gates level completion

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::EXTINGUISH_CYCLE;

/// Kinds of extinguishable target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Invisible aim marker
    Aim,
    /// Fire emitter
    Fire,
    /// Smoke emitter
    Smoke,
}

impl TargetKind {
    /// The kinds a burnt-out spot can flare back up as
    pub const RESPAWNABLE: [TargetKind; 2] = [TargetKind::Fire, TargetKind::Smoke];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WildfireError {
    #[error("no wildfires left to extinguish")]
    Exhausted,
}

/// Outcome of one successful extinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extinguished {
    /// Targets left after this one
    pub remaining: u32,
    /// This contact closed an extinguish cycle; a fire should come back
    pub respawn_due: bool,
    /// This contact put out the last target (reported once per level)
    pub level_completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WildfireTracker {
    remaining: u32,
    /// Successful contacts since the last respawn (0..EXTINGUISH_CYCLE)
    cycle: u8,
    completed: bool,
}

impl WildfireTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn cycle_counter(&self) -> u8 {
        self.cycle
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Count one freshly placed target
    pub fn register(&mut self) {
        self.remaining += 1;
    }

    /// Put out one target
    pub fn extinguish(&mut self) -> Result<Extinguished, WildfireError> {
        if self.remaining == 0 {
            return Err(WildfireError::Exhausted);
        }
        self.remaining -= 1;

        self.cycle += 1;
        let respawn_due = self.cycle >= EXTINGUISH_CYCLE;
        if respawn_due {
            self.cycle = 0;
        }

        let level_completed = self.remaining == 0 && !self.completed;
        if level_completed {
            self.completed = true;
        }

        Ok(Extinguished {
            remaining: self.remaining,
            respawn_due,
            level_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(targets: u32) -> WildfireTracker {
        let mut t = WildfireTracker::new();
        for _ in 0..targets {
            t.register();
        }
        t
    }

    #[test]
    fn test_counts_down_and_completes_once() {
        let mut t = tracker_with(2);

        let first = t.extinguish().unwrap();
        assert_eq!(first.remaining, 1);
        assert!(!first.level_completed);

        let last = t.extinguish().unwrap();
        assert_eq!(last.remaining, 0);
        assert!(last.level_completed);
        assert!(t.is_completed());

        assert_eq!(t.extinguish(), Err(WildfireError::Exhausted));
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn test_respawn_every_third_contact() {
        let mut t = tracker_with(10);
        let due: Vec<bool> = (0..9).map(|_| t.extinguish().unwrap().respawn_due).collect();
        assert_eq!(
            due,
            vec![false, false, true, false, false, true, false, false, true]
        );
        assert_eq!(t.cycle_counter(), 0);
    }

    #[test]
    fn test_refill_after_completion_does_not_complete_again() {
        let mut t = tracker_with(1);
        assert!(t.extinguish().unwrap().level_completed);

        t.register();
        let again = t.extinguish().unwrap();
        assert_eq!(again.remaining, 0);
        assert!(!again.level_completed);
    }

    #[test]
    fn test_empty_tracker_refuses() {
        let mut t = WildfireTracker::new();
        assert_eq!(t.extinguish(), Err(WildfireError::Exhausted));
        assert_eq!(t.cycle_counter(), 0);
    }
}
