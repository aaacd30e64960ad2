//! Drop lifecycle: at most one drop exists at a time
//!
//! `Idle -> Active -> Idle`. Refused transitions come back as [`DropError`]
//! values and leave the state untouched.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::NodeId;
use crate::consts::*;
use crate::level::LevelConfig;

/// Why a lifecycle transition was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DropError {
    #[error("a drop is already active")]
    AlreadyActive,
    #[error("no drop is active")]
    NotActive,
}

/// Spawn parameters for one drop, handed to the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub id: NodeId,
    /// Horizontal offset from the centre line
    pub offset_x: f32,
    /// Physics body diameter
    pub body_diameter: f32,
    /// Rendered sprite edge length
    pub sprite_size: f32,
}

impl Droplet {
    /// Roll a new drop for the given level
    pub fn roll(id: NodeId, config: &LevelConfig, rng: &mut impl Rng) -> Self {
        let spread = config.drop_diameter * DROP_SPAWN_SPREAD;
        let offset_x = if spread > 0.0 {
            rng.random_range(-spread..=spread)
        } else {
            0.0
        };
        Self {
            id,
            offset_x,
            body_diameter: config.drop_diameter,
            sprite_size: config.drop_diameter * sprite_scale(config.level_index),
        }
    }
}

/// Sprite size multiplier; steps up at `LARGE_DROP_LEVEL`
pub fn sprite_scale(level_index: u32) -> f32 {
    if level_index < LARGE_DROP_LEVEL {
        SMALL_DROP_SCALE
    } else {
        LARGE_DROP_SCALE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DropState {
    #[default]
    Idle,
    Active(Droplet),
}

/// Drop state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropLifecycle {
    state: DropState,
    /// Total drops spawned this level
    spawned: u32,
}

impl DropLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DropState::Active(_))
    }

    /// The live drop, if any
    pub fn active(&self) -> Option<&Droplet> {
        match &self.state {
            DropState::Active(drop) => Some(drop),
            DropState::Idle => None,
        }
    }

    pub fn state(&self) -> DropState {
        self.state
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// `Idle -> Active`
    pub fn spawn(&mut self, drop: Droplet) -> Result<&Droplet, DropError> {
        if self.is_active() {
            return Err(DropError::AlreadyActive);
        }
        self.state = DropState::Active(drop);
        self.spawned += 1;
        self.active().ok_or(DropError::NotActive)
    }

    /// `Active -> Idle` after the drop reached a target. Returns the drop
    /// that has to be removed from the scene.
    pub fn on_target_contact(&mut self) -> Result<Droplet, DropError> {
        self.take()
    }

    /// `Active -> Idle -> Active` with a fresh drop. Returns the replaced drop.
    /// Idle drops are not refreshed.
    pub fn manual_refresh(&mut self, replacement: Droplet) -> Result<Droplet, DropError> {
        let old = self.take()?;
        self.spawn(replacement)?;
        Ok(old)
    }

    fn take(&mut self) -> Result<Droplet, DropError> {
        match std::mem::take(&mut self.state) {
            DropState::Active(drop) => Ok(drop),
            DropState::Idle => Err(DropError::NotActive),
        }
    }
}
