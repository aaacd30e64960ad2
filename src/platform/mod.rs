//! Platform abstraction layer
//!
//! Contracts for the collaborators a level talks to:
//! - [`Scene`]: node placement/removal, gravity, impulses, cosmetic effects
//! - [`Accelerometer`]: per-tick sensor sample for sensor-driven levels
//!
//! [`HeadlessScene`] is an in-memory scene used by the native driver and tests.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;

use crate::sim::{Droplet, NodeId, ObstacleKind, TargetKind};

/// Cosmetic effects the level asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Rain burst on a rewarded cloud hit
    Rain,
    /// Steam puff where a target went out
    Steam,
    /// Pulse animation on the cloud that was hit
    Pulse,
}

/// Scene/physics collaborator
pub trait Scene {
    fn place_cloud(&mut self, id: NodeId, position: Vec2, kind: ObstacleKind);

    /// Place a target. Returns false when the target's asset is unavailable
    /// and nothing was placed.
    fn place_target(&mut self, id: NodeId, position: Vec2, kind: TargetKind) -> bool;

    fn spawn_drop(&mut self, drop: &Droplet);

    fn remove_node(&mut self, id: NodeId);

    /// Flavour of an obstacle node, or `None` if it no longer exists
    fn obstacle_kind(&self, id: NodeId) -> Option<ObstacleKind>;

    fn set_gravity(&mut self, gravity: Vec2);

    fn apply_impulse(&mut self, id: NodeId, impulse: Vec2);

    /// Play a cosmetic effect. Returns false if its asset is unavailable.
    fn play_effect(&mut self, effect: Effect, position: Vec2) -> bool;
}

/// Sensor collaborator
pub trait Accelerometer {
    /// Latest acceleration sample, if one is available this tick
    fn sample(&mut self) -> Option<Vec2>;
}

/// Fixed sample, useful for tests and the headless driver
impl Accelerometer for Option<Vec2> {
    fn sample(&mut self) -> Option<Vec2> {
        *self
    }
}

/// A node held by [`HeadlessScene`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneNode {
    Cloud { position: Vec2, kind: ObstacleKind },
    Target { position: Vec2, kind: TargetKind },
    Drop { position: Vec2 },
}

impl SceneNode {
    pub fn position(&self) -> Vec2 {
        match self {
            SceneNode::Cloud { position, .. }
            | SceneNode::Target { position, .. }
            | SceneNode::Drop { position } => *position,
        }
    }
}

/// In-memory scene without rendering or physics
#[derive(Debug, Default)]
pub struct HeadlessScene {
    pub nodes: BTreeMap<NodeId, SceneNode>,
    pub gravity: Vec2,
    /// Every impulse applied, in order
    pub impulses: Vec<(NodeId, Vec2)>,
    /// Every effect played, in order
    pub effects: Vec<(Effect, Vec2)>,
    /// Target kinds whose assets are "missing"
    pub missing_targets: HashSet<TargetKind>,
    /// Effects whose assets are "missing"
    pub missing_effects: HashSet<Effect>,
    /// Height at which drops appear
    pub drop_spawn_y: f32,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self {
            drop_spawn_y: 600.0,
            ..Self::default()
        }
    }

    pub fn clouds(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .filter(|(_, n)| matches!(n, SceneNode::Cloud { .. }))
            .map(|(id, n)| (*id, n))
    }

    pub fn targets(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .filter(|(_, n)| matches!(n, SceneNode::Target { .. }))
            .map(|(id, n)| (*id, n))
    }

    /// The drop currently in the scene, if any
    pub fn drop_node(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| matches!(n, SceneNode::Drop { .. }))
            .map(|(id, _)| *id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }
}

impl Scene for HeadlessScene {
    fn place_cloud(&mut self, id: NodeId, position: Vec2, kind: ObstacleKind) {
        self.nodes.insert(id, SceneNode::Cloud { position, kind });
    }

    fn place_target(&mut self, id: NodeId, position: Vec2, kind: TargetKind) -> bool {
        if self.missing_targets.contains(&kind) {
            return false;
        }
        self.nodes.insert(id, SceneNode::Target { position, kind });
        true
    }

    fn spawn_drop(&mut self, drop: &Droplet) {
        let position = Vec2::new(drop.offset_x, self.drop_spawn_y);
        self.nodes.insert(drop.id, SceneNode::Drop { position });
    }

    fn remove_node(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    fn obstacle_kind(&self, id: NodeId) -> Option<ObstacleKind> {
        match self.nodes.get(&id) {
            Some(SceneNode::Cloud { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn apply_impulse(&mut self, id: NodeId, impulse: Vec2) {
        self.impulses.push((id, impulse));
    }

    fn play_effect(&mut self, effect: Effect, position: Vec2) -> bool {
        if self.missing_effects.contains(&effect) {
            return false;
        }
        self.effects.push((effect, position));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_target_asset_places_nothing() {
        let mut scene = HeadlessScene::new();
        scene.missing_targets.insert(TargetKind::Smoke);

        assert!(scene.place_target(NodeId(1), Vec2::ZERO, TargetKind::Fire));
        assert!(!scene.place_target(NodeId(2), Vec2::ZERO, TargetKind::Smoke));
        assert_eq!(scene.targets().count(), 1);
    }

    #[test]
    fn test_obstacle_kind_only_for_clouds() {
        let mut scene = HeadlessScene::new();
        scene.place_cloud(NodeId(1), Vec2::ZERO, ObstacleKind::StormCloud);
        scene.place_target(NodeId(2), Vec2::ZERO, TargetKind::Aim);

        assert_eq!(scene.obstacle_kind(NodeId(1)), Some(ObstacleKind::StormCloud));
        assert_eq!(scene.obstacle_kind(NodeId(2)), None);
        scene.remove_node(NodeId(1));
        assert_eq!(scene.obstacle_kind(NodeId(1)), None);
    }
}
