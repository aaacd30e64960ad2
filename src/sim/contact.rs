//! Classification of physics contacts reported by the scene

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::NodeId;

/// Physics body category as tagged by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyCategory {
    Drop,
    /// Aim marker, fire or smoke
    Target,
    /// Clouds of either flavour
    Obstacle,
}

impl BodyCategory {
    /// Category bitmask used by the physics collaborator
    pub fn bits(self) -> u32 {
        match self {
            BodyCategory::Drop => 0x1,
            BodyCategory::Target => 0x1 << 1,
            BodyCategory::Obstacle => 0x1 << 2,
        }
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0x1 => Some(BodyCategory::Drop),
            0x2 => Some(BodyCategory::Target),
            0x4 => Some(BodyCategory::Obstacle),
            _ => None,
        }
    }
}

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBody {
    pub category: BodyCategory,
    pub node: NodeId,
}

/// Contact as delivered by the physics simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub a: ContactBody,
    pub b: ContactBody,
    pub position: Vec2,
}

impl ContactEvent {
    pub fn new(a: ContactBody, b: ContactBody, position: Vec2) -> Self {
        Self { a, b, position }
    }
}

/// What a contact means for the level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    DropTarget { drop: NodeId, target: NodeId },
    DropCloud { drop: NodeId, cloud: NodeId },
    Ignored,
}

/// Sort a contact into drop/target, drop/cloud or noise. Body order does not matter.
pub fn classify(contact: &ContactEvent) -> ContactKind {
    let (drop, other) = match (contact.a.category, contact.b.category) {
        (BodyCategory::Drop, BodyCategory::Drop) => return ContactKind::Ignored,
        (BodyCategory::Drop, _) => (contact.a, contact.b),
        (_, BodyCategory::Drop) => (contact.b, contact.a),
        _ => return ContactKind::Ignored,
    };

    match other.category {
        BodyCategory::Target => ContactKind::DropTarget {
            drop: drop.node,
            target: other.node,
        },
        BodyCategory::Obstacle => ContactKind::DropCloud {
            drop: drop.node,
            cloud: other.node,
        },
        BodyCategory::Drop => ContactKind::Ignored,
    }
}
