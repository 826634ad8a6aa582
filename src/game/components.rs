//! Game Components
//!
//! Plain data attached to entities: collision group masks, contact flags,
//! render models and lights. Behaviour lives in the systems that read them.

use serde::{Serialize, Deserialize};
use crate::math::Vec3;
use crate::world::TILE_SIZE;
use super::collision::Face;

// =============================================================================
// Collision Groups
// =============================================================================

/// Closed set of collision group tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupTag {
    /// The controllable first-person entity
    Player,
    /// Sliding doors
    Door,
    /// Any other moving actor
    Actor,
}

impl GroupTag {
    fn bit(self) -> u32 {
        match self {
            GroupTag::Player => 1 << 0,
            GroupTag::Door => 1 << 1,
            GroupTag::Actor => 1 << 2,
        }
    }
}

/// Bitmask of group tags, O(1) membership and overlap tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Groups(pub u32);

impl Groups {
    pub const NONE: Self = Self(0);

    pub fn of(tag: GroupTag) -> Self {
        Self(tag.bit())
    }

    /// True if the two masks share at least one tag
    pub fn intersects(self, other: Groups) -> bool {
        self.0 & other.0 != 0
    }
}

// =============================================================================
// Contact Flags
// =============================================================================

/// Which faces of an entity's box touched something during its last
/// resolution pass. Cleared at the start of every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Contacts(u8);

impl Contacts {
    fn bit(face: Face) -> u8 {
        match face {
            Face::Bottom => 1 << 0,
            Face::Left => 1 << 1,
            Face::Right => 1 << 2,
            Face::Top => 1 << 3,
            Face::Back => 1 << 4,
            Face::Front => 1 << 5,
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn set(&mut self, face: Face) {
        self.0 |= Self::bit(face);
    }

    pub fn has(self, face: Face) -> bool {
        self.0 & Self::bit(face) != 0
    }

    /// Standing on something
    pub fn grounded(self) -> bool {
        self.has(Face::Bottom)
    }

    pub fn collide_left(self) -> bool {
        self.has(Face::Left)
    }

    pub fn collide_right(self) -> bool {
        self.has(Face::Right)
    }

    pub fn collide_top(self) -> bool {
        self.has(Face::Top)
    }

    pub fn collide_back(self) -> bool {
        self.has(Face::Back)
    }

    pub fn collide_front(self) -> bool {
        self.has(Face::Front)
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Models the renderer knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    /// One tile wide, one tile high, a quarter tile thick
    Door,
}

impl Model {
    /// Unrotated model size (x, y, z)
    pub fn size(self) -> Vec3 {
        match self {
            Model::Door => Vec3::new(TILE_SIZE, TILE_SIZE, TILE_SIZE * 0.25),
        }
    }
}

/// Ceiling point light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub intensity: f32,
    pub color: [f32; 3],
}

impl Light {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            intensity: 1.0,
            color: [1.0, 0.95, 0.8],
        }
    }

    /// Brightness as seen from `viewer`: falls off with distance, capped
    pub fn intensity_from(&self, viewer: Vec3) -> f32 {
        let distance = self.position.distance(viewer);
        if distance <= 0.0 {
            return TILE_SIZE * 0.2;
        }
        (3.0 * TILE_SIZE / distance).min(TILE_SIZE * 0.2)
    }
}
