//! Entities
//!
//! An entity is one record in the world's registry. What it can do is
//! decided by what it carries rather than by a type hierarchy:
//! - a collider makes it Collidable
//! - `movable` makes it integrate velocity every physics phase
//! - a model makes it Drawable
//! - a non-inert behaviour gives it a StateMachine logic step
//!
//! Entities are addressed by `EntityId`, their index in the registry. The
//! registry never removes entries while a level is loaded, so ids stay
//! valid for the lifetime of the world.

use std::f32::consts::FRAC_PI_2;
use serde::{Serialize, Deserialize};
use tracing::warn;
use crate::config::{DoorSettings, PlayerSettings};
use crate::input::InputSnapshot;
use crate::math::Vec3;
use crate::world::TILE_SIZE;
use super::collision::{Collider, ColliderError};
use super::components::{Contacts, GroupTag, Groups, Model};
use super::door::{Door, DoorPhase};
use super::player::PlayerController;

/// Index of an entity in the world registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Index into the registry
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Door,
    Actor,
}

/// Per-kind logic step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Player(PlayerController),
    Door(Door),
    /// No logic; velocity is left as set
    Inert,
}

/// Capability flags derived from what an entity carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const MOVABLE: u8 = 1 << 0;
    pub const COLLIDABLE: u8 = 1 << 1;
    pub const DRAWABLE: u8 = 1 << 2;
    pub const STATE_MACHINE: u8 = 1 << 3;

    pub fn movable(self) -> bool {
        self.0 & Self::MOVABLE != 0
    }

    pub fn collidable(self) -> bool {
        self.0 & Self::COLLIDABLE != 0
    }

    pub fn drawable(self) -> bool {
        self.0 & Self::DRAWABLE != 0
    }

    pub fn state_machine(self) -> bool {
        self.0 & Self::STATE_MACHINE != 0
    }
}

/// Everything the logic phase may read besides the entity itself
#[derive(Debug, Clone, Copy)]
pub struct LogicContext<'a> {
    pub input: &'a InputSnapshot,
    /// Player position as resolved at the end of the previous tick
    pub player_position: Vec3,
    pub dt: f32,
    pub player_settings: &'a PlayerSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler angles in radians; only yaw (y) is used
    pub rotation: Vec3,
    pub collider: Option<Collider>,
    /// Groups this entity belongs to
    pub groups: Groups,
    /// Groups whose members this entity is pushed out of
    pub groups_to_collide: Groups,
    pub contacts: Contacts,
    pub behavior: Behavior,
    pub model: Option<Model>,
    pub movable: bool,
}

impl Entity {
    /// Movable box with no behaviour and no groups
    pub fn actor(position: Vec3, mut collider: Collider) -> Self {
        collider.position = position;
        Self {
            kind: EntityKind::Actor,
            position,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            collider: Some(collider),
            groups: Groups::NONE,
            groups_to_collide: Groups::NONE,
            contacts: Contacts::default(),
            behavior: Behavior::Inert,
            model: None,
            movable: true,
        }
    }

    /// First-person player, pushed out of solid tiles and doors
    pub fn player(position: Vec3, settings: &PlayerSettings) -> Result<Self, ColliderError> {
        let collider = Collider::from_half_extents(settings.half_extents)?;
        let mut entity = Self::actor(position, collider);
        entity.kind = EntityKind::Player;
        entity.groups = Groups::of(GroupTag::Player);
        entity.groups_to_collide = Groups::of(GroupTag::Door);
        entity.behavior = Behavior::Player(PlayerController::new());
        Ok(entity)
    }

    /// Sliding door centred on its tile. A block to the left means the
    /// door spans X; otherwise it is turned a quarter and spans Z.
    pub fn door(position: Vec3, left_is_block: bool, settings: &DoorSettings) -> Result<Self, ColliderError> {
        let half = TILE_SIZE * 0.5;
        let thin = TILE_SIZE * 0.125;
        let (yaw, half_extents) = if left_is_block {
            (0.0, Vec3::new(half, half, thin))
        } else {
            (FRAC_PI_2, Vec3::new(thin, half, half))
        };

        let mut collider = Collider::from_half_extents(half_extents)?;
        collider.position = position;

        Ok(Self {
            kind: EntityKind::Door,
            position,
            velocity: Vec3::ZERO,
            rotation: Vec3::new(0.0, yaw, 0.0),
            collider: Some(collider),
            groups: Groups::of(GroupTag::Door),
            groups_to_collide: Groups::NONE,
            contacts: Contacts::default(),
            behavior: Behavior::Door(Door::new(position, yaw, settings)),
            model: Some(Model::Door),
            movable: false,
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut bits = 0;
        if self.movable {
            bits |= Capabilities::MOVABLE;
        }
        if self.collider.is_some() {
            bits |= Capabilities::COLLIDABLE;
        }
        if self.model.is_some() {
            bits |= Capabilities::DRAWABLE;
        }
        if !matches!(self.behavior, Behavior::Inert) {
            bits |= Capabilities::STATE_MACHINE;
        }
        Capabilities(bits)
    }

    pub fn player_controller(&self) -> Option<&PlayerController> {
        match &self.behavior {
            Behavior::Player(controller) => Some(controller),
            _ => None,
        }
    }

    /// Logic phase. Sets velocity and advances state machines; never moves
    /// the entity. Returns a door phase change, if any.
    pub fn logic(&mut self, ctx: &LogicContext) -> Option<DoorPhase> {
        match &mut self.behavior {
            Behavior::Player(controller) => {
                self.velocity = controller.logic(ctx.input, ctx.dt, ctx.player_settings);
                self.rotation.y = controller.yaw();
                None
            }
            Behavior::Door(door) => door.update(ctx.player_position, ctx.dt),
            Behavior::Inert => None,
        }
    }

    /// Physics phase, movement half: `position += velocity * dt` with
    /// numeric sanity checks. Doors instead snap to their animated offset.
    pub fn integrate(&mut self, id: EntityId, dt: f32) {
        if let Behavior::Door(door) = &self.behavior {
            self.position = door.position();
            self.sync_collider();
            return;
        }
        if !self.movable {
            return;
        }

        if !self.velocity.is_finite() {
            warn!(entity = id.index(), kind = ?self.kind, velocity = ?self.velocity, "non-finite velocity, zeroing");
            self.velocity = Vec3::ZERO;
        }

        let next = self.position + self.velocity * dt;
        if !next.is_finite() {
            warn!(entity = id.index(), kind = ?self.kind, position = ?self.position, "non-finite position after integration, reverting");
            return;
        }
        self.position = next;
        self.sync_collider();
    }

    /// Copy the entity position into its collider
    pub fn sync_collider(&mut self) {
        if let Some(collider) = &mut self.collider {
            collider.position = self.position;
        }
    }
}
