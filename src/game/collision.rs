//! Collision System
//!
//! Axis-aligned boxes against the tile grid and against other tagged
//! entities. Detection is discrete (no sweeping): an entity is moved first,
//! then pushed back out of whatever it ended up overlapping, one face per
//! obstacle.
//!
//! Obstacles are resolved one after another and each correction is applied
//! immediately, so later obstacles see the already-corrected box. The order
//! is therefore part of the behaviour:
//! 1. Solid tiles under the entity's footprint, rows outer, columns inner
//! 2. Entities whose groups match, in registry order

use tracing::debug;
use crate::math::Vec3;
use crate::world::{GridRect, TileGrid};
use super::entity::{Entity, EntityId};
use super::event::ContactEvent;

/// Error returned for collider extents that cannot form a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderError {
    /// `local_min >= local_max` on the given axis (0 = x, 1 = y, 2 = z)
    Degenerate { axis: usize, min: f32, max: f32 },
    /// An extent is NaN or infinite
    NonFinite,
}

impl std::fmt::Display for ColliderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColliderError::Degenerate { axis, min, max } => {
                write!(f, "degenerate collider on axis {}: min {} >= max {}", axis, min, max)
            }
            ColliderError::NonFinite => write!(f, "collider extents must be finite"),
        }
    }
}

impl std::error::Error for ColliderError {}

/// One of the six faces of a box, named from the moving box's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Bottom,
    Left,
    Right,
    Top,
    Back,
    Front,
}

impl Face {
    /// Outward normal of this face of the moving box
    pub fn normal(self) -> Vec3 {
        match self {
            Face::Bottom => Vec3::new(0.0, -1.0, 0.0),
            Face::Left => Vec3::new(-1.0, 0.0, 0.0),
            Face::Right => Vec3::new(1.0, 0.0, 0.0),
            Face::Top => Vec3::new(0.0, 1.0, 0.0),
            Face::Back => Vec3::new(0.0, 0.0, -1.0),
            Face::Front => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Axis index the face is perpendicular to
    pub fn axis(self) -> usize {
        match self {
            Face::Left | Face::Right => 0,
            Face::Bottom | Face::Top => 1,
            Face::Back | Face::Front => 2,
        }
    }
}

/// Outcome of a single box-vs-box test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub hit: bool,
    /// Penetration along `normal`
    pub depth: f32,
    /// Face normal of the shallowest penetration (zero when missed)
    pub normal: Vec3,
    pub face: Option<Face>,
}

impl CollisionResult {
    pub const MISS: CollisionResult = CollisionResult {
        hit: false,
        depth: 0.0,
        normal: Vec3::ZERO,
        face: None,
    };

    fn hit(face: Face, depth: f32) -> Self {
        Self {
            hit: true,
            depth,
            normal: face.normal(),
            face: Some(face),
        }
    }
}

/// Axis-aligned box with extents relative to its owner's position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    local_min: Vec3,
    local_max: Vec3,
    /// Owner position, rewritten every tick before resolution
    pub position: Vec3,
}

impl Collider {
    /// Create a collider from local extents. Rejects empty or inverted boxes.
    pub fn new(local_min: Vec3, local_max: Vec3) -> Result<Self, ColliderError> {
        if !local_min.is_finite() || !local_max.is_finite() {
            return Err(ColliderError::NonFinite);
        }
        for axis in 0..3 {
            let (min, max) = (local_min.axis(axis), local_max.axis(axis));
            if min >= max {
                return Err(ColliderError::Degenerate { axis, min, max });
            }
        }
        Ok(Self {
            local_min,
            local_max,
            position: Vec3::ZERO,
        })
    }

    /// Box centred on the owner
    pub fn from_half_extents(half: Vec3) -> Result<Self, ColliderError> {
        Self::new(-half, half)
    }

    pub fn global_min(&self) -> Vec3 {
        self.position + self.local_min
    }

    pub fn global_max(&self) -> Vec3 {
        self.position + self.local_max
    }

    /// World bounds if the owner stood at `position`
    pub fn bounds_at(&self, position: Vec3) -> (Vec3, Vec3) {
        (position + self.local_min, position + self.local_max)
    }

    /// Strict containment: points on the boundary are outside
    pub fn contains(&self, point: Vec3) -> bool {
        let min = self.global_min();
        let max = self.global_max();
        point.x > min.x && point.x < max.x
            && point.y > min.y && point.y < max.y
            && point.z > min.z && point.z < max.z
    }

    /// Open-interval overlap on all three axes. Boxes that only share a face
    /// or an edge do not intersect, which lets a fast mover skip past a box
    /// it merely touches between frames.
    pub fn intersects(&self, other: &Collider) -> bool {
        let (min1, max1) = (self.global_min(), self.global_max());
        let (min2, max2) = (other.global_min(), other.global_max());
        (0..3).all(|axis| max1.axis(axis) > min2.axis(axis) && min1.axis(axis) < max2.axis(axis))
    }

    /// Penetration test against a world-space box.
    ///
    /// Depths are evaluated bottom, left, right, top, back, front. Any
    /// negative depth means the boxes are separated on that axis. Otherwise
    /// the shallowest face wins, earlier faces winning ties. Touching boxes
    /// report a hit with zero depth.
    pub fn collide(&self, other_min: Vec3, other_max: Vec3) -> CollisionResult {
        let min = self.global_min();
        let max = self.global_max();

        let depths = [
            (Face::Bottom, other_max.y - min.y),
            (Face::Left, other_max.x - min.x),
            (Face::Right, max.x - other_min.x),
            (Face::Top, max.y - other_min.y),
            (Face::Back, other_max.z - min.z),
            (Face::Front, max.z - other_min.z),
        ];

        let mut best: Option<(Face, f32)> = None;
        for (face, depth) in depths {
            // NaN fails this comparison too and counts as separated
            if !(depth >= 0.0) {
                return CollisionResult::MISS;
            }
            match best {
                Some((_, min_depth)) if depth >= min_depth => {}
                _ => best = Some((face, depth)),
            }
        }

        match best {
            Some((face, depth)) => CollisionResult::hit(face, depth),
            None => CollisionResult::MISS,
        }
    }

    /// Push the box back out along the result's normal. No-op on a miss.
    pub fn resolve(&mut self, result: &CollisionResult) {
        if !result.hit {
            return;
        }
        self.position = self.position - result.normal * result.depth;
    }
}

/// Where a collision candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Tile { x: i32, y: i32 },
    Entity(EntityId),
}

/// A world-space box an entity may be pushed out of
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub source: CandidateSource,
    pub min: Vec3,
    pub max: Vec3,
}

/// Collect everything `subject` must be resolved against, in resolution
/// order. Entities without a collider get an empty list.
pub fn gather_candidates(grid: &TileGrid, entities: &[Entity], subject: EntityId) -> Vec<Candidate> {
    let Some(entity) = entities.get(subject.index()) else { return Vec::new() };
    let Some(collider) = entity.collider else { return Vec::new() };

    let (min, max) = collider.bounds_at(entity.position);
    let rect = GridRect::covering(min, max);

    let mut candidates: Vec<Candidate> = grid
        .solid_tiles_in(rect)
        .map(|tile| {
            let (min, max) = tile.bounds();
            Candidate {
                source: CandidateSource::Tile { x: tile.x, y: tile.y },
                min,
                max,
            }
        })
        .collect();

    for (i, other) in entities.iter().enumerate() {
        if i == subject.index() || !other.groups.intersects(entity.groups_to_collide) {
            continue;
        }
        if let Some(other_collider) = other.collider {
            let (min, max) = other_collider.bounds_at(other.position);
            candidates.push(Candidate {
                source: CandidateSource::Entity(EntityId::new(i as u32)),
                min,
                max,
            });
        }
    }

    candidates
}

/// Resolve `entity` against `candidates` in order, updating its contact
/// flags and position. Returns one contact per candidate that was hit.
pub fn resolve_against(
    entity: &mut Entity,
    id: EntityId,
    candidates: &[Candidate],
    debug_log: bool,
) -> Vec<ContactEvent> {
    entity.contacts.clear();
    let Some(mut collider) = entity.collider else { return Vec::new() };
    collider.position = entity.position;

    let mut contacts = Vec::new();
    for candidate in candidates {
        let result = collider.collide(candidate.min, candidate.max);
        if let Some(face) = result.face {
            entity.contacts.set(face);
            if debug_log {
                debug!(
                    entity = id.index(),
                    source = ?candidate.source,
                    face = ?face,
                    depth = result.depth,
                    "contact"
                );
            }
            contacts.push(ContactEvent {
                entity: id,
                source: candidate.source,
                face,
                depth: result.depth,
            });
        }
        collider.resolve(&result);
    }

    entity.position = collider.position;
    entity.collider = Some(collider);
    contacts
}

/// Full per-tick resolution for one entity: footprint query, candidate
/// gathering, sequential resolution, position write-back.
pub fn resolve_entity(
    grid: &TileGrid,
    entities: &mut [Entity],
    id: EntityId,
    debug_log: bool,
) -> Vec<ContactEvent> {
    let candidates = gather_candidates(grid, entities, id);
    match entities.get_mut(id.index()) {
        Some(entity) => resolve_against(entity, id, &candidates, debug_log),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::{GroupTag, Groups};
    use crate::world::{TileType, TILE_SIZE};

    fn unit_box_at(position: Vec3) -> Collider {
        let mut c = Collider::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0)).unwrap();
        c.position = position;
        c
    }

    fn player_collider() -> Collider {
        Collider::new(Vec3::new(-1.0, -2.0, -1.0), Vec3::new(1.0, 2.0, 1.0)).unwrap()
    }

    fn grid_from(rows: &[&str]) -> TileGrid {
        let width = rows[0].len();
        let types: Vec<TileType> = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| TileType::from_glyph(c).unwrap()))
            .collect();
        TileGrid::from_types(width, rows.len(), &types)
    }

    #[test]
    fn test_degenerate_collider_rejected() {
        let err = Collider::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)).unwrap_err();
        assert_eq!(err, ColliderError::Degenerate { axis: 1, min: 0.0, max: 0.0 });

        let err = Collider::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, ColliderError::Degenerate { axis: 0, .. }));

        let err = Collider::new(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 1.0)).unwrap_err();
        assert_eq!(err, ColliderError::NonFinite);
    }

    #[test]
    fn test_contains_is_strict() {
        let c = unit_box_at(Vec3::ZERO);
        assert!(c.contains(Vec3::new(1.0, 1.0, 1.0)));
        assert!(!c.contains(Vec3::new(0.0, 1.0, 1.0)));
        assert!(!c.contains(Vec3::new(1.0, 2.0, 1.0)));
        assert!(!c.contains(Vec3::new(1.0, 1.0, 3.0)));
    }

    #[test]
    fn test_intersects_excludes_touching() {
        let a = unit_box_at(Vec3::ZERO);
        let touching = unit_box_at(Vec3::new(2.0, 0.0, 0.0));
        let overlapping = unit_box_at(Vec3::new(1.5, 1.5, -1.5));
        let apart = unit_box_at(Vec3::new(0.0, 5.0, 0.0));

        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(overlapping.intersects(&a));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn test_collide_separated_misses() {
        let a = unit_box_at(Vec3::ZERO);
        let result = a.collide(Vec3::new(3.0, 0.0, 0.0), Vec3::new(5.0, 2.0, 2.0));
        assert_eq!(result, CollisionResult::MISS);
        assert!(!result.hit);
    }

    #[test]
    fn test_collide_picks_minimum_depth() {
        let a = unit_box_at(Vec3::ZERO);
        // Overlaps 0.5 on x from the right, much more on y and z
        let result = a.collide(Vec3::new(1.5, -1.0, -1.0), Vec3::new(4.0, 3.0, 3.0));
        assert!(result.hit);
        assert_eq!(result.face, Some(Face::Right));
        assert_eq!(result.normal, Vec3::new(1.0, 0.0, 0.0));
        assert!((result.depth - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_collide_tie_break_order() {
        let a = unit_box_at(Vec3::ZERO);

        // Identical boxes: every depth is 2, bottom is evaluated first
        let r = a.collide(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(r.face, Some(Face::Bottom));
        assert_eq!(r.depth, 2.0);

        // Other box below-left-behind: bottom, left and back tie at 1
        let r = a.collide(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(r.face, Some(Face::Bottom));

        // Other box above-right-ahead: right, top and front tie at 1
        let r = a.collide(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(r.face, Some(Face::Right));

        // Top and front tie, right is deep
        let r = a.collide(Vec3::new(-1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(r.face, Some(Face::Top));

        // Left and back tie, bottom is deep
        let r = a.collide(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(r.face, Some(Face::Left));

        // Back and front tie, everything else deep
        let r = a.collide(Vec3::new(-5.0, -5.0, 0.5), Vec3::new(5.0, 5.0, 1.5));
        assert_eq!(r.face, Some(Face::Back));
        assert_eq!(r.depth, 1.5);
    }

    #[test]
    fn test_touching_is_zero_depth_hit() {
        let a = unit_box_at(Vec3::new(0.0, 2.0, 0.0));
        // Floor slab directly below
        let r = a.collide(Vec3::new(-5.0, 0.0, -5.0), Vec3::new(5.0, 2.0, 5.0));
        assert!(r.hit);
        assert_eq!(r.face, Some(Face::Bottom));
        assert_eq!(r.depth, 0.0);
    }

    #[test]
    fn test_resolve_leaves_no_residual_on_axis() {
        let cases = [
            (Vec3::new(1.5, -1.0, -1.0), Vec3::new(4.0, 3.0, 3.0)),
            (Vec3::new(-3.0, -1.0, -1.0), Vec3::new(0.25, 3.0, 3.0)),
            (Vec3::new(-3.0, 1.8, -3.0), Vec3::new(5.0, 4.0, 5.0)),
            (Vec3::new(-3.0, -3.0, 1.9), Vec3::new(5.0, 5.0, 4.0)),
        ];
        for (other_min, other_max) in cases {
            let mut a = unit_box_at(Vec3::ZERO);
            let r = a.collide(other_min, other_max);
            let face = r.face.unwrap();
            a.resolve(&r);

            let after = a.collide(other_min, other_max);
            // Same face is now flush; any remaining hit on it is zero depth
            if after.face == Some(face) {
                assert!(after.depth.abs() < 1e-5, "{:?} left {}", face, after.depth);
            }
            let min = a.global_min();
            let max = a.global_max();
            let residual = match face {
                Face::Left | Face::Bottom | Face::Back => other_max.axis(face.axis()) - min.axis(face.axis()),
                Face::Right | Face::Top | Face::Front => max.axis(face.axis()) - other_min.axis(face.axis()),
            };
            assert!(residual.abs() < 1e-5, "{:?} residual {}", face, residual);
        }
    }

    #[test]
    fn test_resolve_miss_is_noop() {
        let mut a = unit_box_at(Vec3::new(1.0, 2.0, 3.0));
        a.resolve(&CollisionResult::MISS);
        assert_eq!(a.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_left_wall_contact_is_flush() {
        // Solid tile at grid (0, 0) spans [0, 8] on x. The entity pokes
        // half a unit into it from the +X side.
        let grid = grid_from(&["#.", ".."]);
        let mut entities = vec![Entity::actor(Vec3::new(8.5, 1.0, 4.0), player_collider())];
        let id = EntityId::new(0);

        let contacts = resolve_entity(&grid, &mut entities, id, false);

        let e = &entities[0];
        assert!(e.contacts.collide_left());
        assert!(!e.contacts.grounded());
        assert!(!e.contacts.collide_right());
        assert!(!e.contacts.collide_top());
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].source, CandidateSource::Tile { x: 0, y: 0 });

        let collider = e.collider.unwrap();
        assert_eq!(collider.position, e.position);
        assert_eq!(collider.global_min().x, TILE_SIZE);
        assert_eq!(e.position, Vec3::new(9.0, 1.0, 4.0));
    }

    #[test]
    fn test_gather_counts_only_footprint_solids() {
        let grid = grid_from(&[
            "#####",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        let collider = Collider::new(Vec3::new(-8.0, -1.0, -5.5), Vec3::new(8.0, 1.0, 5.5)).unwrap();
        let entities = vec![Entity::actor(Vec3::new(17.0, 4.0, 14.5), collider)];

        // World box [9, 25] x [9, 20] covers grid x 1..=3, y 1..=2
        let (min, max) = collider.bounds_at(entities[0].position);
        let rect = GridRect::covering(min, max);
        assert_eq!(rect, GridRect { min_x: 1, min_y: 1, max_x: 3, max_y: 2 });

        let candidates = gather_candidates(&grid, &entities, EntityId::new(0));
        let expected = grid
            .iter()
            .filter(|t| rect.contains(t.x, t.y) && t.tile_type.is_solid())
            .count();
        assert_eq!(candidates.len(), expected);
        assert_eq!(expected, 1);
        assert_eq!(candidates[0].source, CandidateSource::Tile { x: 2, y: 1 });
    }

    #[test]
    fn test_gather_filters_by_group_and_skips_self() {
        let grid = grid_from(&["...", "...", "..."]);
        let mut subject = Entity::actor(Vec3::new(12.0, 4.0, 12.0), player_collider());
        subject.groups = Groups::of(GroupTag::Door);
        subject.groups_to_collide = Groups::of(GroupTag::Door);

        let mut door = Entity::actor(Vec3::new(12.0, 4.0, 14.0), player_collider());
        door.groups = Groups::of(GroupTag::Door);
        let mut other = Entity::actor(Vec3::new(12.0, 4.0, 10.0), player_collider());
        other.groups = Groups::of(GroupTag::Actor);
        let mut no_collider = Entity::actor(Vec3::new(12.0, 4.0, 11.0), player_collider());
        no_collider.groups = Groups::of(GroupTag::Door);
        no_collider.collider = None;

        let entities = vec![subject, other, door, no_collider];
        let candidates = gather_candidates(&grid, &entities, EntityId::new(0));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source, CandidateSource::Entity(EntityId::new(2)));
    }

    #[test]
    fn test_tiles_resolved_before_entities() {
        let grid = grid_from(&["#..", "...", "..."]);
        let mut subject = Entity::actor(Vec3::new(8.5, 4.0, 4.0), player_collider());
        subject.groups_to_collide = Groups::of(GroupTag::Door);
        let mut door = Entity::actor(Vec3::new(10.0, 4.0, 4.0), player_collider());
        door.groups = Groups::of(GroupTag::Door);

        let mut entities = vec![door, subject];
        let candidates = gather_candidates(&grid, &entities, EntityId::new(1));
        assert_eq!(candidates.len(), 2);
        assert!(matches!(candidates[0].source, CandidateSource::Tile { .. }));
        assert_eq!(candidates[1].source, CandidateSource::Entity(EntityId::new(0)));

        let contacts = resolve_against(&mut entities[1], EntityId::new(1), &candidates, false);
        assert_eq!(contacts.len(), 2);
    }

    #[test]
    fn test_later_candidates_see_corrected_position() {
        // The tile pushes the subject +X by half a unit. The actor box only
        // overlapped the subject's original position, so it must miss.
        let grid = grid_from(&["#.", ".."]);
        let mut subject = Entity::actor(Vec3::new(8.5, 4.0, 4.0), player_collider());
        subject.groups_to_collide = Groups::of(GroupTag::Door);
        let half = Vec3::new(0.75, 2.0, 1.0);
        let mut other = Entity::actor(Vec3::new(7.0, 4.0, 4.0), Collider::from_half_extents(half).unwrap());
        other.groups = Groups::of(GroupTag::Door);

        let mut entities = vec![other, subject];
        let before = entities[1].collider.unwrap();
        let other_box = entities[0].collider.unwrap();
        assert!(before.intersects(&other_box));
        let initial = before.collide(other_box.global_min(), other_box.global_max());
        assert_eq!(initial.face, Some(Face::Left));
        assert!((initial.depth - 0.25).abs() < 1e-6);

        let candidates = gather_candidates(&grid, &entities, EntityId::new(1));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].source, CandidateSource::Entity(EntityId::new(0)));

        let contacts = resolve_against(&mut entities[1], EntityId::new(1), &candidates, false);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].source, CandidateSource::Tile { x: 0, y: 0 });
        assert!(contacts.iter().all(|c| c.source != CandidateSource::Entity(EntityId::new(0))));
        assert_eq!(entities[1].position, Vec3::new(9.0, 4.0, 4.0));
        assert!(entities[1].contacts.collide_left());
    }

    #[test]
    fn test_empty_candidates_is_noop() {
        let mut e = Entity::actor(Vec3::new(3.0, 4.0, 5.0), player_collider());
        let contacts = resolve_against(&mut e, EntityId::new(0), &[], false);
        assert!(contacts.is_empty());
        assert_eq!(e.position, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(e.collider.unwrap().position, e.position);
    }
}
