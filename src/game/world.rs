//! Game World
//!
//! The World is the loaded level: the immutable tile grid, the entity
//! registry, the lights and the camera view. It owns all of them and
//! advances them one tick at a time.
//!
//! A tick has two phases:
//! 1. Logic: every entity decides its velocity or advances its state
//!    machine. Nothing moves, so every entity reads the positions the
//!    previous tick resolved.
//! 2. Physics: every entity moves, then movable colliders are pushed out
//!    of whatever they overlap, in registry order.
//!
//! The camera is synced from the player after both phases.

use tracing::{debug, info};
use crate::config::Settings;
use crate::input::InputSnapshot;
use crate::math::Vec3;
use crate::world::{LevelError, LevelMap, Tile, TileGrid, TileType, TILE_SIZE};
use super::collision::resolve_entity;
use super::components::Light;
use super::entity::{Entity, EntityId, LogicContext};
use super::event::{DoorEvent, Events};

/// Where the renderer looks from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::FORWARD,
        }
    }
}

pub struct World {
    pub name: String,
    grid: TileGrid,
    /// Registry; index order is spawn order and resolution order
    entities: Vec<Entity>,
    lights: Vec<Light>,
    player: EntityId,
    pub camera: CameraView,
    /// Events of the most recent tick
    pub events: Events,
    settings: Settings,
    /// Log every contact at debug level
    pub debug_collisions: bool,
    ticks: u64,
}

impl World {
    /// Build a world from a decoded map. Marker tiles spawn their entity or
    /// light and become floor. Exactly one player spawn is required.
    pub fn from_map(map: &LevelMap, settings: &Settings) -> Result<Self, LevelError> {
        let spawns = map.count(TileType::PlayerSpawn);
        if spawns != 1 {
            return Err(LevelError::ValidationError(format!(
                "level needs exactly one player spawn, found {}", spawns
            )));
        }

        let mut types = Vec::with_capacity(map.width() * map.height());
        let mut entities = Vec::new();
        let mut lights = Vec::new();
        let mut player = None;

        for (i, &tile_type) in map.tiles().iter().enumerate() {
            let (x, y) = ((i % map.width()) as i32, (i / map.width()) as i32);
            let center = Tile::new(tile_type, x, y).center();

            match tile_type {
                TileType::PlayerSpawn => {
                    let entity = Entity::player(center, &settings.player)
                        .map_err(|e| LevelError::ValidationError(format!("player collider: {}", e)))?;
                    player = Some(EntityId::new(entities.len() as u32));
                    entities.push(entity);
                }
                TileType::Door => {
                    let left_is_block = map.get(x - 1, y) == Some(TileType::Block);
                    let entity = Entity::door(center, left_is_block, &settings.door)
                        .map_err(|e| LevelError::ValidationError(format!("door collider: {}", e)))?;
                    entities.push(entity);
                }
                TileType::Light => {
                    lights.push(Light::new(Vec3::new(center.x, TILE_SIZE * 1.25, center.z)));
                }
                TileType::Empty | TileType::Block => {}
            }

            types.push(if tile_type.is_marker() { TileType::Empty } else { tile_type });
        }

        let player = player.ok_or_else(|| LevelError::ValidationError("no player spawn".to_string()))?;
        let grid = TileGrid::from_types(map.width(), map.height(), &types);

        info!(
            level = %map.name,
            width = map.width(),
            height = map.height(),
            entities = entities.len(),
            lights = lights.len(),
            "world built"
        );

        let mut world = Self {
            name: map.name.clone(),
            grid,
            entities,
            lights,
            player,
            camera: CameraView::default(),
            events: Events::new(),
            settings: *settings,
            debug_collisions: false,
            ticks: 0,
        };
        world.sync_camera();
        Ok(world)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Bounds-checked tile lookup
    pub fn get_tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.grid.get_tile_at(x, y)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn player(&self) -> &Entity {
        &self.entities[self.player.index()]
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of completed updates
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance one tick of `dt` seconds
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) {
        self.events.clear_all();
        self.logic_phase(input, dt);
        self.physics_phase(dt);
        self.sync_camera();
        self.ticks += 1;
    }

    fn logic_phase(&mut self, input: &InputSnapshot, dt: f32) {
        let ctx = LogicContext {
            input,
            player_position: self.player().position,
            dt,
            player_settings: &self.settings.player,
        };

        for (i, entity) in self.entities.iter_mut().enumerate() {
            if !entity.capabilities().state_machine() {
                continue;
            }
            if let Some(phase) = entity.logic(&ctx) {
                let door = EntityId::new(i as u32);
                debug!(door = i, phase = ?phase, "door phase");
                self.events.doors.send(DoorEvent { door, phase });
            }
        }
    }

    fn physics_phase(&mut self, dt: f32) {
        for i in 0..self.entities.len() {
            let id = EntityId::new(i as u32);
            let entity = &mut self.entities[i];
            entity.integrate(id, dt);

            let caps = entity.capabilities();
            if caps.movable() && caps.collidable() {
                let contacts = resolve_entity(&self.grid, &mut self.entities, id, self.debug_collisions);
                self.events.contacts.extend(contacts);
            }
        }
    }

    fn sync_camera(&mut self) {
        let player = &self.entities[self.player.index()];
        self.camera.position = player.position;
        if let Some(controller) = player.player_controller() {
            self.camera.direction = controller.dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::collision::CandidateSource;
    use crate::game::components::Contacts;
    use crate::game::door::{Door, DoorPhase};
    use crate::game::entity::Behavior;
    use crate::input::Action;
    use crate::world::{load_level_map_from_str, DEMO_LEVEL};

    fn door_of(entity: &Entity) -> Option<&Door> {
        match &entity.behavior {
            Behavior::Door(door) => Some(door),
            _ => None,
        }
    }

    fn world_from(rows: &[&str]) -> World {
        let map = LevelMap::from_ascii("test", rows).unwrap();
        World::from_map(&map, &Settings::default()).unwrap()
    }

    #[test]
    fn test_demo_world() {
        let map = load_level_map_from_str(DEMO_LEVEL).unwrap();
        let world = World::from_map(&map, &Settings::default()).unwrap();

        assert_eq!(world.entities().len(), 2);
        assert_eq!(world.lights().len(), 3);
        assert_eq!(world.player().position, Vec3::new(12.0, 4.0, 12.0));
        assert_eq!(world.camera.position, world.player().position);

        // Markers become floor
        assert_eq!(world.get_tile_at(1, 1).map(|t| t.tile_type), Some(TileType::Empty));
        assert_eq!(world.get_tile_at(4, 3).map(|t| t.tile_type), Some(TileType::Empty));
        assert_eq!(world.get_tile_at(3, 3).map(|t| t.tile_type), Some(TileType::Block));
        assert!(world.get_tile_at(-1, 0).is_none());
        assert!(world.get_tile_at(10, 0).is_none());

        // Door at (4, 3) has a block to its left
        let door = world.entities().iter().find(|e| door_of(e).is_some()).unwrap();
        assert_eq!(door.rotation.y, 0.0);
        assert_eq!(door.position, Vec3::new(36.0, 4.0, 28.0));

        assert_eq!(world.lights()[0].position, Vec3::new(52.0, 10.0, 12.0));
    }

    #[test]
    fn test_player_spawn_count_validated() {
        let map = LevelMap::from_ascii("none", &["###", "#.#", "###"]).unwrap();
        let err = World::from_map(&map, &Settings::default()).err().unwrap();
        assert!(matches!(err, LevelError::ValidationError(_)));

        let map = LevelMap::from_ascii("two", &["####", "#PP#", "####"]).unwrap();
        let err = World::from_map(&map, &Settings::default()).err().unwrap();
        assert!(matches!(err, LevelError::ValidationError(_)));
    }

    #[test]
    fn test_player_stops_flush_against_wall() {
        let mut world = world_from(&["#####", "#P..#", "#####"]);
        let left = InputSnapshot::new().holding(Action::StrafeLeft);

        for _ in 0..20 {
            world.update(&left, 0.05);
        }

        let player = world.player();
        assert!((player.position.x - 9.0).abs() < 1e-3, "x = {}", player.position.x);
        assert!(player.contacts.collide_left());
        assert!(!player.contacts.collide_right());
        assert!(world
            .events
            .contacts
            .iter()
            .any(|c| c.source == CandidateSource::Tile { x: 0, y: 1 }));
        assert_eq!(world.ticks(), 20);
    }

    #[test]
    fn test_idle_player_stays_put() {
        let mut world = world_from(&["#####", "#P..#", "#####"]);
        for _ in 0..10 {
            world.update(&InputSnapshot::new(), 0.05);
        }
        assert_eq!(world.player().position, Vec3::new(12.0, 4.0, 12.0));
        assert_eq!(world.player().contacts, Contacts::default());
        assert!(world.events.contacts.is_empty());
    }

    #[test]
    fn test_door_blocks_then_lets_player_through() {
        // Door at (3, 1) has floor to its left, so it spans Z and slides
        // along Z out of the corridor.
        let mut world = world_from(&["######", "#P.D.#", "######"]);
        let door_id = EntityId::new(1);
        let right = InputSnapshot::new().holding(Action::StrafeRight);

        let mut phases = Vec::new();
        let mut hit_door = false;
        for _ in 0..120 {
            world.update(&right, 0.05);
            phases.extend(world.events.doors.iter().map(|e| e.phase));
            hit_door |= world
                .events
                .contacts
                .iter()
                .any(|c| c.source == CandidateSource::Entity(door_id));

            let door = door_of(&world.entities()[door_id.index()]).unwrap();
            assert!(door.offset >= 0.0 && door.offset <= door.max_offset);
        }

        assert!(hit_door);
        assert_eq!(&phases[..2], &[DoorPhase::Opening, DoorPhase::Open]);
        assert!(phases.contains(&DoorPhase::Closing));

        // Walked through the doorway to the far wall
        let player = world.player();
        assert!((player.position.x - 39.0).abs() < 1e-3, "x = {}", player.position.x);
        assert!(player.contacts.collide_right());
    }

    #[test]
    fn test_logic_reads_previous_positions() {
        // The door sees where the player was at the end of the last tick,
        // so it starts opening one tick after the player enters its radius.
        let mut world = world_from(&["######", "#P.D.#", "######"]);
        let right = InputSnapshot::new().holding(Action::StrafeRight);
        let radius = world.settings().door.trigger_radius();
        let door_base = Vec3::new(28.0, 4.0, 12.0);

        let mut entered_at = None;
        let mut opened_at = None;
        for tick in 0..40 {
            world.update(&right, 0.05);
            if entered_at.is_none() && world.player().position.distance(door_base) < radius {
                entered_at = Some(tick);
            }
            if opened_at.is_none() && !world.events.doors.is_empty() {
                opened_at = Some(tick);
            }
        }
        assert_eq!(opened_at, entered_at.map(|t| t + 1));
    }

    #[test]
    fn test_identical_runs_are_identical() {
        let map = load_level_map_from_str(DEMO_LEVEL).unwrap();
        let mut a = World::from_map(&map, &Settings::default()).unwrap();
        let mut b = World::from_map(&map, &Settings::default()).unwrap();

        let script = [
            InputSnapshot::new().holding(Action::MoveBackward),
            InputSnapshot::new().holding(Action::StrafeRight).looking(12.0),
            InputSnapshot::new().holding(Action::MoveForward).holding(Action::StrafeLeft),
            InputSnapshot::new().looking(-40.0),
        ];
        for (i, input) in script.iter().cycle().take(400).enumerate() {
            let dt = if i % 7 == 0 { 0.05 } else { 0.016 };
            a.update(input, dt);
            b.update(input, dt);
        }

        assert_eq!(a.entities(), b.entities());
        assert_eq!(a.camera, b.camera);
    }
}
