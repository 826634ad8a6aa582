//! Game Simulation Module
//!
//! Entities moving through a tile level, kept out of walls and each other by
//! box collision. Organised the way the frame runs:
//!
//! - Entity: registry records composed from capabilities
//! - Components: group masks, contact flags, models, lights
//! - Collision: box tests and the per-entity resolution pass
//! - Player / Door: the two behaviours driven in the logic phase
//! - World: the level, its entities and the two-phase tick
//! - Runtime: frame clock, pause and debug toggles
//! - Renderer: frame snapshot and macroquad drawing

pub mod entity;
pub mod components;
pub mod collision;
pub mod door;
pub mod player;
pub mod event;
pub mod world;
pub mod runtime;
pub mod renderer;

// Re-export main types
pub use entity::{Entity, EntityId};
pub use world::World;
pub use event::Events;
pub use runtime::{FrameClock, Runtime};
pub use renderer::{draw_frame, FrameSnapshot};
