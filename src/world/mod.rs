//! World module - tile-based level data
//!
//! - `tile`: immutable tile grid and spatial queries
//! - `map`: decoded level maps and their on-disk formats (RON, images)

mod map;
mod tile;

pub use map::*;
pub use tile::*;
