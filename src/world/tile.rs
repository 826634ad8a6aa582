//! Tile grid - the level's immutable spatial index
//!
//! Grid column `x` runs along world X, grid row `y` runs along world Z.
//! Solid tiles fill the full cell from the floor (y = 0) up to TILE_SIZE.

use serde::{Serialize, Deserialize};
use crate::math::Vec3;

/// World units per grid cell
pub const TILE_SIZE: f32 = 8.0;

/// RGB codes used by image-based level maps
pub mod codes {
    pub const EMPTY: u32 = 0xFFFFFF;
    pub const BLOCK: u32 = 0x000000;
    pub const LIGHT: u32 = 0xFFD800;
    pub const DOOR: u32 = 0x0026FF;
    pub const PLAYER: u32 = 0xFF0000;
}

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// Walkable floor
    #[default]
    Empty,
    /// Solid wall block
    Block,
    /// Marker: ceiling light (consumed at load)
    Light,
    /// Marker: sliding door (consumed at load)
    Door,
    /// Marker: player start (consumed at load)
    PlayerSpawn,
}

impl TileType {
    /// Decode a packed 0xRRGGBB map colour. Unknown colours are floor.
    pub fn from_rgb(code: u32) -> Self {
        match code & 0xFFFFFF {
            codes::EMPTY => TileType::Empty,
            codes::BLOCK => TileType::Block,
            codes::LIGHT => TileType::Light,
            codes::DOOR => TileType::Door,
            codes::PLAYER => TileType::PlayerSpawn,
            _ => TileType::Empty,
        }
    }

    /// Decode an ASCII glyph from a RON level file
    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            '.' | ' ' => Some(TileType::Empty),
            '#' => Some(TileType::Block),
            'L' => Some(TileType::Light),
            'D' => Some(TileType::Door),
            'P' => Some(TileType::PlayerSpawn),
            _ => None,
        }
    }

    pub fn is_solid(self) -> bool {
        self == TileType::Block
    }

    /// Marker codes spawn something at load and are floor afterwards
    pub fn is_marker(self) -> bool {
        matches!(self, TileType::Light | TileType::Door | TileType::PlayerSpawn)
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub fn new(tile_type: TileType, x: i32, y: i32) -> Self {
        Self { tile_type, x, y }
    }

    /// Centre of the cell at half tile height
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.x as f32 + 0.5) * TILE_SIZE,
            TILE_SIZE * 0.5,
            (self.y as f32 + 0.5) * TILE_SIZE,
        )
    }

    /// World-space box of the full cell (floor to ceiling)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let min = Vec3::new(self.x as f32 * TILE_SIZE, 0.0, self.y as f32 * TILE_SIZE);
        let max = Vec3::new(
            (self.x + 1) as f32 * TILE_SIZE,
            TILE_SIZE,
            (self.y + 1) as f32 * TILE_SIZE,
        );
        (min, max)
    }
}

/// Map a world coordinate to a grid coordinate (floor division)
pub fn world_to_grid(v: f32) -> i32 {
    (v / TILE_SIZE).floor() as i32
}

/// Inclusive grid rectangle `[min_x, max_x] x [min_y, max_y]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl GridRect {
    /// Cells covered by a world-space box (X -> grid x, Z -> grid y)
    pub fn covering(min: Vec3, max: Vec3) -> Self {
        Self {
            min_x: world_to_grid(min.x),
            min_y: world_to_grid(min.z),
            max_x: world_to_grid(max.x),
            max_y: world_to_grid(max.z),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Intersect with a `width` x `height` grid. May come back empty.
    pub fn clamped(self, width: usize, height: usize) -> Self {
        Self {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(width as i32 - 1),
            max_y: self.max_y.min(height as i32 - 1),
        }
    }

    /// Cells in scan order: rows outer, columns inner
    pub fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }
}

/// Immutable row-major grid of tiles backing a level
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Build from row-major tile types. `types.len()` must be `width * height`.
    pub fn from_types(width: usize, height: usize, types: &[TileType]) -> Self {
        debug_assert_eq!(types.len(), width * height);
        let tiles = types
            .iter()
            .enumerate()
            .map(|(i, &t)| Tile::new(t, (i % width) as i32, (i / width) as i32))
            .collect();
        Self { width, height, tiles }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bounds-checked lookup. Anything outside the grid is `None`.
    pub fn get_tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.tiles.get(y as usize * self.width + x as usize)
    }

    /// Solid tiles inside `rect`, rows outer, columns inner.
    /// Cells outside the grid are skipped.
    pub fn solid_tiles_in(&self, rect: GridRect) -> impl Iterator<Item = &Tile> + '_ {
        rect.clamped(self.width, self.height)
            .cells()
            .filter_map(move |(x, y)| self.get_tile_at(x, y))
            .filter(|t| t.tile_type.is_solid())
    }

    /// All tiles in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}
