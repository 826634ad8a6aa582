//! Level map loading and saving
//!
//! Two on-disk formats produce the same decoded `LevelMap`:
//! - RON level files with one ASCII glyph per tile (human-editable)
//! - Image maps with one pixel per tile, colour-coded (see `tile::codes`)
//!
//! Reading picks the format from the file extension.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};
use super::tile::TileType;

/// Validation limits to keep malformed files from allocating huge grids
pub mod limits {
    /// Maximum width or height of a map, in tiles
    pub const MAX_MAP_SIZE: usize = 256;
    /// Maximum length of a level name
    pub const MAX_NAME_LEN: usize = 128;
}

/// Error type for level loading
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    ImageError(image::ImageError),
    ValidationError(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::ParseError(e)
    }
}

impl From<image::ImageError> for LevelError {
    fn from(e: image::ImageError) -> Self {
        LevelError::ImageError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::ImageError(e) => write!(f, "Image error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {}

/// On-disk RON representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFile {
    #[serde(default)]
    pub name: String,
    /// One string per grid row, one glyph per tile
    pub rows: Vec<String>,
}

/// Decoded tile-type codes for a level, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMap {
    pub name: String,
    width: usize,
    height: usize,
    tiles: Vec<TileType>,
}

impl LevelMap {
    /// Build from row-major tile types, validating dimensions
    pub fn new(name: impl Into<String>, width: usize, height: usize, tiles: Vec<TileType>) -> Result<Self, LevelError> {
        let map = Self { name: name.into(), width, height, tiles };
        map.validate()?;
        Ok(map)
    }

    /// Build from ASCII rows (`#` block, `.` floor, `L` light, `D` door, `P` player)
    pub fn from_ascii<S: AsRef<str>>(name: impl Into<String>, rows: &[S]) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        let mut tiles = Vec::with_capacity(width * height);

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(LevelError::ValidationError(format!(
                    "row {} has {} tiles, expected {}", y, row.chars().count(), width
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let tile = TileType::from_glyph(c).ok_or_else(|| {
                    LevelError::ValidationError(format!("unknown tile glyph {:?} at ({}, {})", c, x, y))
                })?;
                tiles.push(tile);
            }
        }

        Self::new(name, width, height, tiles)
    }

    /// Build from packed 0xRRGGBB codes, one row per grid row
    pub fn from_rgb_rows(name: impl Into<String>, rows: &[Vec<u32>]) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) {
            return Err(LevelError::ValidationError("ragged colour rows".to_string()));
        }
        let tiles = rows.iter().flatten().map(|&c| TileType::from_rgb(c)).collect();
        Self::new(name, width, height, tiles)
    }

    /// Decode an image map (PNG, GIF, BMP, JPEG): one pixel per tile
    pub fn from_image_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, LevelError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        let (width, height) = (width as usize, height as usize);
        if width > limits::MAX_MAP_SIZE || height > limits::MAX_MAP_SIZE {
            return Err(LevelError::ValidationError(format!(
                "map too large ({}x{} > {})", width, height, limits::MAX_MAP_SIZE
            )));
        }

        let rows: Vec<Vec<u32>> = rgb
            .rows()
            .map(|row| {
                row.map(|p| (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32)
                    .collect()
            })
            .collect();

        Self::from_rgb_rows(name, &rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile type at `(x, y)`, or `None` outside the map
    pub fn get(&self, x: i32, y: i32) -> Option<TileType> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.tiles.get(y as usize * self.width + x as usize).copied()
    }

    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    pub fn count(&self, tile_type: TileType) -> usize {
        self.tiles.iter().filter(|&&t| t == tile_type).count()
    }

    pub fn from_file(file: &LevelFile) -> Result<Self, LevelError> {
        Self::from_ascii(file.name.clone(), &file.rows)
    }

    fn validate(&self) -> Result<(), LevelError> {
        if self.width == 0 || self.height == 0 {
            return Err(LevelError::ValidationError("map is empty".to_string()));
        }
        if self.width > limits::MAX_MAP_SIZE || self.height > limits::MAX_MAP_SIZE {
            return Err(LevelError::ValidationError(format!(
                "map too large ({}x{} > {})", self.width, self.height, limits::MAX_MAP_SIZE
            )));
        }
        if self.tiles.len() != self.width * self.height {
            return Err(LevelError::ValidationError(format!(
                "tile count {} does not match {}x{}", self.tiles.len(), self.width, self.height
            )));
        }
        if self.name.len() > limits::MAX_NAME_LEN {
            return Err(LevelError::ValidationError(format!(
                "level name too long ({} > {})", self.name.len(), limits::MAX_NAME_LEN
            )));
        }
        Ok(())
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "gif" | "bmp" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

fn name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Load a level map from a RON level file or an image map
pub fn load_level_map<P: AsRef<Path>>(path: P) -> Result<LevelMap, LevelError> {
    let path = path.as_ref();

    let map = if is_image_path(path) {
        let bytes = fs::read(path)?;
        LevelMap::from_image_bytes(name_from_path(path), &bytes)?
    } else {
        let contents = fs::read_to_string(path)?;
        match load_level_map_from_str(&contents) {
            Ok(map) => map,
            Err(LevelError::ParseError(e)) => {
                warn!(path = %path.display(), line = e.position.line, col = e.position.col, "RON parse error: {}", e.code);
                return Err(LevelError::ParseError(e));
            }
            Err(e) => return Err(e),
        }
    };

    info!(path = %path.display(), width = map.width(), height = map.height(), "loaded level map");
    Ok(map)
}

/// Parse a RON level file from a string (embedded levels, tests)
pub fn load_level_map_from_str(s: &str) -> Result<LevelMap, LevelError> {
    let file: LevelFile = ron::from_str(s)?;
    LevelMap::from_file(&file)
}

/// Built-in level used when no map is given on the command line
pub const DEMO_LEVEL: &str = include_str!("../../levels/lab-1.ron");
