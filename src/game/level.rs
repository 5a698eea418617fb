//! Level geometry input and normalization
//!
//! Level files describe geometry in pixel space. The simulation only ever sees
//! [`Level`], whose zones are already normalized to the unit square.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Static rectangular obstacle in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Zone {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a zone from a pixel-space rectangle.
    ///
    /// Negative extents are flipped so the origin is always the top-left corner.
    pub fn from_pixels(x: f32, y: f32, width: f32, height: f32, pixel_size: f32) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Self {
            x: x / pixel_size,
            y: y / pixel_size,
            width: width / pixel_size,
            height: height / pixel_size,
        }
    }
}

/// Errors raised while loading level data
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("Failed to read level file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid level file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Level not found: {0}")]
    NotFound(String),

    #[error("Level pixel size must be positive")]
    InvalidPixelSize,
}

/// Pixel-space rectangle as written in level files
#[derive(Debug, Clone, Deserialize)]
pub struct RawZone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One level as stored in the catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct LevelData {
    pub name: String,
    #[serde(default)]
    pub layers: Vec<Value>,
    #[serde(default)]
    pub sprites: Vec<Value>,
    #[serde(default)]
    pub zones: Vec<RawZone>,
}

/// The `{ "levels": [...] }` document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelCatalog {
    #[serde(default)]
    pub levels: Vec<LevelData>,
}

impl LevelCatalog {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Tile layer fields needed to derive walls
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileLayer {
    tile_map: Vec<Vec<i32>>,
    tiles_width: f32,
    tiles_height: f32,
}

/// How pixel-space level data maps onto the arena
#[derive(Debug, Clone)]
pub struct LevelOptions {
    /// Name of the tile layer whose filled tiles are walls
    pub wall_layer: String,
    /// Side of the square level image in pixels
    pub pixel_size: f32,
}

impl Default for LevelOptions {
    fn default() -> Self {
        Self {
            wall_layer: "CastleBorder".to_string(),
            pixel_size: 512.0,
        }
    }
}

/// Layer and sprite metadata forwarded untouched to clients
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelMeta {
    pub layers: Vec<Value>,
    pub sprites: Vec<Value>,
}

/// Read-only level input consumed by the simulation
#[derive(Debug, Clone)]
pub struct Level {
    pub zones: Arc<[Zone]>,
    pub meta: Arc<LevelMeta>,
}

impl Level {
    /// An arena with no obstacles
    pub fn empty() -> Self {
        Self::from_zones(Vec::new())
    }

    pub fn from_zones(zones: Vec<Zone>) -> Self {
        Self {
            zones: zones.into(),
            meta: Arc::new(LevelMeta::default()),
        }
    }

    /// Normalize a level's walls and explicit zones into the unit square.
    pub fn from_data(data: LevelData, options: &LevelOptions) -> Result<Self, LevelError> {
        if options.pixel_size.is_nan() || options.pixel_size <= 0.0 {
            return Err(LevelError::InvalidPixelSize);
        }
        let pixel_size = options.pixel_size;

        let mut zones: Vec<Zone> = data
            .zones
            .iter()
            .map(|z| Zone::from_pixels(z.x, z.y, z.width, z.height, pixel_size))
            .collect();

        let wall_layer = data
            .layers
            .iter()
            .find(|layer| layer.get("name").and_then(Value::as_str) == Some(options.wall_layer.as_str()));

        match wall_layer {
            Some(layer) => match TileLayer::deserialize(layer) {
                Ok(tiles) => zones.extend(wall_zones(&tiles, pixel_size)),
                Err(e) => warn!(layer = %options.wall_layer, error = %e, "Wall layer is not a tile layer"),
            },
            None => debug!(layer = %options.wall_layer, level = %data.name, "Level has no wall layer"),
        }

        Ok(Self {
            zones: zones.into(),
            meta: Arc::new(LevelMeta {
                layers: data.layers,
                sprites: data.sprites,
            }),
        })
    }

    /// Pick a level out of a catalog by name and normalize it.
    pub fn from_catalog(catalog: LevelCatalog, name: &str, options: &LevelOptions) -> Result<Self, LevelError> {
        let data = catalog
            .levels
            .into_iter()
            .find(|level| level.name == name)
            .ok_or_else(|| LevelError::NotFound(name.to_string()))?;
        Self::from_data(data, options)
    }
}

/// One zone per filled tile (`-1` marks an empty cell)
fn wall_zones(tiles: &TileLayer, pixel_size: f32) -> Vec<Zone> {
    let tile_w = tiles.tiles_width / pixel_size;
    let tile_h = tiles.tiles_height / pixel_size;

    tiles
        .tile_map
        .iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells.iter().enumerate().filter(|(_, tile)| **tile != -1).map(move |(col, _)| {
                Zone::new(col as f32 * tile_w, row as f32 * tile_h, tile_w, tile_h)
            })
        })
        .collect()
}
