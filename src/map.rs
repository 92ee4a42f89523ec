//! Tile grid, positions and procedural map assembly.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::terrain::{self, TerrainKind, TerrainProperties};

const MOISTURE_SHIFT: f64 = 1_000.0;
const TEMPERATURE_SHIFT: f64 = 2_000.0;

/// Integer tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

impl TilePos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn center(self) -> Position {
        Position::new(self.x as f64, self.y as f64)
    }
}

/// Continuous position in grid space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of the grid; the only map data entities need while moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapBounds {
    pub width: u32,
    pub height: u32,
}

impl MapBounds {
    pub fn clamp(self, pos: Position) -> Position {
        let max_x = self.width.saturating_sub(1) as f64;
        let max_y = self.height.saturating_sub(1) as f64;
        Position::new(pos.x.clamp(0.0, max_x), pos.y.clamp(0.0, max_y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainTile {
    pub pos: TilePos,
    pub terrain: TerrainProperties,
}

impl TerrainTile {
    pub fn kind(&self) -> TerrainKind {
        self.terrain.kind
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMap {
    width: u32,
    height: u32,
    seed: u64,
    /// Row-major: `tiles[y][x]`.
    tiles: Vec<Vec<TerrainTile>>,
}

impl WorldMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn bounds(&self) -> MapBounds {
        MapBounds {
            width: self.width,
            height: self.height,
        }
    }

    pub fn tile(&self, pos: TilePos) -> Option<&TerrainTile> {
        self.tiles.get(pos.y as usize)?.get(pos.x as usize)
    }

    pub fn rows(&self) -> &[Vec<TerrainTile>] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerrainTile> {
        self.tiles.iter().flatten()
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Pure, seeded terrain generator.
#[derive(Debug, Clone, Copy)]
pub struct MapGenerator {
    seed: u64,
}

impl MapGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Terrain for a single coordinate; identical inputs give identical tiles.
    pub fn tile_at(&self, x: u32, y: u32) -> TerrainTile {
        let fx = x as f64;
        let fy = y as f64;
        let elevation = terrain::noise(fx, fy, self.seed);
        let moisture = terrain::noise(fx + MOISTURE_SHIFT, fy + MOISTURE_SHIFT, self.seed);
        let temperature = terrain::noise(fx + TEMPERATURE_SHIFT, fy + TEMPERATURE_SHIFT, self.seed);
        let kind = terrain::classify(elevation, moisture, temperature);
        TerrainTile {
            pos: TilePos::new(x, y),
            terrain: terrain::perturb(kind, moisture, temperature),
        }
    }

    pub fn generate(&self, width: u32, height: u32) -> SimResult<WorldMap> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions { width, height });
        }
        let tiles = (0..height)
            .map(|y| (0..width).map(|x| self.tile_at(x, y)).collect())
            .collect();
        Ok(WorldMap {
            width,
            height,
            seed: self.seed,
            tiles,
        })
    }
}
