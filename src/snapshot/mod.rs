//! Read-only views of simulation state for renderers and exports.
//!
//! Everything here is an owned copy. Holding a snapshot never borrows the
//! engine, and nothing in a snapshot can be used to mutate it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::TimeState;
use crate::entity::{Entity, EntityId, VitalStatus};
use crate::map::{Position, TerrainTile, TilePos, WorldMap};
use crate::resources::{ResourceKind, ResourceNode};
use crate::terrain::TerrainKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSnapshot {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour_of_day: f64,
    pub time_scale: f64,
}

impl From<TimeState> for TimeSnapshot {
    fn from(state: TimeState) -> Self {
        Self {
            year: state.year,
            month: state.month,
            day: state.day,
            hour_of_day: state.hour_of_day,
            time_scale: state.time_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSnapshot {
    pub x: u32,
    pub y: u32,
    pub kind: TerrainKind,
    pub color: String,
    pub temperature: f64,
    pub humidity: f64,
    pub elevation: f64,
}

impl From<&TerrainTile> for TileSnapshot {
    fn from(tile: &TerrainTile) -> Self {
        Self {
            x: tile.pos.x,
            y: tile.pos.y,
            kind: tile.kind(),
            color: tile.kind().color().to_string(),
            temperature: tile.terrain.temperature,
            humidity: tile.terrain.humidity,
            elevation: tile.terrain.elevation,
        }
    }
}

/// Row-major terrain grid: `tiles[y][x]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub tiles: Vec<Vec<TileSnapshot>>,
}

impl From<&WorldMap> for WorldSnapshot {
    fn from(map: &WorldMap) -> Self {
        Self {
            width: map.width(),
            height: map.height(),
            seed: map.seed(),
            tiles: map
                .rows()
                .iter()
                .map(|row| row.iter().map(TileSnapshot::from).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub position: Position,
    pub species_id: String,
    pub health: f64,
    pub energy: f64,
    pub hunger: f64,
    pub status: VitalStatus,
    pub status_label: String,
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        let vitals = entity.vitals();
        let status = vitals.status();
        Self {
            id: entity.id(),
            position: entity.position(),
            species_id: entity.species_id().to_string(),
            health: vitals.health(),
            energy: vitals.energy(),
            hunger: vitals.hunger(),
            status,
            status_label: status.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    pub kind: ResourceKind,
    pub position: TilePos,
    pub amount: f64,
    pub max_amount: f64,
    pub regeneration_rate: f64,
}

impl From<&ResourceNode> for ResourceSnapshot {
    fn from(node: &ResourceNode) -> Self {
        Self {
            kind: node.kind,
            position: node.tile,
            amount: node.amount,
            max_amount: node.max_amount,
            regeneration_rate: node.regeneration_rate,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub captured_at: DateTime<Utc>,
    pub tick: u64,
    pub time: TimeSnapshot,
    pub world: WorldSnapshot,
    pub entities: Vec<EntitySnapshot>,
    pub resources: Vec<ResourceSnapshot>,
}

impl Frame {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize frame")
    }

    /// Write the frame as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = self.to_json_pretty()?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
