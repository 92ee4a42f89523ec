use std::fmt;

use serde::{Deserialize, Serialize};

use crate::terrain::TerrainKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Food,
    Water,
    Mineral,
    Wood,
    Herb,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Food => "FOOD",
            ResourceKind::Water => "WATER",
            ResourceKind::Mineral => "MINERAL",
            ResourceKind::Wood => "WOOD",
            ResourceKind::Herb => "HERB",
        };
        f.write_str(name)
    }
}

/// Static description of a resource kind: capacity, regrowth, and where it spawns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub kind: ResourceKind,
    pub max_amount: f64,
    pub regeneration_rate: f64,
    /// Minimum ledger time between two regeneration events on one node.
    pub regeneration_interval_ms: f64,
    pub valid_terrains: Vec<TerrainKind>,
}

pub fn default_definitions() -> Vec<ResourceDefinition> {
    use TerrainKind::*;
    vec![
        ResourceDefinition {
            kind: ResourceKind::Food,
            max_amount: 100.0,
            regeneration_rate: 0.5,
            regeneration_interval_ms: 1_000.0,
            valid_terrains: vec![Grassland, Forest, Savanna],
        },
        ResourceDefinition {
            kind: ResourceKind::Water,
            max_amount: 200.0,
            regeneration_rate: 1.0,
            regeneration_interval_ms: 500.0,
            valid_terrains: vec![Ocean, DeepOcean, Swamp],
        },
        ResourceDefinition {
            kind: ResourceKind::Mineral,
            max_amount: 50.0,
            regeneration_rate: 0.1,
            regeneration_interval_ms: 5_000.0,
            valid_terrains: vec![Mountain, SnowMountain],
        },
        ResourceDefinition {
            kind: ResourceKind::Wood,
            max_amount: 150.0,
            regeneration_rate: 0.3,
            regeneration_interval_ms: 2_000.0,
            valid_terrains: vec![Forest, Rainforest],
        },
        ResourceDefinition {
            kind: ResourceKind::Herb,
            max_amount: 30.0,
            regeneration_rate: 0.2,
            regeneration_interval_ms: 3_000.0,
            valid_terrains: vec![Forest, Swamp, Rainforest],
        },
    ]
}
