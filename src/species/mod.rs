//! Species definitions and the catalog that owns them.
//!
//! Definitions are immutable once registered. The catalog hands out
//! `Arc<SpeciesDefinition>` so entities share a definition instead of copying it.

mod builtin;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::resources::ResourceKind;
use crate::terrain::TerrainKind;

pub use builtin::{deer, raccoon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesCategory {
    Herbivore,
    Carnivore,
    Omnivore,
    Scavenger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_health: f64,
    pub max_energy: f64,
    pub max_hunger: f64,
    pub movement_speed: f64,
    /// Energy spent per move.
    pub energy_consumption: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainEffect {
    pub energy_modifier: f64,
    pub speed_modifier: f64,
    pub health_modifier: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainAdaptation {
    #[serde(default)]
    pub preferred: Vec<TerrainKind>,
    #[serde(default)]
    pub avoided: Vec<TerrainKind>,
    #[serde(default)]
    pub effects: BTreeMap<TerrainKind, TerrainEffect>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceNeeds {
    #[serde(default)]
    pub primary_food: Vec<ResourceKind>,
    #[serde(default)]
    pub secondary_food: Vec<ResourceKind>,
    #[serde(default)]
    pub other_needs: Vec<ResourceKind>,
    #[serde(default)]
    pub consumption_rates: BTreeMap<ResourceKind, f64>,
}

impl ResourceNeeds {
    pub fn wants(&self, kind: ResourceKind) -> bool {
        self.primary_food.contains(&kind)
            || self.secondary_food.contains(&kind)
            || self.other_needs.contains(&kind)
    }

    /// Units per interaction scale with this rate; unknown kinds default to 1.
    pub fn consumption_rate(&self, kind: ResourceKind) -> f64 {
        self.consumption_rates.get(&kind).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Traits {
    pub can_swim: bool,
    pub can_climb: bool,
    pub is_nocturnal: bool,
    pub is_social: bool,
    pub is_aggressive: bool,
    pub is_territorial: bool,
    pub special_abilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorModifiers {
    pub exploration_chance: f64,
    pub rest_frequency: f64,
    pub territory_size: f64,
    pub social_distance: f64,
    pub resource_priority: f64,
    pub danger_avoidance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: SpeciesCategory,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub terrain_adaptation: TerrainAdaptation,
    #[serde(default)]
    pub resource_needs: ResourceNeeds,
    #[serde(default)]
    pub traits: Traits,
    pub behavior: BehaviorModifiers,
}

impl SpeciesDefinition {
    pub fn avoids(&self, terrain: TerrainKind) -> bool {
        self.terrain_adaptation.avoided.contains(&terrain)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    species: BTreeMap<String, Arc<SpeciesDefinition>>,
}

impl SpeciesCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the built-in species.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.register(deer());
        catalog.register(raccoon());
        catalog
    }

    /// Insert or overwrite by id. Entities spawned earlier keep the old definition.
    pub fn register(&mut self, definition: SpeciesDefinition) {
        self.species
            .insert(definition.id.clone(), Arc::new(definition));
    }

    pub fn get(&self, id: &str) -> SimResult<Arc<SpeciesDefinition>> {
        self.species
            .get(id)
            .cloned()
            .ok_or_else(|| SimError::UnknownSpecies(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.species.contains_key(id)
    }

    /// Every species, ordered by id.
    pub fn all_species(&self) -> Vec<Arc<SpeciesDefinition>> {
        self.species.values().cloned().collect()
    }

    pub fn by_category(&self, category: SpeciesCategory) -> Vec<Arc<SpeciesDefinition>> {
        self.species
            .values()
            .filter(|s| s.category == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
