use std::collections::BTreeMap;

use crate::resources::ResourceKind;
use crate::terrain::TerrainKind;

use super::{
    BaseStats, BehaviorModifiers, ResourceNeeds, SpeciesCategory, SpeciesDefinition,
    TerrainAdaptation, TerrainEffect, Traits,
};

fn effect(energy: f64, speed: f64, health: f64) -> TerrainEffect {
    TerrainEffect {
        energy_modifier: energy,
        speed_modifier: speed,
        health_modifier: health,
    }
}

/// Gentle grazer of forests and grasslands.
pub fn deer() -> SpeciesDefinition {
    SpeciesDefinition {
        id: "deer".into(),
        name: "Deer".into(),
        description: "Gentle herbivore at home in forest and grassland".into(),
        category: SpeciesCategory::Herbivore,
        base_stats: BaseStats {
            max_health: 100.0,
            max_energy: 120.0,
            max_hunger: 100.0,
            movement_speed: 1.2,
            energy_consumption: 0.8,
            size: 2.0,
        },
        terrain_adaptation: TerrainAdaptation {
            preferred: vec![TerrainKind::Grassland, TerrainKind::Forest, TerrainKind::Savanna],
            avoided: vec![TerrainKind::Desert, TerrainKind::SnowMountain, TerrainKind::DeepOcean],
            effects: BTreeMap::from([
                (TerrainKind::Forest, effect(0.8, 1.2, 1.1)),
                (TerrainKind::Desert, effect(1.5, 0.7, 0.8)),
            ]),
        },
        resource_needs: ResourceNeeds {
            primary_food: vec![ResourceKind::Food],
            secondary_food: vec![ResourceKind::Herb],
            other_needs: vec![ResourceKind::Water],
            consumption_rates: BTreeMap::from([
                (ResourceKind::Food, 1.0),
                (ResourceKind::Water, 0.8),
                (ResourceKind::Herb, 0.3),
            ]),
        },
        traits: Traits {
            can_swim: true,
            can_climb: false,
            is_nocturnal: false,
            is_social: true,
            is_aggressive: false,
            is_territorial: false,
            special_abilities: vec!["sprinting".into(), "alertness".into()],
        },
        behavior: BehaviorModifiers {
            exploration_chance: 0.6,
            rest_frequency: 0.4,
            territory_size: 10.0,
            social_distance: 3.0,
            resource_priority: 0.7,
            danger_avoidance: 0.9,
        },
    }
}

/// Adaptable nocturnal omnivore.
pub fn raccoon() -> SpeciesDefinition {
    SpeciesDefinition {
        id: "raccoon".into(),
        name: "Raccoon".into(),
        description: "Clever omnivore that adapts to most terrain".into(),
        category: SpeciesCategory::Omnivore,
        base_stats: BaseStats {
            max_health: 80.0,
            max_energy: 100.0,
            max_hunger: 90.0,
            movement_speed: 0.9,
            energy_consumption: 0.7,
            size: 1.0,
        },
        terrain_adaptation: TerrainAdaptation {
            preferred: vec![TerrainKind::Forest, TerrainKind::Grassland],
            avoided: vec![TerrainKind::Desert, TerrainKind::SnowMountain],
            effects: BTreeMap::from([(TerrainKind::Forest, effect(0.9, 1.1, 1.1))]),
        },
        resource_needs: ResourceNeeds {
            primary_food: vec![ResourceKind::Food, ResourceKind::Herb],
            secondary_food: vec![ResourceKind::Wood],
            other_needs: vec![ResourceKind::Water],
            consumption_rates: BTreeMap::from([
                (ResourceKind::Food, 0.8),
                (ResourceKind::Water, 0.7),
                (ResourceKind::Herb, 0.5),
                (ResourceKind::Wood, 0.2),
            ]),
        },
        traits: Traits {
            can_swim: true,
            can_climb: true,
            is_nocturnal: true,
            is_social: false,
            is_aggressive: false,
            is_territorial: true,
            special_abilities: vec!["night vision".into(), "climbing".into()],
        },
        behavior: BehaviorModifiers {
            exploration_chance: 0.8,
            rest_frequency: 0.5,
            territory_size: 6.0,
            social_distance: 5.0,
            resource_priority: 0.8,
            danger_avoidance: 0.7,
        },
    }
}
