use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{Engine, EngineBuilder, EngineSettings, DEFAULT_TARGET_FPS},
    species::{SpeciesCatalog, SpeciesDefinition},
};

fn default_seed() -> u64 {
    42
}

fn default_ticks() -> u64 {
    600
}

fn default_tick_ms() -> f64 {
    1_000.0 / DEFAULT_TARGET_FPS
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_target_fps() -> f64 {
    DEFAULT_TARGET_FPS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_kpi_interval_ticks() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WorldSize {
    fn default() -> Self {
        Self {
            width: 30,
            height: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Ticks between population summaries; 0 disables them.
    #[serde(default = "default_kpi_interval_ticks")]
    pub kpi_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            kpi_interval_ticks: default_kpi_interval_ticks(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub world: WorldSize,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Fixed delta fed to each headless tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: f64,
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    /// Species id to population.
    #[serde(default)]
    pub spawn: BTreeMap<String, usize>,
    /// Extra species registered on top of the built-ins.
    #[serde(default)]
    pub species: Vec<SpeciesDefinition>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Built-in scenario used when no file is given.
    pub fn meadow() -> Self {
        Self {
            name: "meadow".to_string(),
            description: Some("Deer and raccoons on a 30x20 map".to_string()),
            seed: default_seed(),
            world: WorldSize::default(),
            ticks: default_ticks(),
            tick_ms: default_tick_ms(),
            time_scale: default_time_scale(),
            target_fps: default_target_fps(),
            spawn: BTreeMap::from([("deer".to_string(), 8), ("raccoon".to_string(), 4)]),
            species: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.world.width > 0 && self.world.height > 0,
            "world dimensions must be positive, got {}x{}",
            self.world.width,
            self.world.height
        );
        ensure!(
            self.tick_ms.is_finite() && self.tick_ms >= 0.0,
            "tick_ms must be a non-negative number, got {}",
            self.tick_ms
        );
        ensure!(
            self.target_fps.is_finite() && self.target_fps > 0.0,
            "target_fps must be positive, got {}",
            self.target_fps
        );
        for species in &self.species {
            validate_species(species)?;
        }
        Ok(())
    }

    pub fn catalog(&self) -> SpeciesCatalog {
        let mut catalog = SpeciesCatalog::with_defaults();
        for definition in &self.species {
            catalog.register(definition.clone());
        }
        catalog
    }

    /// Build a stopped engine with the core systems, populated per `spawn`.
    pub fn build_engine(&self) -> Result<Engine> {
        self.validate()?;
        let settings = EngineSettings {
            name: self.name.clone(),
            seed: self.seed,
            width: self.world.width,
            height: self.world.height,
            target_fps: self.target_fps,
        };
        let mut engine = EngineBuilder::new(settings)
            .with_catalog(self.catalog())
            .with_core_systems()
            .build()
            .with_context(|| format!("Failed to build scenario '{}'", self.name))?;
        engine.set_time_scale(self.time_scale);
        engine
            .spawn_entities(&self.spawn)
            .with_context(|| format!("Failed to populate scenario '{}'", self.name))?;
        Ok(engine)
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::meadow()
    }
}

fn validate_species(species: &SpeciesDefinition) -> Result<()> {
    let stats = &species.base_stats;
    let behavior = &species.behavior;
    let fields = [
        ("max_health", stats.max_health),
        ("max_energy", stats.max_energy),
        ("max_hunger", stats.max_hunger),
        ("movement_speed", stats.movement_speed),
        ("energy_consumption", stats.energy_consumption),
        ("size", stats.size),
        ("exploration_chance", behavior.exploration_chance),
        ("rest_frequency", behavior.rest_frequency),
        ("territory_size", behavior.territory_size),
        ("social_distance", behavior.social_distance),
        ("resource_priority", behavior.resource_priority),
        ("danger_avoidance", behavior.danger_avoidance),
    ];
    for (field, value) in fields {
        ensure!(
            value.is_finite() && value >= 0.0,
            "species {}: {field} must be a non-negative number, got {value}",
            species.id
        );
    }
    for (kind, rate) in &species.resource_needs.consumption_rates {
        ensure!(
            rate.is_finite() && *rate >= 0.0,
            "species {}: consumption rate for {kind} must be a non-negative number, got {rate}",
            species.id
        );
    }
    Ok(())
}
