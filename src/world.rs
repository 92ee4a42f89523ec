//! The world context: every piece of mutable simulation state, owned in one place.

use rand::Rng;

use crate::clock::Clock;
use crate::entity::{Entity, EntityId};
use crate::error::SimResult;
use crate::map::{MapGenerator, TilePos, WorldMap};
use crate::registry::EntityRegistry;
use crate::resources::ResourceLedger;
use crate::snapshot::{EntitySnapshot, ResourceSnapshot, TimeSnapshot, WorldSnapshot};
use crate::species::SpeciesCatalog;

pub struct World {
    pub clock: Clock,
    pub catalog: SpeciesCatalog,
    pub map: WorldMap,
    pub ledger: ResourceLedger,
    pub registry: EntityRegistry,
}

impl World {
    /// Fresh world with a generated map and an empty ledger.
    pub fn new(width: u32, height: u32, seed: u64, catalog: SpeciesCatalog) -> SimResult<Self> {
        Ok(Self {
            clock: Clock::new(),
            catalog,
            map: MapGenerator::new(seed).generate(width, height)?,
            ledger: ResourceLedger::default(),
            registry: EntityRegistry::new(),
        })
    }

    /// Replace the map, rescatter resources and drop every entity.
    pub fn regenerate<R: Rng>(
        &mut self,
        width: u32,
        height: u32,
        seed: u64,
        rng: &mut R,
    ) -> SimResult<usize> {
        self.map = MapGenerator::new(seed).generate(width, height)?;
        self.registry.clear();
        Ok(self.ledger.generate(&self.map, rng))
    }

    /// Spawn `count` members of `species_id` on tiles the species does not
    /// avoid, or anywhere when it avoids every tile on the map.
    pub fn spawn<R: Rng>(
        &mut self,
        species_id: &str,
        count: usize,
        rng: &mut R,
    ) -> SimResult<Vec<EntityId>> {
        let definition = self.catalog.get(species_id)?;
        let habitable: Vec<TilePos> = self
            .map
            .iter()
            .filter(|tile| !definition.avoids(tile.kind()))
            .map(|tile| tile.pos)
            .collect();
        let candidates: Vec<TilePos> = if habitable.is_empty() {
            self.map.iter().map(|tile| tile.pos).collect()
        } else {
            habitable
        };

        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let tile = candidates[rng.gen_range(0..candidates.len())];
            let id = self.registry.allocate_id();
            self.registry.add(Entity::new(id, definition.clone(), tile.center()));
            spawned.push(id);
        }
        Ok(spawned)
    }

    pub fn time_snapshot(&self) -> TimeSnapshot {
        self.clock.state().into()
    }

    pub fn world_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::from(&self.map)
    }

    pub fn entity_snapshots(&self) -> Vec<EntitySnapshot> {
        self.registry.all().iter().map(EntitySnapshot::from).collect()
    }

    pub fn resource_snapshots(&self) -> Vec<ResourceSnapshot> {
        self.ledger.nodes().map(ResourceSnapshot::from).collect()
    }
}
