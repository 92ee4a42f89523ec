//! Ordered entity storage with deferred removal.

use std::collections::BTreeSet;

use rand::Rng;

use crate::entity::{Entity, EntityId, PerceivedEntity, TickContext};
use crate::error::{check_delta, SimResult};
use crate::map::{MapBounds, Position};
use crate::resources::ResourceLedger;

/// Outcome of one registry update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryReport {
    pub ticked: usize,
    pub failed: Vec<EntityId>,
    pub removed: usize,
}

/// Entities in insertion order. Removals are queued and applied at the
/// start of the next [`EntityRegistry::update`].
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    pending_removals: BTreeSet<EntityId>,
    next_id: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh id. Ids are never reused within one registry.
    pub fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::from_raw(self.next_id)
    }

    /// Insert `entity`, replacing any entity with the same id in place.
    pub fn add(&mut self, entity: Entity) {
        let raw = entity.id().raw();
        if raw > self.next_id {
            self.next_id = raw;
        }
        match self.entities.iter_mut().find(|e| e.id() == entity.id()) {
            Some(slot) => *slot = entity,
            None => self.entities.push(entity),
        }
    }

    /// Queue `id` for removal. Unknown and already queued ids are ignored.
    pub fn remove(&mut self, id: EntityId) {
        if self.get(id).is_some() {
            self.pending_removals.insert(id);
        }
    }

    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.pending_removals.contains(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Every live entity, including ones queued for removal.
    pub fn all(&self) -> &[Entity] {
        &self.entities
    }

    pub fn in_range(&self, center: Position, radius: f64) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.position().distance(center) <= radius)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_removals.clear();
    }

    /// Apply pending removals, then tick every entity in insertion order.
    ///
    /// An entity that fails its tick is logged and queued for removal; the
    /// rest of the update carries on.
    pub fn update<R: Rng>(
        &mut self,
        delta_ms: f64,
        ledger: &mut ResourceLedger,
        bounds: MapBounds,
        rng: &mut R,
    ) -> SimResult<RegistryReport> {
        check_delta(delta_ms)?;
        let removed = self.apply_removals();

        let mut report = RegistryReport {
            removed,
            ..RegistryReport::default()
        };
        let mut ctx = TickContext { ledger, bounds, rng };
        for index in 0..self.entities.len() {
            let nearby = self.neighbours_of(index);
            let entity = &mut self.entities[index];
            match entity.tick(nearby, &mut ctx) {
                Ok(_) => report.ticked += 1,
                Err(err) => {
                    tracing::warn!(entity = %entity.id(), error = %err, "entity tick failed");
                    report.failed.push(entity.id());
                }
            }
        }
        for id in &report.failed {
            self.pending_removals.insert(*id);
        }
        Ok(report)
    }

    fn apply_removals(&mut self) -> usize {
        if self.pending_removals.is_empty() {
            return 0;
        }
        let before = self.entities.len();
        let pending = std::mem::take(&mut self.pending_removals);
        self.entities.retain(|e| !pending.contains(&e.id()));
        before - self.entities.len()
    }

    fn neighbours_of(&self, index: usize) -> Vec<PerceivedEntity> {
        let me = &self.entities[index];
        let origin = me.position();
        let range = me.perception_range();
        self.entities
            .iter()
            .enumerate()
            .filter(|(i, other)| *i != index && other.position().distance(origin) <= range)
            .map(|(_, other)| other.perceived())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rng::RngManager;
    use crate::species::{deer, raccoon};

    const BOUNDS: MapBounds = MapBounds {
        width: 30,
        height: 20,
    };

    fn registry_with(count: usize) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        let species = Arc::new(deer());
        for i in 0..count {
            let id = registry.allocate_id();
            registry.add(Entity::new(id, species.clone(), Position::new(i as f64, 0.0)));
        }
        registry
    }

    fn update(registry: &mut EntityRegistry, ledger: &mut ResourceLedger) -> RegistryReport {
        let mut rng = RngManager::new(1);
        registry
            .update(16.0, ledger, BOUNDS, &mut rng.stream("entities"))
            .unwrap()
    }

    #[test]
    fn removal_is_deferred_to_next_update() {
        let mut registry = registry_with(3);
        let mut ledger = ResourceLedger::default();
        let target = registry.all()[1].id();

        registry.remove(target);
        assert!(registry.get(target).is_some());
        assert_eq!(registry.len(), 3);

        let report = update(&mut registry, &mut ledger);
        assert!(registry.get(target).is_none());
        assert_eq!(report.removed, 1);
        assert_eq!(report.ticked, 2);
    }

    #[test]
    fn double_remove_is_harmless() {
        let mut registry = registry_with(2);
        let mut ledger = ResourceLedger::default();
        let target = registry.all()[0].id();
        registry.remove(target);
        registry.remove(target);
        let report = update(&mut registry, &mut ledger);
        assert_eq!(report.removed, 1);
        registry.remove(target);
        assert!(!registry.is_pending_removal(target));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failing_entity_is_isolated_then_removed() {
        let mut registry = registry_with(3);
        let mut ledger = ResourceLedger::default();
        let broken = registry.all()[1].id();
        registry
            .get_mut(broken)
            .unwrap()
            .set_position(Position::new(f64::INFINITY, 0.0));

        let report = update(&mut registry, &mut ledger);
        assert_eq!(report.ticked, 2);
        assert_eq!(report.failed, vec![broken]);
        assert!(registry.get(broken).is_some());

        update(&mut registry, &mut ledger);
        assert!(registry.get(broken).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn add_replaces_same_id_in_place() {
        let mut registry = registry_with(2);
        let first = registry.all()[0].id();
        registry.add(Entity::new(first, Arc::new(raccoon()), Position::new(5.0, 5.0)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.all()[0].species_id(), "raccoon");
    }

    #[test]
    fn allocated_ids_skip_manually_added_ones() {
        let mut registry = EntityRegistry::new();
        registry.add(Entity::new(
            EntityId::from_raw(10),
            Arc::new(deer()),
            Position::new(0.0, 0.0),
        ));
        assert_eq!(registry.allocate_id(), EntityId::from_raw(11));
    }

    #[test]
    fn in_range_is_inclusive() {
        let registry = registry_with(5);
        assert_eq!(registry.in_range(Position::new(0.0, 0.0), 2.0).len(), 3);
    }

    #[test]
    fn update_rejects_bad_delta() {
        let mut registry = registry_with(1);
        let mut ledger = ResourceLedger::default();
        let mut rng = RngManager::new(1);
        let result = registry.update(f64::NAN, &mut ledger, BOUNDS, &mut rng.stream("entities"));
        assert!(result.is_err());
    }
}
