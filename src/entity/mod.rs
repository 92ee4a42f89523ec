//! Simulated creatures and their per-tick behaviour.
//!
//! A tick runs vitals, perception, decision and execution in that order.
//! Entities never touch each other directly: the registry hands each one a
//! list of its neighbours and a [`TickContext`] with the shared ledger.

mod decision;
mod perception;
mod vitals;

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::map::{MapBounds, Position, TilePos};
use crate::resources::{ResourceKind, ResourceLedger};
use crate::species::{SpeciesCatalog, SpeciesDefinition};

pub use decision::{decide, Action, DecisionState, INTERACTION_RANGE, MIN_RESOURCE_AMOUNT};
pub use perception::{perception_range, PerceivedEntity, PerceivedResource, PerceptionInfo};
pub use vitals::{VitalSigns, VitalStatus, VITAL_MAX};

/// Units requested per interaction, before the species' consumption rate.
const CONSUME_BATCH: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity-{}", self.0)
    }
}

/// Shared state an entity may read or mutate during its tick.
pub struct TickContext<'a, R> {
    pub ledger: &'a mut ResourceLedger,
    pub bounds: MapBounds,
    pub rng: &'a mut R,
}

#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    position: Position,
    species: Arc<SpeciesDefinition>,
    vitals: VitalSigns,
    perception_range: f64,
    decision: DecisionState,
    resting: bool,
}

impl Entity {
    pub fn new(id: EntityId, species: Arc<SpeciesDefinition>, position: Position) -> Self {
        let vitals = VitalSigns::new(
            species.base_stats.max_health,
            species.base_stats.max_energy,
            0.0,
        );
        Self {
            id,
            position,
            perception_range: perception_range(&species),
            species,
            vitals,
            decision: DecisionState::default(),
            resting: false,
        }
    }

    /// Look `species_id` up in `catalog`; unknown ids are a configuration error.
    pub fn spawn(
        id: EntityId,
        catalog: &SpeciesCatalog,
        species_id: &str,
        position: Position,
    ) -> SimResult<Self> {
        let species = catalog.get(species_id)?;
        Ok(Self::new(id, species, position))
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn species(&self) -> &SpeciesDefinition {
        &self.species
    }

    pub fn species_id(&self) -> &str {
        &self.species.id
    }

    pub fn vitals(&self) -> VitalSigns {
        self.vitals
    }

    pub fn status(&self) -> VitalStatus {
        self.vitals.status()
    }

    pub fn perception_range(&self) -> f64 {
        self.perception_range
    }

    pub fn decision(&self) -> DecisionState {
        self.decision
    }

    pub fn is_resting(&self) -> bool {
        self.resting
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_vitals(&mut self, vitals: VitalSigns) {
        self.vitals = vitals;
    }

    pub fn set_resting(&mut self, resting: bool) {
        self.resting = resting;
    }

    /// What other entities see of this one.
    pub fn perceived(&self) -> PerceivedEntity {
        PerceivedEntity {
            id: self.id,
            position: self.position,
            species_id: self.species.id.clone(),
            size: self.species.base_stats.size,
        }
    }

    /// Run one behaviour cycle and return the action that was executed.
    pub fn tick<R: Rng>(
        &mut self,
        nearby: Vec<PerceivedEntity>,
        ctx: &mut TickContext<'_, R>,
    ) -> SimResult<Action> {
        if !self.position.is_finite() {
            return Err(SimError::Entity {
                id: self.id,
                reason: format!(
                    "non-finite position ({}, {})",
                    self.position.x, self.position.y
                ),
            });
        }

        self.vitals.update(self.resting);

        let info = PerceptionInfo::gather(
            self.position,
            self.perception_range,
            self.vitals,
            nearby,
            ctx.ledger,
        );
        let action = decide(&info, &self.species, self.position, ctx.bounds, &mut *ctx.rng);
        let executed = self.execute(action, &mut *ctx.ledger);
        self.decision.last_target = executed.target();
        Ok(executed)
    }

    fn execute(&mut self, action: Action, ledger: &mut ResourceLedger) -> Action {
        match action {
            Action::Interact { tile, kind } => {
                self.resting = false;
                self.interact(tile, kind, ledger);
                action
            }
            Action::MoveToward { target } | Action::MoveRandom { target } => {
                let cost = self.species.base_stats.energy_consumption;
                if self.vitals.energy() < cost {
                    self.resting = true;
                    return Action::Rest;
                }
                self.position = target;
                self.vitals.adjust_energy(-cost);
                self.resting = false;
                action
            }
            Action::Rest => {
                self.resting = true;
                action
            }
        }
    }

    fn interact(&mut self, tile: TilePos, kind: ResourceKind, ledger: &mut ResourceLedger) {
        let requested = self.species.resource_needs.consumption_rate(kind) * CONSUME_BATCH;
        let consumed = ledger.consume(tile, kind, requested);
        if consumed <= 0.0 {
            return;
        }
        match kind {
            ResourceKind::Food => {
                self.vitals.adjust_hunger(-consumed);
                self.vitals.adjust_energy(consumed / 2.0);
            }
            ResourceKind::Water => self.vitals.adjust_energy(consumed / 2.0),
            ResourceKind::Herb => self.vitals.adjust_health(consumed),
            ResourceKind::Wood | ResourceKind::Mineral => {}
        }
        tracing::trace!(entity = %self.id, %kind, consumed, "resource consumed");
    }
}
