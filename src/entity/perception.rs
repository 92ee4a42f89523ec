use serde::{Deserialize, Serialize};

use crate::map::{Position, TilePos};
use crate::resources::{ResourceKind, ResourceLedger};
use crate::species::SpeciesDefinition;

use super::{EntityId, VitalSigns};

const RANGE_PER_AVOIDANCE: f64 = 5.0;

/// How far a member of `species` can see.
pub fn perception_range(species: &SpeciesDefinition) -> f64 {
    RANGE_PER_AVOIDANCE * species.behavior.danger_avoidance
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceivedEntity {
    pub id: EntityId,
    pub position: Position,
    pub species_id: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceivedResource {
    pub kind: ResourceKind,
    pub tile: TilePos,
    pub amount: f64,
}

impl PerceivedResource {
    pub fn position(&self) -> Position {
        self.tile.center()
    }
}

/// Everything one decision is allowed to look at. Rebuilt every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionInfo {
    pub nearby_entities: Vec<PerceivedEntity>,
    pub nearby_resources: Vec<PerceivedResource>,
    pub visible_range: f64,
    pub vitals: VitalSigns,
}

impl PerceptionInfo {
    pub fn gather(
        origin: Position,
        range: f64,
        vitals: VitalSigns,
        nearby_entities: Vec<PerceivedEntity>,
        ledger: &ResourceLedger,
    ) -> Self {
        let nearby_resources = ledger
            .query_in_range(origin, range)
            .into_iter()
            .map(|node| PerceivedResource {
                kind: node.kind,
                tile: node.tile,
                amount: node.amount,
            })
            .collect();
        Self {
            nearby_entities,
            nearby_resources,
            visible_range: range,
            vitals,
        }
    }
}
