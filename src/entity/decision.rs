use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::map::{MapBounds, Position, TilePos};
use crate::resources::ResourceKind;
use crate::species::SpeciesDefinition;

use super::PerceptionInfo;

/// Nodes at or below this amount are not worth walking to.
pub const MIN_RESOURCE_AMOUNT: f64 = 20.0;
/// Distance (tiles) at which an entity can consume a node.
pub const INTERACTION_RANGE: f64 = 1.0;

const DIRECTIONS: [(f64, f64); 8] = [
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (-1.0, 1.0),
    (0.0, 1.0),
    (1.0, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Consume from the node at `tile`.
    Interact { tile: TilePos, kind: ResourceKind },
    /// Step toward a perceived resource.
    MoveToward { target: Position },
    /// Wander to a neighbouring spot.
    MoveRandom { target: Position },
    /// Stay put and recover; chosen when a move cannot be paid for.
    Rest,
}

impl Action {
    pub fn target(&self) -> Option<Position> {
        match self {
            Action::MoveToward { target } | Action::MoveRandom { target } => Some(*target),
            Action::Interact { tile, .. } => Some(tile.center()),
            Action::Rest => None,
        }
    }
}

/// Decision state carried between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionState {
    pub last_target: Option<Position>,
}

/// Pick the next action: seek the nearest wanted resource, otherwise wander.
pub fn decide<R: Rng>(
    perception: &PerceptionInfo,
    species: &SpeciesDefinition,
    position: Position,
    bounds: MapBounds,
    rng: &mut R,
) -> Action {
    let nearest = perception
        .nearby_resources
        .iter()
        .filter(|r| r.amount > MIN_RESOURCE_AMOUNT && species.resource_needs.wants(r.kind))
        .map(|r| (r, r.position().distance(position)))
        .fold(None, |best: Option<(_, f64)>, (r, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((r, d)),
        });

    if let Some((resource, distance)) = nearest {
        if distance <= INTERACTION_RANGE {
            return Action::Interact {
                tile: resource.tile,
                kind: resource.kind,
            };
        }
        let target = step_toward(
            position,
            resource.position(),
            species.base_stats.movement_speed,
        );
        return Action::MoveToward {
            target: bounds.clamp(target),
        };
    }

    let (dx, dy) = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];
    let speed = species.base_stats.movement_speed;
    Action::MoveRandom {
        target: bounds.clamp(Position::new(position.x + dx * speed, position.y + dy * speed)),
    }
}

/// Move at most `speed` along the line to `to`, never past it.
fn step_toward(from: Position, to: Position, speed: f64) -> Position {
    let distance = from.distance(to);
    if distance <= speed || distance == 0.0 {
        return to;
    }
    let ratio = speed / distance;
    Position::new(from.x + (to.x - from.x) * ratio, from.y + (to.y - from.y) * ratio)
}
