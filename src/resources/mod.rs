//! Spatial resource ledger.
//!
//! Nodes are keyed by `(tile, kind)` and live in a `BTreeMap` so iteration
//! order, and therefore every query result, is stable across runs.

mod kind;

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_delta, SimError, SimResult};
use crate::map::{Position, TilePos, WorldMap};
use crate::rng::RngExt;

pub use kind::{default_definitions, ResourceDefinition, ResourceKind};

/// Chance that a valid tile receives a node of a given kind.
pub const PLACEMENT_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub tile: TilePos,
    pub kind: ResourceKind,
}

impl NodeKey {
    pub fn new(tile: TilePos, kind: ResourceKind) -> Self {
        Self { tile, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub kind: ResourceKind,
    pub tile: TilePos,
    pub amount: f64,
    pub max_amount: f64,
    /// Units added per regeneration event.
    pub regeneration_rate: f64,
    /// Ledger time (ms) of the last regeneration or consumption.
    pub last_regen_ms: f64,
}

impl ResourceNode {
    /// A node at full capacity.
    pub fn full(definition: &ResourceDefinition, tile: TilePos) -> Self {
        Self {
            kind: definition.kind,
            tile,
            amount: definition.max_amount,
            max_amount: definition.max_amount,
            regeneration_rate: definition.regeneration_rate,
            last_regen_ms: 0.0,
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.tile, self.kind)
    }

    pub fn position(&self) -> Position {
        self.tile.center()
    }
}

#[derive(Debug, Clone)]
pub struct ResourceLedger {
    definitions: BTreeMap<ResourceKind, ResourceDefinition>,
    nodes: BTreeMap<NodeKey, ResourceNode>,
    now_ms: f64,
}

impl ResourceLedger {
    pub fn new(definitions: Vec<ResourceDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(|d| (d.kind, d)).collect(),
            nodes: BTreeMap::new(),
            now_ms: 0.0,
        }
    }

    pub fn definition(&self, kind: ResourceKind) -> Option<&ResourceDefinition> {
        self.definitions.get(&kind)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.definitions.values()
    }

    /// Ledger time, the sum of all update deltas.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Clear every node and scatter fresh, full nodes over `map`.
    pub fn generate<R: Rng>(&mut self, map: &WorldMap, rng: &mut R) -> usize {
        self.nodes.clear();
        for tile in map.iter() {
            for definition in self.definitions.values() {
                if !definition.valid_terrains.contains(&tile.kind()) {
                    continue;
                }
                if rng.chance(PLACEMENT_PROBABILITY) {
                    let mut node = ResourceNode::full(definition, tile.pos);
                    node.last_regen_ms = self.now_ms;
                    self.nodes.insert(node.key(), node);
                }
            }
        }
        tracing::debug!(nodes = self.nodes.len(), "resources generated");
        self.nodes.len()
    }

    /// Insert or replace a node. The amount is clamped into `[0, max_amount]`.
    pub fn insert(&mut self, mut node: ResourceNode) -> SimResult<()> {
        if !node.max_amount.is_finite() || node.max_amount < 0.0 {
            return Err(SimError::InvalidResourceNode(format!(
                "max amount {} for {} at ({}, {})",
                node.max_amount, node.kind, node.tile.x, node.tile.y
            )));
        }
        if !node.regeneration_rate.is_finite() || node.regeneration_rate < 0.0 {
            return Err(SimError::InvalidResourceNode(format!(
                "regeneration rate {} for {}",
                node.regeneration_rate, node.kind
            )));
        }
        node.amount = if node.amount.is_nan() {
            0.0
        } else {
            node.amount.clamp(0.0, node.max_amount)
        };
        node.last_regen_ms = self.now_ms;
        self.nodes.insert(node.key(), node);
        Ok(())
    }

    /// Remove up to `requested` units; returns what was actually taken.
    pub fn consume(&mut self, tile: TilePos, kind: ResourceKind, requested: f64) -> f64 {
        let Some(node) = self.nodes.get_mut(&NodeKey::new(tile, kind)) else {
            return 0.0;
        };
        let requested = if requested.is_nan() { 0.0 } else { requested.max(0.0) };
        let taken = requested.min(node.amount);
        node.amount = (node.amount - taken).max(0.0);
        node.last_regen_ms = self.now_ms;
        taken
    }

    /// Advance ledger time and regenerate every node whose interval elapsed.
    pub fn update(&mut self, delta_ms: f64) -> SimResult<usize> {
        check_delta(delta_ms)?;
        self.now_ms += delta_ms;
        let mut regenerated = 0;
        for node in self.nodes.values_mut() {
            let Some(definition) = self.definitions.get(&node.kind) else {
                continue;
            };
            let since = self.now_ms - node.last_regen_ms;
            if node.amount < node.max_amount && since >= definition.regeneration_interval_ms {
                node.amount = (node.amount + node.regeneration_rate).min(node.max_amount);
                node.last_regen_ms = self.now_ms;
                regenerated += 1;
            }
        }
        Ok(regenerated)
    }

    pub fn get(&self, tile: TilePos, kind: ResourceKind) -> Option<&ResourceNode> {
        self.nodes.get(&NodeKey::new(tile, kind))
    }

    pub fn resources_at(&self, tile: TilePos) -> Vec<&ResourceNode> {
        self.nodes.values().filter(|node| node.tile == tile).collect()
    }

    /// Nodes within Euclidean `radius` of `center`, boundary included.
    pub fn query_in_range(&self, center: Position, radius: f64) -> Vec<&ResourceNode> {
        self.nodes
            .values()
            .filter(|node| node.position().distance(center) <= radius)
            .collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_amount(&self, kind: ResourceKind) -> f64 {
        self.nodes
            .values()
            .filter(|node| node.kind == kind)
            .map(|node| node.amount)
            .sum()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(default_definitions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapGenerator;
    use crate::rng::RngManager;

    fn ledger_with_food(tile: TilePos) -> ResourceLedger {
        let mut ledger = ResourceLedger::default();
        let definition = ledger.definition(ResourceKind::Food).unwrap().clone();
        ledger.insert(ResourceNode::full(&definition, tile)).unwrap();
        ledger
    }

    #[test]
    fn consume_caps_at_available() {
        let tile = TilePos::new(5, 5);
        let mut ledger = ledger_with_food(tile);
        let taken = ledger.consume(tile, ResourceKind::Food, 150.0);
        assert_eq!(taken, 100.0);
        assert_eq!(ledger.get(tile, ResourceKind::Food).unwrap().amount, 0.0);
    }

    #[test]
    fn resources_at_lists_only_that_tile() {
        let tile = TilePos::new(4, 4);
        let mut ledger = ledger_with_food(tile);
        let water = ledger.definition(ResourceKind::Water).unwrap().clone();
        let herb = ledger.definition(ResourceKind::Herb).unwrap().clone();
        ledger.insert(ResourceNode::full(&herb, tile)).unwrap();
        ledger.insert(ResourceNode::full(&water, tile)).unwrap();
        ledger.insert(ResourceNode::full(&water, TilePos::new(4, 5))).unwrap();

        let kinds: Vec<_> = ledger.resources_at(tile).iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Food, ResourceKind::Water, ResourceKind::Herb]);
        assert!(ledger.resources_at(TilePos::new(0, 0)).is_empty());
    }

    #[test]
    fn consume_missing_node_returns_zero() {
        let mut ledger = ledger_with_food(TilePos::new(5, 5));
        assert_eq!(ledger.consume(TilePos::new(5, 5), ResourceKind::Water, 10.0), 0.0);
        assert_eq!(ledger.consume(TilePos::new(1, 1), ResourceKind::Food, 10.0), 0.0);
    }

    #[test]
    fn consume_negative_request_takes_nothing() {
        let tile = TilePos::new(2, 2);
        let mut ledger = ledger_with_food(tile);
        assert_eq!(ledger.consume(tile, ResourceKind::Food, -5.0), 0.0);
        assert_eq!(ledger.get(tile, ResourceKind::Food).unwrap().amount, 100.0);
    }

    #[test]
    fn regeneration_waits_for_interval() {
        let tile = TilePos::new(1, 1);
        let mut ledger = ledger_with_food(tile);
        ledger.consume(tile, ResourceKind::Food, 10.0);

        assert_eq!(ledger.update(500.0).unwrap(), 0);
        assert_eq!(ledger.get(tile, ResourceKind::Food).unwrap().amount, 90.0);

        assert_eq!(ledger.update(500.0).unwrap(), 1);
        assert_eq!(ledger.get(tile, ResourceKind::Food).unwrap().amount, 90.5);

        // interval restarts after a regeneration event
        assert_eq!(ledger.update(999.0).unwrap(), 0);
    }

    #[test]
    fn regeneration_stops_at_max() {
        let tile = TilePos::new(1, 1);
        let mut ledger = ledger_with_food(tile);
        ledger.consume(tile, ResourceKind::Food, 0.2);
        ledger.update(1_000.0).unwrap();
        assert_eq!(ledger.get(tile, ResourceKind::Food).unwrap().amount, 100.0);
        assert_eq!(ledger.update(5_000.0).unwrap(), 0);
    }

    #[test]
    fn query_in_range_includes_boundary() {
        let mut ledger = ledger_with_food(TilePos::new(3, 0));
        let water = ledger.definition(ResourceKind::Water).unwrap().clone();
        ledger.insert(ResourceNode::full(&water, TilePos::new(4, 0))).unwrap();

        let hits = ledger.query_in_range(Position::new(0.0, 0.0), 3.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, ResourceKind::Food);
        assert_eq!(ledger.query_in_range(Position::new(0.0, 0.0), 4.0).len(), 2);
    }

    #[test]
    fn insert_clamps_amount_and_rejects_bad_max() {
        let mut ledger = ResourceLedger::default();
        let herb = ledger.definition(ResourceKind::Herb).unwrap().clone();
        let mut node = ResourceNode::full(&herb, TilePos::new(0, 0));
        node.amount = 500.0;
        ledger.insert(node.clone()).unwrap();
        assert_eq!(ledger.get(TilePos::new(0, 0), ResourceKind::Herb).unwrap().amount, 30.0);

        node.max_amount = f64::INFINITY;
        assert!(ledger.insert(node).is_err());
    }

    #[test]
    fn generate_only_on_valid_terrain() {
        let map = MapGenerator::new(42).generate(40, 40).unwrap();
        let mut rng = RngManager::new(3);
        let mut ledger = ResourceLedger::default();
        let placed = ledger.generate(&map, &mut rng.stream("resources"));
        assert_eq!(placed, ledger.len());
        assert!(placed > 0);
        for node in ledger.nodes() {
            let tile = map.tile(node.tile).unwrap();
            let definition = ledger.definition(node.kind).unwrap();
            assert!(definition.valid_terrains.contains(&tile.kind()));
            assert_eq!(node.amount, node.max_amount);
        }
    }

    #[test]
    fn generate_replaces_previous_nodes() {
        let map = MapGenerator::new(42).generate(20, 20).unwrap();
        let mut ledger = ledger_with_food(TilePos::new(500, 500));
        let mut rng = RngManager::new(3);
        ledger.generate(&map, &mut rng.stream("resources"));
        assert!(ledger.get(TilePos::new(500, 500), ResourceKind::Food).is_none());
    }

    #[test]
    fn update_rejects_bad_delta() {
        let mut ledger = ResourceLedger::default();
        assert!(ledger.update(f64::INFINITY).is_err());
        assert_eq!(ledger.now_ms(), 0.0);
    }
}
