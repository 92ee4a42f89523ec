use crate::{
    engine::{System, SystemContext},
    error::SimResult,
    rng::SystemRng,
    world::World,
};

/// Ticks every registered entity against the shared ledger.
pub struct EntitySystem;

impl EntitySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EntitySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EntitySystem {
    fn name(&self) -> &str {
        "entities"
    }

    fn run(
        &mut self,
        ctx: &mut SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> SimResult<()> {
        let bounds = world.map.bounds();
        let report = world
            .registry
            .update(ctx.delta_ms, &mut world.ledger, bounds, rng)?;
        if report.removed > 0 {
            tracing::debug!(tick = ctx.tick, removed = report.removed, "entities removed");
        }
        ctx.failed_entities.extend(report.failed);
        Ok(())
    }
}
