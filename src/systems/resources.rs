use crate::{
    engine::{System, SystemContext},
    error::SimResult,
    rng::SystemRng,
    world::World,
};

/// Regenerates resource nodes on unscaled simulation time.
pub struct ResourceSystem;

impl ResourceSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResourceSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ResourceSystem {
    fn name(&self) -> &str {
        "resources"
    }

    fn run(
        &mut self,
        ctx: &mut SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> SimResult<()> {
        let regenerated = world.ledger.update(ctx.delta_ms)?;
        if regenerated > 0 {
            tracing::trace!(tick = ctx.tick, regenerated, "resource nodes regenerated");
        }
        Ok(())
    }
}
