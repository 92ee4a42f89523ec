use crate::{
    engine::{System, SystemContext},
    error::SimResult,
    rng::SystemRng,
    world::World,
};

/// Advances the calendar by the scaled tick delta.
pub struct ClockSystem;

impl ClockSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ClockSystem {
    fn name(&self) -> &str {
        "clock"
    }

    fn run(
        &mut self,
        ctx: &mut SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> SimResult<()> {
        let scale = world.clock.time_scale();
        world.clock.update(ctx.delta_ms, scale)?;
        Ok(())
    }
}
