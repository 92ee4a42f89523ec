use crate::entity::EntityId;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Construction asked for a species the catalog does not know.
    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    /// A single entity failed its tick. Absorbed by the registry.
    #[error("entity {id} failed to tick: {reason}")]
    Entity { id: EntityId, reason: String },

    /// A shared subsystem failed; the scheduler stopped itself.
    #[error("system '{system}' failed, scheduler stopped")]
    SchedulerFatal {
        system: String,
        #[source]
        source: Box<SimError>,
    },

    #[error("invalid tick delta: {0} ms")]
    InvalidDelta(f64),

    #[error("invalid world dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid resource node: {0}")]
    InvalidResourceNode(String),
}

impl SimError {
    /// True for failures that must stop the scheduler.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::SchedulerFatal { .. })
    }
}

pub(crate) fn check_delta(delta_ms: f64) -> SimResult<()> {
    if delta_ms.is_finite() && delta_ms >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDelta(delta_ms))
    }
}
