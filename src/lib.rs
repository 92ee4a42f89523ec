pub mod clock;
pub mod engine;
pub mod entity;
pub mod error;
pub mod logging;
pub mod map;
pub mod registry;
pub mod resources;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod species;
pub mod systems;
pub mod terrain;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings, StopHandle, TickSummary};
pub use error::{SimError, SimResult};
pub use scenario::{Scenario, ScenarioLoader};
