mod clock;
mod entities;
mod resources;

pub use clock::ClockSystem;
pub use entities::EntitySystem;
pub use resources::ResourceSystem;
