//! [Systems](System) hold the per-frame logic applied to [Entities](crate::entities::Entity).
//!
//! A [System] requires a set of component names; every [entity type](crate::entities::EntityType)
//! declaring a matching set subscribes its acquired entities to it.
//! A [Schedule] dispatches a list of systems once per frame.

mod schedule;
mod subscriber;
mod system;

pub use schedule::*;
pub use system::*;
pub use subscriber::{MatchPolicy, SystemId, SystemRef};

pub(crate) use subscriber::Subscriber;
