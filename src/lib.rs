extern crate self as toyblock;

pub mod data_structures;
pub mod components;
pub mod entities;
pub mod systems;
pub mod error;

pub mod prelude {
	pub use crate::fields;
	pub use crate::error::{EcsError, FieldError};
	pub use crate::entities::{Entity, EntityType, EntityTypeId};
	pub use crate::components::{Component, InstanceBuilder};
	pub use crate::systems::{MatchPolicy, Schedule, System, SystemId, SystemRef};
}

#[cfg(test)]
mod tests;
