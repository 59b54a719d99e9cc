//! [Entities](Entity) are the recyclable records handed out by an [EntityType].
//!
//! An [EntityType] owns a fixed pool of entities built from one
//! [InstanceBuilder](crate::components::InstanceBuilder); entities are never created or
//! destroyed after that, only acquired and freed.

mod entity;
mod entity_type;

pub use entity::*;
pub use entity_type::{EntityType, EntityTypeId};

pub(crate) use entity_type::EntityTypeInner;
