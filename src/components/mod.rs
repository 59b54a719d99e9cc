//! [Components](Component) are the data carried by [entities](crate::entities::Entity).
//!
//! An entity type declares its components once through an [InstanceBuilder];
//! every entity slot then owns one freshly constructed instance per name.

mod component;
mod instance_builder;

pub use component::*;
pub use instance_builder::*;
pub use toyblock_derive::Component;
