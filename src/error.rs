//! Error types shared by [pools](crate::entities::EntityType) and [systems](crate::systems::System).

use crate::entities::EntityTypeId;
use crate::systems::SystemId;

/// Errors raised synchronously by the pooling and dispatch runtime.
///
/// Pool exhaustion is not an error: [`acquire`](crate::entities::EntityType::acquire)
/// reports it through `None`.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
	/// An entity type was declared with no room for entities, or with more slots than
	/// a `u32` index can address.
	#[error("entity type capacity {0} is out of range, expected 1..4294967295")]
	InvalidCapacity(usize),

	/// A component or requirement name was empty.
	#[error("component names must not be empty")]
	InvalidName,

	/// A system listed the same required component twice.
	#[error("component `{0}` is required more than once")]
	DuplicateComponent(String),

	/// A system was registered twice in the same schedule.
	#[error("{0} is already part of this schedule")]
	DuplicateSystem(SystemId),

	/// A system was dispatched before any callback was bound to it.
	#[error("{0} has no callback bound")]
	Unimplemented(SystemId),

	/// A live removal targeted an entity that is not a member of the system.
	#[error("entity {entity} is not a member of {system}")]
	NotFound { system: SystemId, entity: String },

	/// An entity was handed to a pool that did not allocate it.
	#[error("entity belongs to {found}, not {expected}")]
	ForeignEntity { expected: EntityTypeId, found: EntityTypeId },

	/// The entity type does not declare the requested component.
	#[error("unknown component `{0}`")]
	UnknownComponent(String),

	/// The component exists but holds a different type.
	#[error("component `{component}` is not a `{expected}`")]
	ComponentType { component: String, expected: &'static str },

	/// The component is already borrowed in a conflicting way.
	#[error("component `{0}` is already borrowed")]
	ComponentBorrowed(String),

	/// The component has no settable field with this name.
	#[error("component `{component}` has no field `{field}`")]
	UnknownField { component: String, field: String },

	/// The value assigned to a field has the wrong type.
	#[error("field `{component}.{field}` expects a `{expected}`")]
	FieldType { component: String, field: String, expected: &'static str },
}

/// Failure reported by [`Component::set_field`](crate::components::Component::set_field).
///
/// [`Entity::set`](crate::entities::Entity::set) attaches the component and
/// field names and turns it into an [`EcsError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
	#[error("no such field")]
	Unknown,

	#[error("expected a `{expected}`")]
	Type { expected: &'static str },
}

impl FieldError {
	pub(crate) fn into_ecs_error(self, component: &str, field: &str) -> EcsError {
		match self {
			FieldError::Unknown => EcsError::UnknownField {
				component: component.to_owned(),
				field: field.to_owned(),
			},
			FieldError::Type { expected } => EcsError::FieldType {
				component: component.to_owned(),
				field: field.to_owned(),
				expected,
			},
		}
	}
}
