use crate::entities::{EntityType, EntityTypeId, EntityTypeInner};
use std::cell::{Ref, RefCell, RefMut};
use std::hash::{Hash, Hasher};
use crate::components::Component;
use crate::error::EcsError;
use std::any::Any;
use std::rc::Rc;
use std::fmt;

/// A handle to one slot of an [EntityType]'s pool.
///
/// Handles are cheap to clone and compare by identity: two handles are equal when they
/// refer to the same slot of the same pool. A handle stays valid after the entity is freed;
/// it then simply refers to a slot that may be handed out again.
#[derive(Clone)]
pub struct Entity {
	pub(crate) owner: Rc<EntityTypeInner>,
	index: u32,
}

impl Entity {
	pub(crate) fn new(owner: Rc<EntityTypeInner>, index: u32) -> Self {
		Self { owner, index }
	}

	/// The slot index inside the owning pool.
	pub fn index(&self) -> u32 {
		self.index
	}

	pub fn type_id(&self) -> EntityTypeId {
		self.owner.id
	}

	/// The owning pool.
	pub fn entity_type(&self) -> EntityType {
		EntityType {
			inner: self.owner.clone(),
		}
	}

	/// The declared component names, in declaration order.
	pub fn components(&self) -> &[String] {
		&self.owner.names
	}

	pub fn has(&self, component: &str) -> bool {
		self.owner.names.iter().any(|n| n == component)
	}

	/// Whether the slot is currently handed out.
	pub fn is_acquired(&self) -> bool {
		self.owner.is_used(self.index)
	}

	/// Returns the entity to its pool. Does nothing if it is already free.
	pub fn free(&self) {
		self.owner.release(self);
	}

	/// Borrows the component `name` as a `T`.
	///
	/// # Errors
	/// [EcsError::UnknownComponent], [EcsError::ComponentType] or
	/// [EcsError::ComponentBorrowed] if it is mutably borrowed elsewhere.
	pub fn get<T: Component>(&self, name: &str) -> Result<Ref<'_, T>, EcsError> {
		let cell = self.cell(name)?;
		let component = cell.try_borrow().map_err(|_| EcsError::ComponentBorrowed(name.to_owned()))?;
		Ref::filter_map(component, |c| (**c).downcast_ref::<T>()).map_err(|_| EcsError::ComponentType {
			component: name.to_owned(),
			expected: std::any::type_name::<T>(),
		})
	}

	/// Mutably borrows the component `name` as a `T`.
	///
	/// # Errors
	/// Same as [get](Entity::get); also fails while any other borrow of the component is alive.
	pub fn get_mut<T: Component>(&self, name: &str) -> Result<RefMut<'_, T>, EcsError> {
		let cell = self.cell(name)?;
		let component = cell.try_borrow_mut().map_err(|_| EcsError::ComponentBorrowed(name.to_owned()))?;
		RefMut::filter_map(component, |c| (**c).downcast_mut::<T>()).map_err(|_| EcsError::ComponentType {
			component: name.to_owned(),
			expected: std::any::type_name::<T>(),
		})
	}

	/// Assigns several fields of the component `name` at once.
	///
	/// Keyed containers store every value under its field name; other components
	/// assign the matching struct field. Fields are assigned in order and the first
	/// failure stops the assignment.
	///
	/// ```ignore
	/// player.set("body", fields![x = 32.0_f32, y = 32.0_f32])?;
	/// ```
	pub fn set<'f, I>(&self, name: &str, fields: I) -> Result<(), EcsError>
	where
		I: IntoIterator<Item = (&'f str, Box<dyn Any>)>,
	{
		let cell = self.cell(name)?;
		let mut component = cell.try_borrow_mut().map_err(|_| EcsError::ComponentBorrowed(name.to_owned()))?;
		for (field, value) in fields {
			component.set_field(field, value).map_err(|e| e.into_ecs_error(name, field))?;
		}
		Ok(())
	}

	fn cell(&self, name: &str) -> Result<&RefCell<Box<dyn Component>>, EcsError> {
		let column = self.owner.column(name).ok_or_else(|| EcsError::UnknownComponent(name.to_owned()))?;
		Ok(&column[self.index as usize])
	}
}

impl PartialEq for Entity {
	fn eq(&self, other: &Self) -> bool {
		self.index == other.index && Rc::ptr_eq(&self.owner, &other.owner)
	}
}

impl Eq for Entity {}

impl Hash for Entity {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.owner.id.hash(state);
		self.index.hash(state);
	}
}

impl fmt::Debug for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Entity({}, {})", self.owner.id, self.index)
	}
}
