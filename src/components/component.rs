use std::collections::{BTreeMap, HashMap};
use crate::error::FieldError;
use std::any::Any;

/// Upcasting helper implemented for every `'static` type.
///
/// Lets a `dyn` [Component] be downcast to its concrete type.
pub trait AsAny: Any {
	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
	#[inline(always)]
	fn as_any(&self) -> &dyn Any {
		self
	}

	#[inline(always)]
	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// A named piece of data attached to every [Entity](crate::entities::Entity) of a type.
///
/// Components are plain values owned by exactly one entity slot.
/// `#[derive(Component)]` implements [set_field](Component::set_field) for structs with named fields,
/// assigning the boxed value to the field with the same name.
pub trait Component: AsAny {
	/// Assigns `value` to the field named `field`.
	///
	/// The default implementation has no settable fields.
	fn set_field(&mut self, field: &str, value: Box<dyn Any>) -> Result<(), FieldError> {
		let _ = (field, value);
		Err(FieldError::Unknown)
	}
}

impl dyn Component {
	/// Returns the component as `T` if that is its concrete type.
	pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
		self.as_any().downcast_ref::<T>()
	}

	/// Returns the component as `&mut T` if that is its concrete type.
	pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
		self.as_any_mut().downcast_mut::<T>()
	}
}

macro_rules! impl_plain_component {
	($($t: ty),*) => {
		$(impl Component for $t {})*
	};
}

impl_plain_component!(i8, i16, i32, i64, i128, isize);
impl_plain_component!(u8, u16, u32, u64, u128, usize);
impl_plain_component!(f32, f64, bool, char, String);

fn downcast_value<V: 'static>(value: Box<dyn Any>) -> Result<V, FieldError> {
	value.downcast::<V>().map(|v| *v).map_err(|_| FieldError::Type {
		expected: std::any::type_name::<V>(),
	})
}

/// Keyed containers accept any field name and store the value under it.
impl<V: 'static> Component for HashMap<String, V> {
	fn set_field(&mut self, field: &str, value: Box<dyn Any>) -> Result<(), FieldError> {
		self.insert(field.to_owned(), downcast_value::<V>(value)?);
		Ok(())
	}
}

impl<V: 'static> Component for BTreeMap<String, V> {
	fn set_field(&mut self, field: &str, value: Box<dyn Any>) -> Result<(), FieldError> {
		self.insert(field.to_owned(), downcast_value::<V>(value)?);
		Ok(())
	}
}

/// Builds the field list consumed by [Entity::set](crate::entities::Entity::set).
///
/// ```ignore
/// player.set("body", fields![x = 32.0_f32, y = 32.0_f32])?;
/// ```
#[macro_export]
macro_rules! fields {
	($($field: ident = $value: expr),* $(,)?) => {
		[$((
			{
				let name: &'static str = stringify!($field);
				name.strip_prefix("r#").unwrap_or(name)
			},
			::std::boxed::Box::new($value) as ::std::boxed::Box<dyn ::std::any::Any>,
		)),*]
	};
}
