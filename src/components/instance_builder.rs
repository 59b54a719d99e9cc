use crate::components::Component;
use crate::error::EcsError;
use std::fmt;
use std::rc::Rc;

type Constructor = Rc<dyn Fn() -> Box<dyn Component>>;

#[derive(Clone)]
struct ComponentSpec {
	name: String,
	construct: Constructor,
}

/// Declares the named [components](Component) carried by every entity of a type.
///
/// Each component is registered with a constructor closure; whatever it captures
/// acts as the fixed construction arguments. The pool calls every constructor
/// once per entity slot, so no two entities ever share a component instance.
///
/// ```ignore
/// let mut builder = InstanceBuilder::new();
/// builder
/// 	.add("body", || Body { x: 32.0, y: 32.0 })?
/// 	.add("sprite", move || Sprite::new(hero_image))?;
/// ```
#[derive(Default, Clone)]
pub struct InstanceBuilder {
	specs: Vec<ComponentSpec>,
}

impl InstanceBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the component `name`, built by `constructor`.
	///
	/// Adding a name twice replaces the earlier constructor but keeps the
	/// position of the first declaration.
	///
	/// # Errors
	/// [EcsError::InvalidName] if `name` is empty.
	pub fn add<C, F>(&mut self, name: impl Into<String>, constructor: F) -> Result<&mut Self, EcsError>
	where
		C: Component,
		F: Fn() -> C + 'static,
	{
		let name = name.into();
		if name.is_empty() {
			return Err(EcsError::InvalidName);
		}

		let construct: Constructor = Rc::new(move || Box::new(constructor()) as Box<dyn Component>);
		match self.specs.iter_mut().find(|spec| spec.name == name) {
			Some(spec) => spec.construct = construct,
			None => self.specs.push(ComponentSpec { name, construct }),
		}
		Ok(self)
	}

	/// Registers the component `name` built through [Default].
	pub fn add_default<C: Component + Default>(&mut self, name: impl Into<String>) -> Result<&mut Self, EcsError> {
		self.add(name, C::default)
	}

	/// The declared component names, in declaration order.
	pub fn components(&self) -> Vec<&str> {
		self.specs.iter().map(|spec| spec.name.as_str()).collect()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.specs.iter().any(|spec| spec.name == name)
	}

	pub fn len(&self) -> usize {
		self.specs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.specs.is_empty()
	}

	/// Lazily constructs a fresh instance of every declared component.
	pub fn instances(&self) -> Instances<'_> {
		Instances {
			specs: self.specs.iter(),
		}
	}
}

impl fmt::Debug for InstanceBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InstanceBuilder").field("components", &self.components()).finish()
	}
}

impl<'l> IntoIterator for &'l InstanceBuilder {
	type Item = (&'l str, Box<dyn Component>);
	type IntoIter = Instances<'l>;

	fn into_iter(self) -> Self::IntoIter {
		self.instances()
	}
}

/// Iterates over `(name, instance)` pairs of an [InstanceBuilder].
/// Every pass builds new instances.
pub struct Instances<'l> {
	specs: std::slice::Iter<'l, ComponentSpec>,
}

impl<'l> Iterator for Instances<'l> {
	type Item = (&'l str, Box<dyn Component>);

	fn next(&mut self) -> Option<Self::Item> {
		let spec = self.specs.next()?;
		Some((spec.name.as_str(), (spec.construct)()))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.specs.size_hint()
	}
}

impl ExactSizeIterator for Instances<'_> {}
