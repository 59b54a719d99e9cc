use std::sync::atomic::{AtomicU32, Ordering};
use crate::entities::Entity;
use crate::error::EcsError;
use std::fmt;
use std::rc::Rc;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// A process-unique identifier of a [System](crate::systems::System).
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct SystemId(u32);

impl SystemId {
	pub(crate) fn next() -> Self {
		Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
	}

	#[inline(always)]
	pub const fn value(&self) -> u32 {
		self.0
	}
}

impl fmt::Display for SystemId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "system#{}", self.0)
	}
}

/// Decides whether a system is wired to an entity type, based on component names alone.
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchPolicy {
	/// Wired when the type declares at least one of the required components.
	#[default]
	Intersects,
	/// Wired when the type declares every required component.
	Subset,
}

impl MatchPolicy {
	pub fn accepts<R, D>(&self, required: &[R], declared: &[D]) -> bool
	where
		R: AsRef<str>,
		D: AsRef<str>,
	{
		let declares = |name: &R| declared.iter().any(|d| d.as_ref() == name.as_ref());
		match self {
			MatchPolicy::Intersects => required.iter().any(declares),
			MatchPolicy::Subset => required.iter().all(declares),
		}
	}
}

/// The membership side of a system, independent of its frame argument type.
pub(crate) trait Subscriber {
	fn id(&self) -> SystemId;
	fn components(&self) -> &[String];
	fn policy(&self) -> MatchPolicy;
	fn subscribe(&self, entity: &Entity);
	fn unsubscribe(&self, entity: &Entity) -> Result<(), EcsError>;
}

/// A type-erased handle to a [System](crate::systems::System), used to wire it into
/// [entity types](crate::entities::EntityType).
#[derive(Clone)]
pub struct SystemRef {
	pub(crate) inner: Rc<dyn Subscriber>,
}

impl SystemRef {
	pub fn id(&self) -> SystemId {
		self.inner.id()
	}

	pub fn components(&self) -> &[String] {
		self.inner.components()
	}

	pub fn policy(&self) -> MatchPolicy {
		self.inner.policy()
	}

	/// Whether this system would be wired to a type declaring `declared`.
	pub fn matches<D: AsRef<str>>(&self, declared: &[D]) -> bool {
		self.policy().accepts(self.components(), declared)
	}
}

impl fmt::Debug for SystemRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SystemRef")
			.field("id", &self.id())
			.field("components", &self.components())
			.finish()
	}
}
