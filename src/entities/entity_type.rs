use crate::components::{Component, InstanceBuilder};
use std::sync::atomic::{AtomicU32, Ordering};
use crate::systems::{Subscriber, SystemRef};
use crate::data_structures::SparseSet;
use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::collections::HashSet;
use std::cell::{Ref, RefCell};
use crate::entities::Entity;
use crate::error::EcsError;
use tracing::{debug, trace, warn};
use std::rc::{Rc, Weak};
use std::fmt;

type Hasher = BuildHasherDefault<NoHashHasher<u32>>;
type Hook = Rc<dyn Fn(&Entity)>;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// A process-unique identifier of an [EntityType].
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct EntityTypeId(u32);

impl EntityTypeId {
	#[inline(always)]
	pub const fn value(&self) -> u32 {
		self.0
	}
}

impl fmt::Display for EntityTypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "entity-type#{}", self.0)
	}
}

/// A fixed-capacity pool of [entities](Entity) sharing one set of [components](Component).
///
/// Every entity is constructed up front; afterwards entities only move between
/// the free and the used partition through [acquire](EntityType::acquire) and [free](EntityType::free).
/// Acquired entities are subscribed to every wired [system](crate::systems::System),
/// freed ones are unsubscribed. The pool never resets component values.
///
/// ```ignore
/// let physics = System::<f32>::with_callback(["body"], |_, bullet, dt| { /* ... */ })?;
/// let mut builder = InstanceBuilder::new();
/// builder.add("body", || Body::new(0.0, 0.0))?;
///
/// let bullets = EntityType::build(100, &builder, [physics.subscriber()])?;
/// if let Some(bullet) = bullets.acquire() {
/// 	bullet.set("body", fields![x = 32.0_f32, y = 16.0_f32])?;
/// }
/// ```
#[derive(Clone)]
pub struct EntityType {
	pub(crate) inner: Rc<EntityTypeInner>,
}

pub(crate) struct EntityTypeInner {
	pub(crate) id: EntityTypeId,
	pub(crate) names: Vec<String>,
	/// One column per component, one cell per entity slot.
	pub(crate) columns: Vec<Box<[RefCell<Box<dyn Component>>]>>,
	state: RefCell<PoolState>,
	systems: Vec<Weak<dyn Subscriber>>,
	on_acquire: RefCell<Option<Hook>>,
	on_free: RefCell<Option<Hook>>,
}

struct PoolState {
	free: Vec<u32>,
	used: SparseSet,
}

impl EntityType {
	/// Builds a pool of `capacity` entities from `builder`, wired to the matching `systems`.
	///
	/// A system is wired when its [MatchPolicy](crate::systems::MatchPolicy) accepts the
	/// declared components; the wiring never changes afterwards.
	///
	/// # Errors
	/// [EcsError::InvalidCapacity] if `capacity` is zero or does not fit a `u32` slot index.
	#[inline(never)]
	pub fn build<I>(capacity: usize, builder: &InstanceBuilder, systems: I) -> Result<Self, EcsError>
	where
		I: IntoIterator<Item = SystemRef>,
	{
		if capacity == 0 || capacity >= u32::MAX as usize {
			return Err(EcsError::InvalidCapacity(capacity));
		}

		let id = EntityTypeId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
		let names = builder.components().into_iter().map(str::to_owned).collect::<Vec<_>>();

		let mut columns = (0..names.len()).map(|_| Vec::with_capacity(capacity)).collect::<Vec<_>>();
		for _ in 0..capacity {
			for (column, (_, instance)) in columns.iter_mut().zip(builder) {
				column.push(RefCell::new(instance));
			}
		}

		let mut wired: HashSet<_, Hasher> = HashSet::default();
		let mut subscribers = Vec::new();
		for system in systems {
			if !system.matches(&names) || !wired.insert(system.id()) {
				continue;
			}
			debug!(entity_type = %id, system = %system.id(), "system wired");
			subscribers.push(Rc::downgrade(&system.inner));
		}

		debug!(entity_type = %id, capacity, components = ?names, systems = subscribers.len(), "entity type built");
		Ok(Self {
			inner: Rc::new(EntityTypeInner {
				id,
				names,
				columns: columns.into_iter().map(Vec::into_boxed_slice).collect(),
				state: RefCell::new(PoolState {
					free: (0..capacity as u32).rev().collect(),
					used: SparseSet::with_capacity(capacity),
				}),
				systems: subscribers,
				on_acquire: RefCell::default(),
				on_free: RefCell::default(),
			}),
		})
	}

	/// Hands out an unused entity, or `None` if every entity is in use.
	///
	/// The most recently freed entity is reused first. The entity is subscribed to every
	/// wired system before the [on_acquire](EntityType::on_acquire) hook runs.
	pub fn acquire(&self) -> Option<Entity> {
		let index = {
			let mut state = self.inner.state.borrow_mut();
			let index = state.free.pop()?;
			state.used.insert(index);
			index
		};

		let entity = Entity::new(self.inner.clone(), index);
		trace!(entity_type = %self.inner.id, index, "entity acquired");
		for system in self.inner.systems() {
			system.subscribe(&entity);
		}

		let hook = self.inner.on_acquire.borrow().clone();
		if let Some(hook) = hook {
			hook(&entity);
		}
		Some(entity)
	}

	/// Returns `entity` to the pool. Freeing an entity that is not in use does nothing.
	///
	/// # Errors
	/// [EcsError::ForeignEntity] if `entity` was allocated by another pool.
	pub fn free(&self, entity: &Entity) -> Result<(), EcsError> {
		if !Rc::ptr_eq(&self.inner, &entity.owner) {
			return Err(EcsError::ForeignEntity {
				expected: self.inner.id,
				found: entity.type_id(),
			});
		}
		self.inner.release(entity);
		Ok(())
	}

	/// Registers the hook run after each successful [acquire](EntityType::acquire).
	/// Replaces any previous hook.
	pub fn on_acquire<F: Fn(&Entity) + 'static>(&self, hook: F) {
		*self.inner.on_acquire.borrow_mut() = Some(Rc::new(hook));
	}

	/// Registers the hook run after each entity is freed.
	/// Replaces any previous hook.
	pub fn on_free<F: Fn(&Entity) + 'static>(&self, hook: F) {
		*self.inner.on_free.borrow_mut() = Some(Rc::new(hook));
	}

	pub fn id(&self) -> EntityTypeId {
		self.inner.id
	}

	/// The declared component names, in declaration order.
	pub fn components(&self) -> &[String] {
		&self.inner.names
	}

	/// The fixed number of entities in the pool.
	pub fn capacity(&self) -> usize {
		self.inner.capacity()
	}

	pub fn free_count(&self) -> usize {
		self.inner.state.borrow().free.len()
	}

	pub fn used_count(&self) -> usize {
		self.inner.state.borrow().used.len()
	}

	/// A snapshot of the entities currently in use.
	pub fn used(&self) -> Vec<Entity> {
		let slots = Ref::map(self.inner.state.borrow(), |state| state.used.as_slice());
		slots.iter().map(|&index| Entity::new(self.inner.clone(), index)).collect()
	}

	/// Whether `system` was wired to this type at construction and is still alive.
	pub fn is_wired(&self, system: &SystemRef) -> bool {
		self.inner.systems().any(|s| s.id() == system.id())
	}
}

impl EntityTypeInner {
	pub(crate) fn capacity(&self) -> usize {
		let state = self.state.borrow();
		state.free.len() + state.used.len()
	}

	pub(crate) fn is_used(&self, index: u32) -> bool {
		self.state.borrow().used.contains(index)
	}

	pub(crate) fn column(&self, name: &str) -> Option<&[RefCell<Box<dyn Component>>]> {
		let position = self.names.iter().position(|n| n == name)?;
		Some(&self.columns[position])
	}

	/// Wired systems that have not been dropped.
	fn systems(&self) -> impl Iterator<Item = Rc<dyn Subscriber>> + '_ {
		self.systems.iter().filter_map(Weak::upgrade)
	}

	pub(crate) fn release(&self, entity: &Entity) {
		let index = entity.index();
		{
			let mut state = self.state.borrow_mut();
			if !state.used.remove(index) {
				trace!(entity_type = %self.id, index, "entity already free");
				return;
			}
			state.free.push(index);
		}

		trace!(entity_type = %self.id, index, "entity freed");
		for system in self.systems() {
			if let Err(error) = system.unsubscribe(entity) {
				warn!(entity_type = %self.id, %error, "system lost track of a member");
			}
		}

		let hook = self.on_free.borrow().clone();
		if let Some(hook) = hook {
			hook(entity);
		}
	}
}

impl fmt::Debug for EntityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.borrow();
		f.debug_struct("EntityType")
			.field("id", &self.inner.id)
			.field("components", &self.inner.names)
			.field("free", &state.free.len())
			.field("used", &state.used.len())
			.field("systems", &self.inner.systems.len())
			.finish()
	}
}
