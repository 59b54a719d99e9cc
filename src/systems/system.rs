use crate::systems::{MatchPolicy, Subscriber, SystemId, SystemRef};
use std::cell::{Cell, OnceCell, Ref, RefCell, RefMut};
use tracing::{trace, trace_span};
use crate::entities::Entity;
use crate::error::EcsError;
use std::fmt;
use std::rc::Rc;

type Callback<A> = Box<dyn Fn(&System<A>, &Entity, &A)>;

/// Runs a callback over every subscribed [Entity] once per frame.
///
/// Entities are subscribed and unsubscribed by the [entity types](crate::entities::EntityType)
/// the system is wired to, when they are acquired or freed.
/// While the system is dispatching, every membership change is queued instead of applied;
/// the queues are flushed once the frame ends, removals first, then additions.
/// Changes made while a view returned by [entities](System::entities) is alive are queued
/// the same way and flushed by the next dispatch or membership change.
/// An entity acquired by a callback is therefore first visited on the next dispatch,
/// and an entity freed by a callback stays in [entities](System::entities) until the current one returns.
///
/// `A` is the frame argument forwarded to the callback, e.g. the delta time.
pub struct System<A: 'static = ()> {
	inner: Rc<SystemInner<A>>,
}

struct SystemInner<A: 'static> {
	id: SystemId,
	components: Vec<String>,
	policy: MatchPolicy,
	callback: OnceCell<Callback<A>>,
	locked: Cell<bool>,
	entities: RefCell<Vec<Entity>>,
	pending_add: RefCell<Vec<Entity>>,
	pending_remove: RefCell<Vec<Entity>>,
}

impl<A: 'static> System<A> {
	/// Creates an unbound system requiring the given components.
	///
	/// # Errors
	/// [EcsError::InvalidName] for an empty name and
	/// [EcsError::DuplicateComponent] for a name listed twice.
	pub fn new<I, S>(components: I) -> Result<Self, EcsError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::with_policy(components, MatchPolicy::default())
	}

	/// Creates an unbound system with an explicit wiring [policy](MatchPolicy).
	pub fn with_policy<I, S>(components: I, policy: MatchPolicy) -> Result<Self, EcsError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut names: Vec<String> = Vec::new();
		for name in components {
			let name = name.into();
			if name.is_empty() {
				return Err(EcsError::InvalidName);
			}
			if names.contains(&name) {
				return Err(EcsError::DuplicateComponent(name));
			}
			names.push(name);
		}

		Ok(Self {
			inner: Rc::new(SystemInner {
				id: SystemId::next(),
				components: names,
				policy,
				callback: OnceCell::new(),
				locked: Cell::new(false),
				entities: RefCell::default(),
				pending_add: RefCell::default(),
				pending_remove: RefCell::default(),
			}),
		})
	}

	/// Creates a system and binds `callback` to it in one step.
	pub fn with_callback<I, S, F>(components: I, callback: F) -> Result<Self, EcsError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
		F: Fn(&System<A>, &Entity, &A) + 'static,
	{
		let system = Self::new(components)?;
		system.bind(callback);
		Ok(system)
	}

	/// Binds the per-entity callback.
	///
	/// Only the first bind takes effect; returns `false` if a callback was already bound.
	pub fn bind<F>(&self, callback: F) -> bool
	where
		F: Fn(&System<A>, &Entity, &A) + 'static,
	{
		self.inner.callback.set(Box::new(callback)).is_ok()
	}

	pub fn is_bound(&self) -> bool {
		self.inner.callback.get().is_some()
	}

	pub fn id(&self) -> SystemId {
		self.inner.id
	}

	/// The required component names, in declaration order.
	pub fn components(&self) -> &[String] {
		&self.inner.components
	}

	pub fn policy(&self) -> MatchPolicy {
		self.inner.policy
	}

	/// Whether the system is currently dispatching.
	pub fn is_locked(&self) -> bool {
		self.inner.locked.get()
	}

	/// The live membership, in visiting order.
	///
	/// Changes requested while a returned view is alive are queued and applied
	/// once no view is held.
	pub fn entities(&self) -> Ref<'_, [Entity]> {
		self.inner.flush();
		Ref::map(self.inner.entities.borrow(), |entities| entities.as_slice())
	}

	pub fn contains(&self, entity: &Entity) -> bool {
		self.entities().contains(entity)
	}

	pub fn len(&self) -> usize {
		self.entities().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entities().is_empty()
	}

	/// Subscribes `entity`, or queues the subscription while dispatching
	/// or while the membership is being read.
	pub fn add(&self, entity: &Entity) {
		self.inner.subscribe(entity)
	}

	/// Unsubscribes `entity`, or queues the removal while dispatching
	/// or while the membership is being read.
	///
	/// # Errors
	/// [EcsError::NotFound] if the removal is applied immediately and `entity` is not a member.
	/// Queued removals of non-members are dropped silently at flush time.
	pub fn remove(&self, entity: &Entity) -> Result<(), EcsError> {
		self.inner.unsubscribe(entity)
	}

	/// A type-erased handle for wiring this system into entity types.
	pub fn subscriber(&self) -> SystemRef {
		SystemRef {
			inner: self.inner.clone(),
		}
	}

	/// Runs the callback once per member, forwarding `args`.
	///
	/// Calling this from inside the system's own callback does nothing.
	///
	/// # Errors
	/// [EcsError::Unimplemented] if no callback was ever bound.
	pub fn dispatch(&self, args: &A) -> Result<(), EcsError> {
		let inner = &*self.inner;
		let Some(callback) = inner.callback.get() else {
			return Err(EcsError::Unimplemented(inner.id));
		};

		if inner.locked.get() {
			trace!(system = %inner.id, "re-entrant dispatch skipped");
			return Ok(());
		}

		let _span = trace_span!("dispatch", system = %inner.id).entered();
		inner.flush();
		{
			let _lock = Lock::acquire(&inner.locked);
			let mut index = 0;
			loop {
				// No borrow is held while the callback runs.
				let entity = match inner.entities.borrow().get(index) {
					Some(entity) => entity.clone(),
					None => break,
				};
				callback(self, &entity, args);
				index += 1;
			}
		}

		inner.flush();
		Ok(())
	}
}

impl<A: 'static> SystemInner<A> {
	/// Applies queued changes, removals first, unless the system is dispatching
	/// or its membership is currently borrowed.
	fn flush(&self) {
		if self.locked.get() {
			return;
		}
		if self.pending_remove.borrow().is_empty() && self.pending_add.borrow().is_empty() {
			return;
		}
		let Ok(mut entities) = self.entities.try_borrow_mut() else {
			return;
		};

		let removals = std::mem::take(&mut *self.pending_remove.borrow_mut());
		let additions = std::mem::take(&mut *self.pending_add.borrow_mut());
		trace!(system = %self.id, removals = removals.len(), additions = additions.len(), "flushing");
		for entity in removals {
			if let Some(position) = entities.iter().position(|e| *e == entity) {
				entities.remove(position);
			}
		}
		entities.extend(additions);
	}

	/// The membership, if it can be mutated right now.
	fn live_entities(&self) -> Option<RefMut<'_, Vec<Entity>>> {
		if self.locked.get() {
			return None;
		}
		self.entities.try_borrow_mut().ok()
	}
}

impl<A: 'static> Subscriber for SystemInner<A> {
	fn id(&self) -> SystemId {
		self.id
	}

	fn components(&self) -> &[String] {
		&self.components
	}

	fn policy(&self) -> MatchPolicy {
		self.policy
	}

	fn subscribe(&self, entity: &Entity) {
		self.flush();
		if let Some(mut entities) = self.live_entities() {
			entities.push(entity.clone());
			return;
		}

		trace!(system = %self.id, ?entity, "addition queued");
		self.pending_add.borrow_mut().push(entity.clone());
	}

	fn unsubscribe(&self, entity: &Entity) -> Result<(), EcsError> {
		self.flush();
		let Some(mut entities) = self.live_entities() else {
			trace!(system = %self.id, ?entity, "removal queued");
			// An addition queued in the same frame was never applied; drop it.
			let mut pending_add = self.pending_add.borrow_mut();
			if let Some(position) = pending_add.iter().position(|e| e == entity) {
				pending_add.remove(position);
			}
			self.pending_remove.borrow_mut().push(entity.clone());
			return Ok(());
		};

		// Ordered removal: members are visited in subscription order.
		match entities.iter().position(|e| e == entity) {
			Some(position) => {
				entities.remove(position);
				Ok(())
			},
			None => Err(EcsError::NotFound {
				system: self.id,
				entity: format!("{entity:?}"),
			}),
		}
	}
}

/// Holds a system's lock for the duration of one dispatch.
struct Lock<'l> {
	flag: &'l Cell<bool>,
}

impl<'l> Lock<'l> {
	fn acquire(flag: &'l Cell<bool>) -> Self {
		flag.set(true);
		Self { flag }
	}
}

impl Drop for Lock<'_> {
	fn drop(&mut self) {
		self.flag.set(false);
	}
}

impl<A: 'static> Clone for System<A> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<A: 'static> fmt::Debug for System<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("System")
			.field("id", &self.inner.id)
			.field("components", &self.inner.components)
			.field("policy", &self.inner.policy)
			.field("locked", &self.inner.locked.get())
			.field("members", &self.inner.entities.borrow().len())
			.finish()
	}
}
