use crate::systems::{System, SystemId};
use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::collections::HashSet;
use crate::error::EcsError;
use tracing::debug_span;

type Hasher = BuildHasherDefault<NoHashHasher<u32>>;

/// Drives a fixed, ordered list of [systems](System) once per frame.
pub struct Schedule<A: 'static = ()> {
	set: HashSet<SystemId, Hasher>,
	systems: Vec<System<A>>,
	frame: u64,
}

impl<A: 'static> Schedule<A> {
	pub fn new() -> Self {
		Self {
			set: HashSet::default(),
			systems: Vec::default(),
			frame: 0,
		}
	}

	/// Appends `system` to the frame order.
	///
	/// # Errors
	/// [EcsError::DuplicateSystem] if it was already added.
	pub fn add_system(&mut self, system: &System<A>) -> Result<&mut Self, EcsError> {
		if !self.set.insert(system.id()) {
			return Err(EcsError::DuplicateSystem(system.id()));
		}
		self.systems.push(system.clone());
		Ok(self)
	}

	/// Dispatches every system once, in the order they were added.
	///
	/// Stops at the first system that fails to dispatch.
	pub fn run(&mut self, args: &A) -> Result<(), EcsError> {
		self.frame += 1;
		let _span = debug_span!("frame", frame = self.frame).entered();
		for system in &self.systems {
			system.dispatch(args)?;
		}
		Ok(())
	}

	/// The number of frames run so far.
	pub fn frame(&self) -> u64 {
		self.frame
	}

	pub fn systems(&self) -> &[System<A>] {
		&self.systems
	}

	pub fn len(&self) -> usize {
		self.systems.len()
	}

	pub fn is_empty(&self) -> bool {
		self.systems.is_empty()
	}
}

impl<A: 'static> Default for Schedule<A> {
	fn default() -> Self {
		Self::new()
	}
}
