const ABSENT: u32 = u32::MAX;

/// A set of dense slot indices with O(1) insertion, removal and lookup.
///
/// Members are kept packed in a `Vec`; removal swaps the last member into the gap,
/// so iteration order is insertion order only until the first removal.
#[derive(Default, Clone, Debug)]
pub struct SparseSet {
	dense: Vec<u32>,
	sparse: Vec<u32>,
}

impl SparseSet {
	/// Create a new [SparseSet].
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a new [SparseSet] able to hold slots `0..capacity` without reallocating.
	///
	/// # Arguments
	/// * `capacity` - The number of slot indices the set should be sized for
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			dense: Vec::with_capacity(capacity),
			sparse: vec![ABSENT; capacity],
		}
	}

	/// Add `slot` to the set.
	/// Returns `false` if it was already present.
	///
	/// # Arguments
	/// * `slot` - The slot index to insert
	pub fn insert(&mut self, slot: u32) -> bool {
		if self.contains(slot) {
			return false;
		}

		let index = slot as usize;
		if self.sparse.len() <= index {
			self.sparse.resize(index + 1, ABSENT);
		}

		self.sparse[index] = self.dense.len() as u32;
		self.dense.push(slot);
		true
	}

	/// Remove `slot` from the set.
	/// Returns `false` if it was not present.
	///
	/// # Arguments
	/// * `slot` - The slot index to remove
	pub fn remove(&mut self, slot: u32) -> bool {
		if !self.contains(slot) {
			return false;
		}

		let position = self.sparse[slot as usize] as usize;
		self.dense.swap_remove(position);
		if let Some(&moved) = self.dense.get(position) {
			self.sparse[moved as usize] = position as u32;
		}

		self.sparse[slot as usize] = ABSENT;
		true
	}

	#[inline(always)]
	pub fn contains(&self, slot: u32) -> bool {
		match self.sparse.get(slot as usize) {
			Some(&position) => position != ABSENT,
			None => false,
		}
	}

	pub fn len(&self) -> usize {
		self.dense.len()
	}

	pub fn is_empty(&self) -> bool {
		self.dense.is_empty()
	}

	/// Iterate over the members in their packed order.
	pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u32>> {
		self.dense.iter().copied()
	}

	pub fn as_slice(&self) -> &[u32] {
		&self.dense
	}
}
