mod sparse_set;

pub use sparse_set::*;
