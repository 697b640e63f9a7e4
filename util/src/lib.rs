//! Unopinionated standalone utilities.

mod geom;
pub use geom::{dir8_index, VecExt, DIR_8};

mod grid;
pub use grid::Grid;

type DefaultHashBuilder = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion order preserving set with an efficient hash function.
pub type IndexSet<V> = indexmap::IndexSet<V, DefaultHashBuilder>;
