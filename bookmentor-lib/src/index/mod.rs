//! Nearest-neighbour vector indexes
//!
//! An index is built once from an ordered list of vectors and never
//! modified. Position `i` in the index is vector `i` of the build input,
//! which the retriever keeps aligned with chunk `i`.
//!
//! # Usage
//!
//! ```ignore
//! use bookmentor_lib::index::{FlatIndex, VectorIndex};
//!
//! let index = FlatIndex::build(embeddings)?;
//! let nearest = index.search(&query_embedding, 5)?;
//! ```

use std::cmp::Ordering;

use crate::embed::Embedding;
use crate::Result;

/// A search hit: the position of a stored vector and its L2 distance to
/// the query
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    /// Position of the vector in the build input
    pub position: usize,
    /// Euclidean distance to the query (lower is closer)
    pub distance: f32,
}

/// Closer first, then lower position.
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

/// Trait for immutable vector indexes
pub trait VectorIndex: Send + Sync + Sized {
    /// Build an index over exactly these vectors, in this order
    ///
    /// Fails with [`Error::EmptyIndex`](crate::Error::EmptyIndex) on no
    /// vectors and [`Error::Dimension`](crate::Error::Dimension) when the
    /// vectors do not share one dimension.
    fn build(vectors: Vec<Embedding>) -> Result<Self>;

    /// Search for the nearest vectors
    ///
    /// # Returns
    /// At most `k` neighbours sorted by ascending distance, ties broken by
    /// lower position
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Get total number of stored vectors
    fn len(&self) -> usize;

    /// Check if index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension shared by every stored vector
    fn dimension(&self) -> usize;
}

mod flat;

pub use flat::*;
