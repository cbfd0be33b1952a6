use std::collections::BinaryHeap;

use crate::embed::Embedding;
use crate::index::{Neighbor, VectorIndex};
use crate::{Error, Result};

/// Exact L2 index over a flat buffer of vectors.
///
/// Brute-force scan on every query. One ingested book is a few thousand
/// chunks at most, well within what a linear scan handles per query.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    data: Vec<f32>,
    dimension: usize,
}

impl VectorIndex for FlatIndex {
    fn build(vectors: Vec<Embedding>) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(Error::EmptyIndex);
        };
        let dimension = first.len();

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension || dimension == 0 {
                return Err(Error::Dimension {
                    expected: dimension,
                    actual: vector.len(),
                    position,
                });
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(Error::InvalidInput(format!(
                    "vector at position {position} has a non-finite component"
                )));
            }
            data.extend_from_slice(vector);
        }

        Ok(Self { data, dimension })
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(Error::Dimension {
                expected: self.dimension,
                actual: query.len(),
                position: 0,
            });
        }
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        // max-heap holding the k best so far; the worst sits on top
        let mut best = BinaryHeap::with_capacity(k + 1);
        for (position, vector) in self.data.chunks_exact(self.dimension).enumerate() {
            best.push(Neighbor {
                position,
                distance: euclidean_distance(query, vector),
            });
            if best.len() > k {
                best.pop();
            }
        }

        Ok(best.into_sorted_vec())
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Compute the Euclidean (L2) distance between two vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
