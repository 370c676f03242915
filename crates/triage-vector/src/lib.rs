//! Exact nearest-neighbour search over one vector per category.
//!
//! Category sets are small, so a linear scan with squared Euclidean distance
//! is both fast enough and exactly reproducible. Ties go to the entry
//! inserted first. The index is immutable once built; to change the category
//! set, build a new one and swap it in through an `IndexHandle`.

pub mod handle;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use triage_core::{Category, Embedder, Error, Result};

pub use handle::IndexHandle;

/// A search hit. `distance` is the squared L2 distance; lower is closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub category: Category,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    categories: Vec<Category>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl VectorIndex {
    /// Build from `(category, vector)` pairs in insertion order.
    pub fn build<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Category, Vec<f32>)>,
    {
        let mut categories = Vec::new();
        let mut vectors: Vec<Vec<f32>> = Vec::new();
        let mut seen = HashSet::new();
        for (category, vector) in entries {
            if let Some(first) = vectors.first() {
                if vector.len() != first.len() {
                    return Err(Error::DimensionMismatch { expected: first.len(), actual: vector.len() });
                }
            }
            if !is_finite(&vector) {
                return Err(Error::NonFiniteVector(format!("category '{category}'")));
            }
            if !seen.insert(category.clone()) {
                return Err(Error::DuplicateCategory(category));
            }
            categories.push(category);
            vectors.push(vector);
        }
        let dim = match vectors.first() {
            Some(v) => v.len(),
            None => return Err(Error::EmptyIndex),
        };
        info!(entries = categories.len(), dim, "vector index built");
        Ok(Self { categories, vectors, dim })
    }

    /// Embed each category name and index the result.
    pub fn from_categories<S: AsRef<str>>(categories: &[S], embedder: &dyn Embedder) -> Result<Self> {
        let names: Vec<String> = categories.iter().map(|c| c.as_ref().to_string()).collect();
        let vectors = embedder.embed_batch(&names).map_err(Error::embedding)?;
        if vectors.len() != names.len() {
            return Err(Error::embedding(anyhow::anyhow!(
                "embedder returned {} vectors for {} categories",
                vectors.len(),
                names.len()
            )));
        }
        Self::build(names.into_iter().zip(vectors))
    }

    pub fn len(&self) -> usize { self.categories.len() }

    pub fn is_empty(&self) -> bool { self.categories.is_empty() }

    pub fn dim(&self) -> usize { self.dim }

    pub fn categories(&self) -> &[Category] { &self.categories }

    /// Closest category to `query`; the earliest inserted wins a tie.
    pub fn nearest(&self, query: &[f32]) -> Result<Neighbor> {
        self.check_query(query)?;
        let mut best: Option<(usize, f32)> = None;
        for (i, v) in self.vectors.iter().enumerate() {
            let d = squared_l2(query, v);
            if best.map_or(true, |(_, bd)| d.total_cmp(&bd).is_lt()) {
                best = Some((i, d));
            }
        }
        let (i, distance) = best.ok_or(Error::EmptyIndex)?;
        Ok(Neighbor { category: self.categories[i].clone(), distance })
    }

    /// Up to `k` closest categories, nearest first, ties in insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_query(query)?;
        let mut hits: Vec<Neighbor> = self
            .categories
            .iter()
            .zip(&self.vectors)
            .map(|(c, v)| Neighbor { category: c.clone(), distance: squared_l2(query, v) })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    fn check_query(&self, query: &[f32]) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyIndex);
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if !is_finite(query) {
            return Err(Error::NonFiniteVector("query".into()));
        }
        Ok(())
    }
}

fn is_finite(v: &[f32]) -> bool {
    v.iter().all(|x| x.is_finite())
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_l2_basic() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn mixed_dimensions_rejected_at_build() {
        let err = VectorIndex::build(vec![("a".to_string(), vec![1.0, 2.0]), ("b".to_string(), vec![1.0])]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn nearest_and_search_share_one_ordering() {
        let index = VectorIndex::build(vec![
            ("far".to_string(), vec![9.0, 9.0]),
            ("near".to_string(), vec![1.0, 1.0]),
            ("tied".to_string(), vec![1.0, 1.0]),
        ])
        .unwrap();
        let q = [1.5, 1.5];
        assert_eq!(index.nearest(&q).unwrap(), index.search(&q, 1).unwrap()[0]);
        assert_eq!(index.nearest(&q).unwrap().category, "near");
    }
}
