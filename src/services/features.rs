use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use crate::models::Catalog;

use super::tfidf::{TermVector, TfidfModel};

/// One term vector per catalog item, aligned with catalog positions
#[derive(Debug)]
pub struct FeatureMatrix {
    rows: Vec<TermVector>,
    norms: Vec<f64>,
}

impl FeatureMatrix {
    /// Vectorizes `title + " " + genres` for every catalog item
    pub fn compute(model: &TfidfModel, catalog: &Catalog) -> Self {
        let rows: Vec<TermVector> = catalog
            .items()
            .iter()
            .map(|item| model.vectorize(&item.document()))
            .collect();
        let norms = rows.iter().map(TermVector::norm).collect();

        Self { rows, norms }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, position: usize) -> Option<&TermVector> {
        self.rows.get(position)
    }

    /// Rows paired with their precomputed L2 norms
    pub fn rows_with_norms(&self) -> impl Iterator<Item = (&TermVector, f64)> + '_ {
        self.rows.iter().zip(self.norms.iter().copied())
    }
}

/// Lazily computed feature matrix for the catalog and model owned alongside it.
///
/// Concurrent first callers block on a single computation; later calls read
/// the cached matrix.
#[derive(Debug, Default)]
pub struct FeatureCache {
    matrix: OnceLock<FeatureMatrix>,
    computations: AtomicUsize,
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callers must always pass the same model and catalog; the owning
    /// [`Recommender`](super::Recommender) guarantees this.
    pub(crate) fn get(&self, model: &TfidfModel, catalog: &Catalog) -> &FeatureMatrix {
        self.matrix.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::SeqCst);
            tracing::info!(movies = catalog.count(), "Computing movie features");

            let started = Instant::now();
            let matrix = FeatureMatrix::compute(model, catalog);

            tracing::info!(
                rows = matrix.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Movie features computed and cached"
            );
            matrix
        })
    }

    pub fn is_computed(&self) -> bool {
        self.matrix.get().is_some()
    }

    /// How many times the matrix has been computed; at most one
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{alien_catalog, alien_model};
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_matrix_aligned_with_catalog() {
        let model = alien_model();
        let catalog = alien_catalog();
        let matrix = FeatureMatrix::compute(&model, &catalog);

        assert_eq!(matrix.len(), catalog.count());
        for (position, item) in catalog.items().iter().enumerate() {
            assert_eq!(matrix.row(position).unwrap(), &model.vectorize(&item.document()));
        }
        for (row, norm) in matrix.rows_with_norms() {
            assert!((row.norm() - norm).abs() < 1e-15);
        }
    }

    #[test]
    fn test_cache_computes_once() {
        let model = alien_model();
        let catalog = alien_catalog();
        let cache = FeatureCache::new();

        assert!(!cache.is_computed());
        let first = cache.get(&model, &catalog);
        let second = cache.get(&model, &catalog);

        assert!(std::ptr::eq(first, second));
        assert!(cache.is_computed());
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn test_concurrent_first_callers_share_one_computation() {
        let model = Arc::new(alien_model());
        let catalog = Arc::new(alien_catalog());
        let cache = Arc::new(FeatureCache::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (model, catalog, cache, barrier) =
                    (model.clone(), catalog.clone(), cache.clone(), barrier.clone());
                std::thread::spawn(move || {
                    barrier.wait();
                    cache.get(&model, &catalog).len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
        assert_eq!(cache.computations(), 1);
    }
}
