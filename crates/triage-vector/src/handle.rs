use std::sync::{Arc, RwLock};

use crate::VectorIndex;

/// Shared, swappable reference to a built index.
///
/// Readers take a cheap `Arc` snapshot and search it without holding the
/// lock, so a `replace` never disturbs a search already in flight.
#[derive(Debug)]
pub struct IndexHandle {
    current: RwLock<Arc<VectorIndex>>,
}

impl IndexHandle {
    pub fn new(index: VectorIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn current(&self) -> Arc<VectorIndex> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Install `index` and return the one it replaced.
    pub fn replace(&self, index: VectorIndex) -> Arc<VectorIndex> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(index))
    }
}
