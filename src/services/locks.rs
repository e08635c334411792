use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One mutex per series, so recalculations of the same series never overlap
/// while different series proceed in parallel.
///
/// Entries nobody holds are pruned on the next lookup, so the map only grows
/// with the number of series being recalculated at once.
#[derive(Debug, Default)]
pub struct SeriesLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SeriesLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_series(&self, series_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|id, lock| id == series_id || Arc::strong_count(lock) > 1);
        locks
            .entry(series_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
