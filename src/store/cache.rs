//! Short-lived read snapshots in front of a slow store.

use crate::models::Signup;
use crate::store::{CategoryData, LineupRecord, SheetStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a fetched snapshot is served before it is re-fetched.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(5);

struct Snapshot {
    fetched_at: Instant,
    data: CategoryData,
}

/// Serves `fetch` from a snapshot younger than `ttl`. Any write through the cache drops the
/// category's snapshot so the writer sees its own change on the next read.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    snapshots: Mutex<HashMap<String, Snapshot>>,
}

impl<S: SheetStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the snapshot for a category.
    pub fn invalidate(&self, category: &str) {
        if let Ok(mut g) = self.snapshots.lock() {
            g.remove(category);
        }
    }

    fn cached(&self, category: &str) -> Option<CategoryData> {
        let g = self.snapshots.lock().ok()?;
        g.get(category)
            .filter(|s| s.fetched_at.elapsed() < self.ttl)
            .map(|s| s.data.clone())
    }
}

impl<S: SheetStore> SheetStore for CachedStore<S> {
    fn fetch(&self, category: &str) -> Result<CategoryData, StoreError> {
        if let Some(data) = self.cached(category) {
            return Ok(data);
        }
        // Fetch without holding the lock; concurrent misses may both hit the store.
        let data = self.inner.fetch(category)?;
        if let Ok(mut g) = self.snapshots.lock() {
            g.insert(
                category.to_string(),
                Snapshot {
                    fetched_at: Instant::now(),
                    data: data.clone(),
                },
            );
        }
        Ok(data)
    }

    fn add_signup(&self, category: &str, signup: &Signup) -> Result<(), StoreError> {
        let result = self.inner.add_signup(category, signup);
        self.invalidate(category);
        result
    }

    fn delete_signup(&self, category: &str, event_id: &str, player_name: &str) -> Result<(), StoreError> {
        let result = self.inner.delete_signup(category, event_id, player_name);
        self.invalidate(category);
        result
    }

    fn save_lineup(&self, category: &str, record: &LineupRecord) -> Result<(), StoreError> {
        let result = self.inner.save_lineup(category, record);
        self.invalidate(category);
        result
    }
}
