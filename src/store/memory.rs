//! In-process store, used when no store URL is configured and in tests.

use crate::models::Signup;
use crate::store::{AttendanceRow, CategoryData, LineupRecord, LineupRow, SheetStore, StoreError};
use std::collections::HashMap;
use std::sync::RwLock;

/// Category name -> rows. Behaves like the sheet: appends, exact-name deletes, lineup replace.
#[derive(Default)]
pub struct MemoryStore {
    categories: RwLock<HashMap<String, CategoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with one category's rows.
    pub fn with_data(category: impl Into<String>, data: CategoryData) -> Self {
        let store = Self::new();
        if let Ok(mut g) = store.categories.write() {
            g.insert(category.into(), data);
        }
        store
    }

    fn write<T>(&self, category: &str, f: impl FnOnce(&mut CategoryData) -> T) -> Result<T, StoreError> {
        let mut g = self
            .categories
            .write()
            .map_err(|_| StoreError::Unavailable("lock error".to_string()))?;
        Ok(f(g.entry(category.to_string()).or_default()))
    }
}

impl SheetStore for MemoryStore {
    fn fetch(&self, category: &str) -> Result<CategoryData, StoreError> {
        let g = self
            .categories
            .read()
            .map_err(|_| StoreError::Unavailable("lock error".to_string()))?;
        Ok(g.get(category).cloned().unwrap_or_default())
    }

    fn add_signup(&self, category: &str, signup: &Signup) -> Result<(), StoreError> {
        self.write(category, |data| data.attendance.push(AttendanceRow::from(signup)))
    }

    fn delete_signup(&self, category: &str, event_id: &str, player_name: &str) -> Result<(), StoreError> {
        self.write(category, |data| {
            data.attendance
                .retain(|r| !(r.0 == event_id && r.1 == player_name))
        })
    }

    fn save_lineup(&self, category: &str, record: &LineupRecord) -> Result<(), StoreError> {
        let positions = serde_json::to_string(&record.positions)
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
        let row = LineupRow(
            record.event_id.clone(),
            record.quarter_id.clone(),
            positions,
            record.formation.clone(),
        );
        self.write(category, |data| {
            match data
                .lineups
                .iter_mut()
                .find(|r| r.0 == row.0 && r.1 == row.1)
            {
                Some(existing) => *existing = row,
                None => data.lineups.push(row),
            }
        })
    }
}
