//! Remote spreadsheet store: wire rows, the store trait, and the fall-back loaders.
//!
//! The store is the single source of truth. There is no concurrency control: the last lineup
//! save for an (event, quarter) wins.

mod cache;
mod codec;
mod http;
mod memory;

pub use cache::{CachedStore, DEFAULT_SNAPSHOT_TTL};
pub use codec::{decode_positions, encode_positions, lineup_from_row, lineup_record};
pub use http::HttpStore;
pub use memory::MemoryStore;

use crate::models::{EventRoster, Lineup, Quarter, Signup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Store failures. Callers recover by falling back to empty/default data.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    /// Network failure, timeout, or an error status from the store.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// Store answered with data that does not parse.
    #[error("Malformed store payload: {0}")]
    MalformedPayload(String),
}

/// Attendance sheet row: (event_id, player_name, timestamp).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRow(pub String, pub String, pub String);

impl From<AttendanceRow> for Signup {
    fn from(row: AttendanceRow) -> Self {
        Signup::new(row.0, row.1, row.2)
    }
}

impl From<&Signup> for AttendanceRow {
    fn from(s: &Signup) -> Self {
        AttendanceRow(s.event_id.clone(), s.player_name.clone(), s.timestamp.clone())
    }
}

/// Lineup sheet row: (event_id, quarter_id, positions_json, formation_string).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineupRow(pub String, pub String, pub String, pub String);

/// Everything the store holds for one event category.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub attendance: Vec<AttendanceRow>,
    #[serde(default)]
    pub lineups: Vec<LineupRow>,
}

/// Body of a lineup save: slot id -> "player|role".
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineupRecord {
    pub event_id: String,
    pub quarter_id: String,
    pub positions: BTreeMap<String, String>,
    pub formation: String,
}

/// Read/append/delete access to the spreadsheet. Calls are blocking.
pub trait SheetStore: Send + Sync {
    /// All attendance and lineup rows for a category.
    fn fetch(&self, category: &str) -> Result<CategoryData, StoreError>;
    /// Append one sign-up row.
    fn add_signup(&self, category: &str, signup: &Signup) -> Result<(), StoreError>;
    /// Delete the sign-up row with this exact name.
    fn delete_signup(&self, category: &str, event_id: &str, player_name: &str) -> Result<(), StoreError>;
    /// Store a lineup, replacing any earlier save for the same (event, quarter).
    fn save_lineup(&self, category: &str, record: &LineupRecord) -> Result<(), StoreError>;
}

impl CategoryData {
    /// Sign-up sheet for one event, in arrival order.
    pub fn roster(&self, event_id: &str) -> EventRoster {
        let signups: Vec<Signup> = self.attendance.iter().cloned().map(Signup::from).collect();
        EventRoster::from_rows(event_id, &signups)
    }

    /// Latest saved row for (event, quarter).
    pub fn lineup_row(&self, event_id: &str, quarter: Quarter) -> Option<&LineupRow> {
        self.lineups
            .iter()
            .rev()
            .find(|r| r.0 == event_id && r.1.parse::<Quarter>().ok() == Some(quarter))
    }
}

/// Roster for an event straight from the store. Callers that write (sign-up, cancel) or that
/// release stale lineup slots need this: an empty fallback roster would look like "nobody signed up".
pub fn try_load_roster(store: &dyn SheetStore, category: &str, event_id: &str) -> Result<EventRoster, StoreError> {
    store.fetch(category).map(|data| data.roster(event_id))
}

/// Roster for an event; an unreachable or broken store yields an empty roster.
pub fn load_roster(store: &dyn SheetStore, category: &str, event_id: &str) -> EventRoster {
    try_load_roster(store, category, event_id).unwrap_or_else(|e| {
        log::warn!("Loading roster for {} failed, showing empty sheet: {}", event_id, e);
        EventRoster::new(event_id)
    })
}

/// Saved lineup for (event, quarter); `Ok(None)` when nothing has been saved yet.
pub fn try_load_lineup(
    store: &dyn SheetStore,
    category: &str,
    event_id: &str,
    quarter: Quarter,
) -> Result<Option<Lineup>, StoreError> {
    let data = store.fetch(category)?;
    let lineup = data.lineup_row(event_id, quarter).map(lineup_from_row);
    lineup.transpose()
}

/// Saved lineup for (event, quarter), or an all-unassigned default lineup when nothing is saved
/// or the store fails.
pub fn load_lineup(store: &dyn SheetStore, category: &str, event_id: &str, quarter: Quarter) -> Lineup {
    match try_load_lineup(store, category, event_id, quarter) {
        Ok(Some(lineup)) => lineup,
        Ok(None) => Lineup::empty(event_id, quarter),
        Err(e) => {
            log::warn!(
                "Loading lineup {} {} failed, starting from an empty lineup: {}",
                event_id,
                quarter,
                e
            );
            Lineup::empty(event_id, quarter)
        }
    }
}

/// Persist a lineup. On failure the caller keeps its in-memory copy unsaved.
pub fn save_lineup(store: &dyn SheetStore, category: &str, lineup: &Lineup) -> Result<(), StoreError> {
    store.save_lineup(category, &lineup_record(lineup))
}
