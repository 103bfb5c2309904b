//! Request-level flows over the store: sign-up/cancel and the lineup draft editor.
//!
//! Everything here blocks on the store; the web layer runs it on a blocking thread. Writes and
//! stale-slot releases only act on a roster the store actually returned, never on the empty
//! fallback roster.

use crate::logic::{
    assign_exclusive, available_players, partition, release_stale, render_lineup,
    resize_formation, SlotView,
};
use crate::models::{Choice, EventRoster, Formation, Lineup, LineupError, Quarter, RosterError, Signup};
use crate::store::{save_lineup, try_load_lineup, try_load_roster, SheetStore, StoreError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Sign-up sheet action failures.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SheetError {
    /// Rejected user action (blank name, duplicate, unknown name).
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lineup edit failures.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EditError {
    #[error(transparent)]
    Lineup(#[from] LineupError),
    /// The choice was not among the slot's offered players.
    #[error("{player} is not available for {slot_id}")]
    NotOffered { player: String, slot_id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Append a sign-up. Duplicate checks run against the roster the store returned; if it cannot
/// be read nothing is written.
pub fn sign_up(
    store: &dyn SheetStore,
    category: &str,
    event_id: &str,
    name: &str,
    timestamp: &str,
) -> Result<(EventRoster, Signup), SheetError> {
    let mut roster = try_load_roster(store, category, event_id)?;
    let signup = roster.add_signup(name, timestamp)?.clone();
    store.add_signup(category, &signup)?;
    log::info!("{} signed up for {}", signup.player_name, event_id);
    Ok((roster, signup))
}

/// Cancel a sign-up by exact name.
pub fn cancel(
    store: &dyn SheetStore,
    category: &str,
    event_id: &str,
    name: &str,
) -> Result<(EventRoster, Signup), SheetError> {
    let mut roster = try_load_roster(store, category, event_id)?;
    let removed = roster.remove_signup(name)?;
    store.delete_signup(category, event_id, &removed.player_name)?;
    log::info!("{} cancelled for {}", removed.player_name, event_id);
    Ok((roster, removed))
}

/// Rendered lineup editor state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LineupView {
    pub event_id: String,
    pub quarter: Quarter,
    pub formation: Formation,
    pub slots: Vec<SlotView>,
    /// Slots cleared because their player is no longer confirmed (shown once, then released).
    pub released: Vec<String>,
    /// False when the store could not be read; nothing was released and the view may be partial.
    pub store_available: bool,
}

impl LineupView {
    fn new(lineup: &Lineup, slots: Vec<SlotView>, released: Vec<String>, store_available: bool) -> Self {
        Self {
            event_id: lineup.event_id.clone(),
            quarter: lineup.quarter,
            formation: lineup.formation,
            slots,
            released,
            store_available,
        }
    }
}

struct DraftEntry {
    lineup: Lineup,
    last_activity: Instant,
}

/// Unsaved lineups by (event, quarter) with their last activity time.
#[derive(Default)]
pub struct LineupDrafts {
    entries: RwLock<HashMap<(String, Quarter), DraftEntry>>,
}

impl LineupDrafts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft for (event, quarter); touching it refreshes its activity time.
    pub fn get(&self, event_id: &str, quarter: Quarter) -> Option<Lineup> {
        let mut g = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        g.get_mut(&(event_id.to_string(), quarter)).map(|entry| {
            entry.last_activity = Instant::now();
            entry.lineup.clone()
        })
    }

    pub fn put(&self, lineup: Lineup) {
        let mut g = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        g.insert(
            (lineup.event_id.clone(), lineup.quarter),
            DraftEntry {
                lineup,
                last_activity: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop drafts idle for at least `max_idle`. Returns how many were dropped.
    pub fn remove_idle(&self, max_idle: Duration) -> usize {
        let mut g = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = g.len();
        g.retain(|_, entry| entry.last_activity.elapsed() < max_idle);
        before - g.len()
    }
}

/// Lineup edit flow for one category: drafts live in memory, `save` writes through to the store.
pub struct LineupEditor<'a> {
    store: &'a dyn SheetStore,
    category: &'a str,
    drafts: &'a LineupDrafts,
}

impl<'a> LineupEditor<'a> {
    pub fn new(store: &'a dyn SheetStore, category: &'a str, drafts: &'a LineupDrafts) -> Self {
        Self {
            store,
            category,
            drafts,
        }
    }

    fn confirmed(&self, event_id: &str, capacity: usize) -> Result<Vec<String>, StoreError> {
        let roster = try_load_roster(self.store, self.category, event_id)?;
        Ok(partition(&roster.signups, capacity).confirmed_names())
    }

    /// Draft, else the saved lineup, else a fresh one. Only real store answers become drafts.
    fn draft(&self, event_id: &str, quarter: Quarter) -> Result<Lineup, StoreError> {
        if let Some(lineup) = self.drafts.get(event_id, quarter) {
            return Ok(lineup);
        }
        let lineup = try_load_lineup(self.store, self.category, event_id, quarter)?
            .unwrap_or_else(|| Lineup::empty(event_id, quarter));
        self.drafts.put(lineup.clone());
        Ok(lineup)
    }

    /// Editor view. Stale holders are shown once and then released from the draft. When the
    /// store cannot be read the draft is shown as-is and nothing is released.
    pub fn view(&self, event_id: &str, capacity: usize, quarter: Quarter) -> LineupView {
        let lineup = match self.draft(event_id, quarter) {
            Ok(lineup) => lineup,
            Err(e) => {
                log::warn!("Lineup {} {} unavailable, showing an empty lineup: {}", event_id, quarter, e);
                let empty = Lineup::empty(event_id, quarter);
                return LineupView::new(&empty, render_lineup(&empty, &[]), Vec::new(), false);
            }
        };
        match self.confirmed(event_id, capacity) {
            Ok(confirmed) => {
                let slots = render_lineup(&lineup, &confirmed);
                let mut next = lineup.clone();
                let released = release_stale(&mut next, &confirmed);
                if !released.is_empty() {
                    self.drafts.put(next);
                }
                LineupView::new(&lineup, slots, released, true)
            }
            Err(e) => {
                log::warn!("Roster for {} unavailable, keeping lineup bindings: {}", event_id, e);
                let holders: Vec<String> = lineup.assigned_players().map(str::to_string).collect();
                LineupView::new(&lineup, render_lineup(&lineup, &holders), Vec::new(), false)
            }
        }
    }

    /// Put a player (or nobody) and/or a role into a slot.
    ///
    /// `player: None` keeps the slot's current player, so a role can be set before or after the
    /// player. The choice must be one `available_players` offers for the slot.
    pub fn assign(
        &self,
        event_id: &str,
        capacity: usize,
        quarter: Quarter,
        slot_id: &str,
        player: Option<&str>,
        role: Option<&str>,
    ) -> Result<LineupView, EditError> {
        let confirmed = self.confirmed(event_id, capacity)?;
        let mut lineup = self.draft(event_id, quarter)?;
        let choice = match player {
            Some(p) => Choice::from(p),
            None => Choice::from(
                lineup
                    .slot(slot_id)
                    .ok_or_else(|| LineupError::InvalidSlot(slot_id.to_string()))?
                    .assigned_player
                    .clone(),
            ),
        };
        let offered = available_players(&lineup, slot_id, &confirmed)?;
        if !offered.contains(&choice) {
            return Err(EditError::NotOffered {
                player: choice.label().to_string(),
                slot_id: slot_id.to_string(),
            });
        }
        assign_exclusive(&mut lineup, slot_id, choice, role)?;
        self.drafts.put(lineup.clone());
        Ok(LineupView::new(&lineup, render_lineup(&lineup, &confirmed), Vec::new(), true))
    }

    /// Change the formation of the draft.
    pub fn set_formation(
        &self,
        event_id: &str,
        capacity: usize,
        quarter: Quarter,
        formation: Formation,
    ) -> Result<LineupView, EditError> {
        let confirmed = self.confirmed(event_id, capacity)?;
        let mut lineup = self.draft(event_id, quarter)?;
        resize_formation(&mut lineup, formation);
        self.drafts.put(lineup.clone());
        Ok(LineupView::new(&lineup, render_lineup(&lineup, &confirmed), Vec::new(), true))
    }

    /// Write the draft to the store. On failure the draft stays in memory unsaved.
    pub fn save(&self, event_id: &str, quarter: Quarter) -> Result<Lineup, EditError> {
        let lineup = self.draft(event_id, quarter)?;
        save_lineup(self.store, self.category, &lineup)?;
        log::info!("Saved lineup {} {} ({})", lineup.event_id, lineup.quarter, lineup.formation);
        Ok(lineup)
    }
}
