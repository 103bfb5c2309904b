//! Signup and EventRoster: the ordered sign-up sheet for one event.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of one scheduled meetup (date + location label, e.g. "2026-03-07 Riverside").
pub type EventId = String;

/// Errors for direct user actions on a roster. These are shown to the user as a rejected action.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RosterError {
    /// Name was empty after trimming.
    #[error("Name must not be empty")]
    EmptyName,
    /// The exact (trimmed, case-sensitive) name is already on the sheet.
    #[error("{0} has already signed up")]
    DuplicateSignup(String),
    /// Cancellation of a name that is not on the sheet.
    #[error("{0} is not on the sign-up sheet")]
    NotFound(String),
}

/// One row of the sign-up sheet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signup {
    pub event_id: EventId,
    pub player_name: String,
    pub timestamp: String,
}

impl Signup {
    pub fn new(event_id: impl Into<String>, player_name: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            player_name: player_name.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Signups for one event in arrival order. Grows by append, shrinks by removal; never reordered.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EventRoster {
    pub event_id: EventId,
    pub signups: Vec<Signup>,
}

impl EventRoster {
    /// Empty roster for an event.
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            signups: Vec::new(),
        }
    }

    /// Build the roster for `event_id` out of the store's attendance rows (all events mixed).
    ///
    /// Rows for other events are ignored. A repeated name keeps its first (earliest) row.
    pub fn from_rows<'a, I>(event_id: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Signup>,
    {
        let mut roster = Self::new(event_id);
        for row in rows.into_iter().filter(|r| r.event_id == event_id) {
            let name = row.player_name.trim();
            if name.is_empty() {
                log::warn!("Skipping blank sign-up row for {}", event_id);
                continue;
            }
            if roster.contains(name) {
                log::warn!("Skipping duplicate sign-up row for {} in {}", name, event_id);
                continue;
            }
            roster
                .signups
                .push(Signup::new(event_id, name, row.timestamp.clone()));
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.signups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signups.is_empty()
    }

    /// Exact, case-sensitive lookup on the trimmed name.
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.signups.iter().any(|s| s.player_name == name)
    }

    /// Append a signup at the back of the queue. Returns the stored row.
    pub fn add_signup(
        &mut self,
        name: &str,
        timestamp: impl Into<String>,
    ) -> Result<&Signup, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self.contains(name) {
            return Err(RosterError::DuplicateSignup(name.to_string()));
        }
        self.signups
            .push(Signup::new(self.event_id.clone(), name, timestamp));
        let last = self.signups.len() - 1;
        Ok(&self.signups[last])
    }

    /// Remove a signup by exact name. Later signups move up one place.
    pub fn remove_signup(&mut self, name: &str) -> Result<Signup, RosterError> {
        let name = name.trim();
        let idx = self
            .signups
            .iter()
            .position(|s| s.player_name == name)
            .ok_or_else(|| RosterError::NotFound(name.to_string()))?;
        Ok(self.signups.remove(idx))
    }
}
