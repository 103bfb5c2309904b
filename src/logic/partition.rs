//! Capacity split of a sign-up sheet into confirmed and waiting lists.

use crate::models::Signup;
use serde::Serialize;

/// Whether a name made the cut.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Confirmed,
    Waiting,
}

/// Confirmed prefix and waiting suffix of a roster. Derived on every read, never stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Partition<'a> {
    pub confirmed: &'a [Signup],
    pub waiting: &'a [Signup],
    pub capacity: usize,
}

impl<'a> Partition<'a> {
    /// Confirmed names in arrival order.
    pub fn confirmed_names(&self) -> Vec<String> {
        self.confirmed
            .iter()
            .map(|s| s.player_name.clone())
            .collect()
    }

    /// No confirmed places left; further signups go to the waitlist.
    pub fn is_full(&self) -> bool {
        self.confirmed.len() >= self.capacity
    }

    pub fn status_of(&self, name: &str) -> Option<AttendanceStatus> {
        let name = name.trim();
        if self.confirmed.iter().any(|s| s.player_name == name) {
            Some(AttendanceStatus::Confirmed)
        } else if self.waiting.iter().any(|s| s.player_name == name) {
            Some(AttendanceStatus::Waiting)
        } else {
            None
        }
    }

    /// 1-based position on the waitlist.
    pub fn waiting_position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.waiting
            .iter()
            .position(|s| s.player_name == name)
            .map(|i| i + 1)
    }
}

/// Split `roster` into the first `min(capacity, len)` signups and the rest, both in arrival order.
///
/// Waitlist promotion falls out of this: after a cancellation the next call simply yields a
/// longer confirmed prefix.
pub fn partition(roster: &[Signup], capacity: usize) -> Partition<'_> {
    let (confirmed, waiting) = roster.split_at(capacity.min(roster.len()));
    Partition {
        confirmed,
        waiting,
        capacity,
    }
}
