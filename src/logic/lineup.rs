//! Lineup editing: which players a slot may offer, assignment, formation changes.
//!
//! Mutual exclusion is enforced where choices are offered: `available_players` never offers a
//! player that another slot already holds. `assign` trusts its caller; `assign_exclusive`
//! re-checks for callers that cannot guarantee their input came from `available_players`.

use crate::models::{Choice, Formation, Lineup, LineupError, Slot};
use serde::Serialize;
use std::collections::HashSet;

/// Everything a presentation layer needs to draw one slot selector.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SlotView {
    pub slot_id: String,
    pub selected: Choice,
    pub role: Option<String>,
    pub role_options: Vec<String>,
    pub options: Vec<Choice>,
    /// Selected player has dropped out of the confirmed list.
    pub stale: bool,
}

/// Choices for `slot_id`: unassigned first, then confirmed players in arrival order that no other
/// slot holds.
///
/// The slot's own holder is always offered. If that holder is no longer confirmed it is offered
/// last, and only here, so the user can see and clear it.
pub fn available_players(
    lineup: &Lineup,
    slot_id: &str,
    confirmed_players: &[String],
) -> Result<Vec<Choice>, LineupError> {
    let slot = lineup
        .slot(slot_id)
        .ok_or_else(|| LineupError::InvalidSlot(slot_id.to_string()))?;
    let own = slot.assigned_player.as_deref();

    let taken: HashSet<&str> = lineup
        .slots
        .iter()
        .filter(|s| s.slot_id != slot_id)
        .filter_map(|s| s.assigned_player.as_deref())
        .collect();

    let mut choices = vec![Choice::Unassigned];
    choices.extend(
        confirmed_players
            .iter()
            .filter(|p| own == Some(p.as_str()) || !taken.contains(p.as_str()))
            .map(|p| Choice::Player(p.clone())),
    );
    if let Some(own) = own {
        if !confirmed_players.iter().any(|p| p == own) {
            choices.push(Choice::Player(own.to_string()));
        }
    }
    Ok(choices)
}

/// Set the player and role of a slot.
///
/// Player and role edits may arrive in either order: a role given with `Choice::Unassigned` is
/// kept for whoever fills the slot next, and a player given without a role keeps the stored role
/// (or gets the slot's first role option). `Choice::Unassigned` without a role clears the slot.
/// Does not check other slots; see `assign_exclusive`.
pub fn assign(
    lineup: &mut Lineup,
    slot_id: &str,
    choice: Choice,
    role: Option<&str>,
) -> Result<(), LineupError> {
    let slot = lineup
        .slot_mut(slot_id)
        .ok_or_else(|| LineupError::InvalidSlot(slot_id.to_string()))?;
    let given = validate_role(slot, role)?;
    match choice {
        Choice::Unassigned => match given {
            Some(role) => {
                slot.assigned_player = None;
                slot.assigned_role = Some(role);
            }
            None => slot.clear(),
        },
        Choice::Player(name) => {
            let role = given
                .or_else(|| slot.assigned_role.clone())
                .or_else(|| slot.role_options.first().cloned());
            slot.assigned_player = Some(name);
            slot.assigned_role = role;
        }
    }
    Ok(())
}

/// Like `assign`, but rejects a player that another slot already holds.
pub fn assign_exclusive(
    lineup: &mut Lineup,
    slot_id: &str,
    choice: Choice,
    role: Option<&str>,
) -> Result<(), LineupError> {
    if let Choice::Player(name) = &choice {
        if let Some(other) = lineup
            .slots
            .iter()
            .find(|s| s.slot_id != slot_id && s.assigned_player.as_deref() == Some(name.as_str()))
        {
            return Err(LineupError::PlayerAlreadyAssigned {
                player: name.clone(),
                slot_id: other.slot_id.clone(),
            });
        }
    }
    assign(lineup, slot_id, choice, role)
}

/// Blank means "no role given"; anything else must be one of the slot's options.
fn validate_role(slot: &Slot, role: Option<&str>) -> Result<Option<String>, LineupError> {
    match role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) if slot.role_options.iter().any(|o| o == r) => Ok(Some(r.to_string())),
        Some(r) => Err(LineupError::InvalidRole {
            slot_id: slot.slot_id.clone(),
            role: r.to_string(),
        }),
        None => Ok(None),
    }
}

/// Rebuild the slots for a new formation. Surviving slot ids keep their bindings, slots past the
/// new counts are dropped, new slots start empty. The goalkeeper slot is untouched.
pub fn resize_formation(lineup: &mut Lineup, formation: Formation) {
    let mut old: Vec<Slot> = std::mem::take(&mut lineup.slots);
    lineup.slots = formation
        .slot_ids()
        .into_iter()
        .map(|(group, id)| match old.iter().position(|s| s.slot_id == id) {
            Some(i) => old.swap_remove(i),
            None => Slot::new(group, id),
        })
        .collect();
    for dropped in old.iter().filter(|s| s.is_assigned()) {
        log::debug!(
            "{} {}: dropped {} from {} after formation change to {}",
            lineup.event_id,
            lineup.quarter,
            dropped.assigned_player.as_deref().unwrap_or_default(),
            dropped.slot_id,
            formation
        );
    }
    lineup.formation = formation;
}

/// View of one slot for rendering. A stale holder stays selected and flagged.
pub fn render_slot(
    lineup: &Lineup,
    slot_id: &str,
    confirmed_players: &[String],
) -> Result<SlotView, LineupError> {
    let options = available_players(lineup, slot_id, confirmed_players)?;
    let slot = lineup
        .slot(slot_id)
        .ok_or_else(|| LineupError::InvalidSlot(slot_id.to_string()))?;
    let stale = slot
        .assigned_player
        .as_ref()
        .is_some_and(|p| !confirmed_players.contains(p));
    Ok(SlotView {
        slot_id: slot.slot_id.clone(),
        selected: Choice::from(slot.assigned_player.clone()),
        role: slot.assigned_role.clone(),
        role_options: slot.role_options.clone(),
        options,
        stale,
    })
}

/// Views for every slot in display order.
pub fn render_lineup(lineup: &Lineup, confirmed_players: &[String]) -> Vec<SlotView> {
    lineup
        .slots
        .iter()
        .filter_map(|s| render_slot(lineup, &s.slot_id, confirmed_players).ok())
        .collect()
}

/// Clear every slot whose holder is no longer confirmed. Returns the cleared slot ids.
pub fn release_stale(lineup: &mut Lineup, confirmed_players: &[String]) -> Vec<String> {
    let mut released = Vec::new();
    for slot in &mut lineup.slots {
        let is_stale = slot
            .assigned_player
            .as_ref()
            .is_some_and(|p| !confirmed_players.contains(p));
        if is_stale {
            slot.clear();
            released.push(slot.slot_id.clone());
        }
    }
    released
}
