//! "player|role" position encoding used by the lineup sheet.

use crate::logic::assign_exclusive;
use crate::models::{Choice, Formation, Lineup, LineupError, Quarter, UNASSIGNED_LABEL};
use crate::store::{LineupRecord, LineupRow, StoreError};
use std::collections::BTreeMap;

/// slot id -> "player|role" for every slot; empty slots encode as "미배정|".
pub fn encode_positions(lineup: &Lineup) -> BTreeMap<String, String> {
    lineup
        .slots
        .iter()
        .map(|s| {
            let player = s.assigned_player.as_deref().unwrap_or(UNASSIGNED_LABEL);
            let role = s.assigned_role.as_deref().unwrap_or_default();
            (s.slot_id.clone(), format!("{}|{}", player, role))
        })
        .collect()
}

/// Apply decoded positions to `lineup`.
///
/// Unknown slots are ignored. An invalid role falls back to the slot's default role; a player
/// already placed in an earlier slot is skipped so the lineup never holds duplicates.
pub fn decode_positions(lineup: &mut Lineup, positions: &BTreeMap<String, String>) {
    for slot_id in lineup.slots.iter().map(|s| s.slot_id.clone()).collect::<Vec<_>>() {
        let Some(value) = positions.get(&slot_id) else {
            continue;
        };
        let (player, role) = match value.rsplit_once('|') {
            Some((p, r)) => (p, Some(r)),
            None => (value.as_str(), None),
        };
        let choice = Choice::from(player);
        let result = match assign_exclusive(lineup, &slot_id, choice.clone(), role) {
            Err(LineupError::InvalidRole { .. }) => assign_exclusive(lineup, &slot_id, choice, None),
            other => other,
        };
        if let Err(e) = result {
            log::warn!("Ignoring saved position {} for {} {}: {}", slot_id, lineup.event_id, lineup.quarter, e);
        }
    }
}

/// Rebuild a lineup from its sheet row.
pub fn lineup_from_row(row: &LineupRow) -> Result<Lineup, StoreError> {
    let LineupRow(event_id, quarter_id, positions_json, formation) = row;
    let malformed = |e: LineupError| StoreError::MalformedPayload(e.to_string());
    let quarter: Quarter = quarter_id.parse().map_err(malformed)?;
    let formation: Formation = if formation.trim().is_empty() {
        Formation::default()
    } else {
        formation.parse().map_err(malformed)?
    };
    let positions: BTreeMap<String, String> = if positions_json.trim().is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str(positions_json)
            .map_err(|e| StoreError::MalformedPayload(format!("positions for {} {}: {}", event_id, quarter_id, e)))?
    };
    let mut lineup = Lineup::new(event_id.clone(), quarter, formation);
    decode_positions(&mut lineup, &positions);
    Ok(lineup)
}

/// Save request body for a lineup.
pub fn lineup_record(lineup: &Lineup) -> LineupRecord {
    LineupRecord {
        event_id: lineup.event_id.clone(),
        quarter_id: lineup.quarter.to_string(),
        positions: encode_positions(lineup),
        formation: lineup.formation.to_string(),
    }
}
