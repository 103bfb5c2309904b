//! Lineup, Slot, Formation and Quarter for the per-quarter team sheet.

use crate::models::signup::EventId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label of the "nobody" choice in a slot selector.
pub const UNASSIGNED_LABEL: &str = "미배정";

/// Largest count allowed for one outfield line.
pub const MAX_LINE_COUNT: u8 = 6;

/// Outfield players on the pitch (11-a-side minus the goalkeeper).
pub const MAX_OUTFIELD: u8 = 10;

/// Errors for lineup edits and lineup wire values.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LineupError {
    /// Slot id is not declared by the current formation.
    #[error("Unknown slot {0}")]
    InvalidSlot(String),
    /// Formation string did not parse or a count is out of range.
    #[error("Invalid formation: {0}")]
    MalformedFormation(String),
    /// Role is not one of the slot's role options.
    #[error("Role {role} is not valid for slot {slot_id}")]
    InvalidRole { slot_id: String, role: String },
    /// Player already holds another slot in this lineup.
    #[error("{player} is already assigned to {slot_id}")]
    PlayerAlreadyAssigned { player: String, slot_id: String },
    /// Quarter outside 1..=4.
    #[error("Invalid quarter: {0}")]
    InvalidQuarter(String),
}

/// One of the four sub-periods of a match. Each quarter has its own lineup.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter(u8);

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter(1), Quarter(2), Quarter(3), Quarter(4)];

    pub fn new(n: u8) -> Result<Self, LineupError> {
        if (1..=4).contains(&n) {
            Ok(Self(n))
        } else {
            Err(LineupError::InvalidQuarter(n.to_string()))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// Accepts "Q1".."Q4" (any case) and bare "1".."4".
impl FromStr for Quarter {
    type Err = LineupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let digits = t
            .strip_prefix('Q')
            .or_else(|| t.strip_prefix('q'))
            .unwrap_or(t);
        digits
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::new(n).ok())
            .ok_or_else(|| LineupError::InvalidQuarter(s.to_string()))
    }
}

impl TryFrom<String> for Quarter {
    type Error = LineupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}

/// Position groups; each maps to a slot id prefix and a set of role labels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionGroup {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl PositionGroup {
    pub fn prefix(self) -> &'static str {
        match self {
            PositionGroup::Goalkeeper => "gk",
            PositionGroup::Defender => "df",
            PositionGroup::Midfielder => "mf",
            PositionGroup::Forward => "fw",
        }
    }

    /// Role labels offered for slots of this group, first one is the default.
    pub fn role_options(self) -> &'static [&'static str] {
        match self {
            PositionGroup::Goalkeeper => &["GK"],
            PositionGroup::Defender => &["CB", "LB", "RB", "LWB", "RWB"],
            PositionGroup::Midfielder => &["CM", "CDM", "CAM", "LM", "RM"],
            PositionGroup::Forward => &["ST", "CF", "LW", "RW"],
        }
    }

    /// Slot id of the `n`th slot (1-based) in this group. The goalkeeper slot is just "gk".
    pub fn slot_id(self, n: u8) -> String {
        match self {
            PositionGroup::Goalkeeper => self.prefix().to_string(),
            _ => format!("{}_{}", self.prefix(), n),
        }
    }
}

/// Outfield counts per line. Goalkeeper is always exactly one slot and is not part of it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formation {
    pub defenders: u8,
    pub midfielders: u8,
    pub forwards: u8,
}

impl Default for Formation {
    fn default() -> Self {
        Self {
            defenders: 4,
            midfielders: 4,
            forwards: 2,
        }
    }
}

impl Formation {
    /// Each line needs 1..=6 players and the outfield total may not exceed 10.
    pub fn new(defenders: u8, midfielders: u8, forwards: u8) -> Result<Self, LineupError> {
        let f = Self {
            defenders,
            midfielders,
            forwards,
        };
        let in_range = |n: u8| (1..=MAX_LINE_COUNT).contains(&n);
        let total = u16::from(defenders) + u16::from(midfielders) + u16::from(forwards);
        if !in_range(defenders) || !in_range(midfielders) || !in_range(forwards) || total > u16::from(MAX_OUTFIELD) {
            return Err(LineupError::MalformedFormation(f.to_string()));
        }
        Ok(f)
    }

    pub fn count(&self, group: PositionGroup) -> u8 {
        match group {
            PositionGroup::Goalkeeper => 1,
            PositionGroup::Defender => self.defenders,
            PositionGroup::Midfielder => self.midfielders,
            PositionGroup::Forward => self.forwards,
        }
    }

    /// Slot ids in display order: gk, df_1.., mf_1.., fw_1..
    pub fn slot_ids(&self) -> Vec<(PositionGroup, String)> {
        use PositionGroup::*;
        [Goalkeeper, Defender, Midfielder, Forward]
            .into_iter()
            .flat_map(|g| (1..=self.count(g)).map(move |n| (g, g.slot_id(n))))
            .collect()
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.defenders, self.midfielders, self.forwards)
    }
}

/// Parses "D-M-F", e.g. "4-4-2".
impl FromStr for Formation {
    type Err = LineupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || LineupError::MalformedFormation(s.to_string());
        let parts: Vec<u8> = s
            .trim()
            .split('-')
            .map(|p| p.trim().parse::<u8>().map_err(|_| bad()))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [d, m, f] => Self::new(*d, *m, *f).map_err(|_| bad()),
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Formation {
    type Error = LineupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Formation> for String {
    fn from(f: Formation) -> Self {
        f.to_string()
    }
}

/// What a slot selector can hold: nobody, or a named player.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    Unassigned,
    Player(String),
}

impl Choice {
    /// Display label; the unassigned choice shows as "미배정".
    pub fn label(&self) -> &str {
        match self {
            Choice::Unassigned => UNASSIGNED_LABEL,
            Choice::Player(name) => name,
        }
    }

    pub fn player(&self) -> Option<&str> {
        match self {
            Choice::Unassigned => None,
            Choice::Player(name) => Some(name),
        }
    }
}

/// Blank text and the unassigned label both mean "nobody".
impl From<String> for Choice {
    fn from(value: String) -> Self {
        let t = value.trim();
        if t.is_empty() || t == UNASSIGNED_LABEL {
            Choice::Unassigned
        } else {
            Choice::Player(t.to_string())
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Choice::from(value.to_string())
    }
}

impl From<Choice> for String {
    fn from(c: Choice) -> Self {
        c.label().to_string()
    }
}

impl From<Option<String>> for Choice {
    fn from(value: Option<String>) -> Self {
        value.map(Choice::from).unwrap_or(Choice::Unassigned)
    }
}

/// One named position awaiting a (player, role) binding.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub slot_id: String,
    pub group: PositionGroup,
    pub role_options: Vec<String>,
    pub assigned_player: Option<String>,
    pub assigned_role: Option<String>,
}

impl Slot {
    /// Empty slot for a group.
    pub fn new(group: PositionGroup, slot_id: impl Into<String>) -> Self {
        Self {
            slot_id: slot_id.into(),
            group,
            role_options: group.role_options().iter().map(|r| r.to_string()).collect(),
            assigned_player: None,
            assigned_role: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_player.is_some()
    }

    pub fn clear(&mut self) {
        self.assigned_player = None;
        self.assigned_role = None;
    }
}

/// The team sheet for one quarter of one event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub event_id: EventId,
    pub quarter: Quarter,
    pub formation: Formation,
    /// Slots in display order (gk, df_*, mf_*, fw_*); ids are unique.
    pub slots: Vec<Slot>,
}

impl Lineup {
    /// All-unassigned lineup for the given formation.
    pub fn new(event_id: impl Into<String>, quarter: Quarter, formation: Formation) -> Self {
        let slots = formation
            .slot_ids()
            .into_iter()
            .map(|(group, id)| Slot::new(group, id))
            .collect();
        Self {
            event_id: event_id.into(),
            quarter,
            formation,
            slots,
        }
    }

    /// All-unassigned lineup with the default formation.
    pub fn empty(event_id: impl Into<String>, quarter: Quarter) -> Self {
        Self::new(event_id, quarter, Formation::default())
    }

    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.slot_id == slot_id)
    }

    pub fn slot_mut(&mut self, slot_id: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.slot_id == slot_id)
    }

    /// Slot currently holding `player`, if any.
    pub fn slot_of(&self, player: &str) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|s| s.assigned_player.as_deref() == Some(player))
    }

    /// Assigned player names in slot order.
    pub fn assigned_players(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|s| s.assigned_player.as_deref())
    }
}
