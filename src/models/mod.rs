//! Data structures for the meetup: sign-up sheets, lineups, formations.

mod lineup;
mod signup;

pub use lineup::{
    Choice, Formation, Lineup, LineupError, PositionGroup, Quarter, Slot, MAX_LINE_COUNT,
    MAX_OUTFIELD, UNASSIGNED_LABEL,
};
pub use signup::{EventId, EventRoster, RosterError, Signup};
