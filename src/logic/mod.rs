//! Meetup business logic: waitlist split and lineup editing.

mod lineup;
mod partition;

pub use lineup::{
    assign, assign_exclusive, available_players, release_stale, render_lineup, render_slot,
    resize_formation, SlotView,
};
pub use partition::{partition, AttendanceStatus, Partition};
