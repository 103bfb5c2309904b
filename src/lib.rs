//! Soccer meetup sign-up sheet: library with models, waitlist/lineup logic and the sheet store.

pub mod config;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;
pub mod web;

pub use config::{AppConfig, ConfigError, EventConfig};
pub use logic::{
    assign, assign_exclusive, available_players, partition, release_stale, render_lineup,
    render_slot, resize_formation, AttendanceStatus, Partition, SlotView,
};
pub use models::{
    Choice, EventId, EventRoster, Formation, Lineup, LineupError, PositionGroup, Quarter,
    RosterError, Signup, Slot, UNASSIGNED_LABEL,
};
pub use service::{
    cancel, sign_up, EditError, LineupDrafts, LineupEditor, LineupView, SheetError,
};
pub use store::{
    load_lineup, load_roster, save_lineup, try_load_lineup, try_load_roster, CachedStore,
    CategoryData, HttpStore, MemoryStore, SheetStore, StoreError,
};
