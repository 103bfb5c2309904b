//! Store doubles shared by the integration tests.

#![allow(dead_code)]

use soccer_meetup_web::store::LineupRecord;
use soccer_meetup_web::{CategoryData, MemoryStore, SheetStore, Signup, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};

pub const CATEGORY: &str = "weekly";
pub const EVENT: &str = "2026-03-07";

/// Memory store whose reads and writes can be switched off to simulate an outage.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn with_signups(names: &[&str]) -> Self {
        let store = Self::default();
        for (i, name) in names.iter().enumerate() {
            store
                .inner
                .add_signup(CATEGORY, &Signup::new(EVENT, *name, format!("10:00:{i:02}")))
                .unwrap();
        }
        store
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    /// Player names stored for the event, bypassing the outage switch.
    pub fn stored_names(&self) -> Vec<String> {
        self.inner
            .fetch(CATEGORY)
            .unwrap()
            .roster(EVENT)
            .signups
            .into_iter()
            .map(|s| s.player_name)
            .collect()
    }
}

impl SheetStore for FlakyStore {
    fn fetch(&self, category: &str) -> Result<CategoryData, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.fetch(category)
    }
    fn add_signup(&self, category: &str, signup: &Signup) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.add_signup(category, signup)
    }
    fn delete_signup(&self, category: &str, event_id: &str, player_name: &str) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.delete_signup(category, event_id, player_name)
    }
    fn save_lineup(&self, category: &str, record: &LineupRecord) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.save_lineup(category, record)
    }
}
