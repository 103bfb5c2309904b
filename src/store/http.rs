//! HTTP+JSON client for the spreadsheet web endpoint.

use crate::models::Signup;
use crate::store::{CategoryData, LineupRecord, SheetStore, StoreError};
use serde::Serialize;
use std::time::Duration;

/// Request timeout for every store call.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Store reached over one endpoint URL: `GET ?category=..` reads, `POST {action, ..}` writes.
pub struct HttpStore {
    url: String,
    agent: ureq::Agent,
}

#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum WriteRequest<'a> {
    Add {
        category: &'a str,
        event_id: &'a str,
        player_name: &'a str,
        timestamp: &'a str,
    },
    Delete {
        category: &'a str,
        event_id: &'a str,
        player_name: &'a str,
    },
    SaveLineup {
        category: &'a str,
        #[serde(flatten)]
        record: &'a LineupRecord,
    },
}

impl HttpStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, STORE_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn post(&self, body: &WriteRequest<'_>) -> Result<(), StoreError> {
        self.agent
            .post(&self.url)
            .send_json(body)
            .map_err(unavailable)?;
        Ok(())
    }
}

fn unavailable(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(code, _) => StoreError::Unavailable(format!("store answered HTTP {}", code)),
        ureq::Error::Transport(t) => StoreError::Unavailable(t.to_string()),
    }
}

impl SheetStore for HttpStore {
    fn fetch(&self, category: &str) -> Result<CategoryData, StoreError> {
        let response = self
            .agent
            .get(&self.url)
            .query("category", category)
            .call()
            .map_err(unavailable)?;
        response
            .into_json::<CategoryData>()
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))
    }

    fn add_signup(&self, category: &str, signup: &Signup) -> Result<(), StoreError> {
        log::info!("Store: add {} to {}", signup.player_name, signup.event_id);
        self.post(&WriteRequest::Add {
            category,
            event_id: &signup.event_id,
            player_name: &signup.player_name,
            timestamp: &signup.timestamp,
        })
    }

    fn delete_signup(&self, category: &str, event_id: &str, player_name: &str) -> Result<(), StoreError> {
        log::info!("Store: delete {} from {}", player_name, event_id);
        self.post(&WriteRequest::Delete {
            category,
            event_id,
            player_name,
        })
    }

    fn save_lineup(&self, category: &str, record: &LineupRecord) -> Result<(), StoreError> {
        log::info!("Store: save lineup {} {}", record.event_id, record.quarter_id);
        self.post(&WriteRequest::SaveLineup { category, record })
    }
}
