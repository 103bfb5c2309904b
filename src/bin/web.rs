//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Configure with MEETUP_CONFIG (JSON file) and env vars
//! (HOST, PORT, STORE_URL, MEETUP_CATEGORY, ADMIN_PASSWORD, SESSION_KEY, SNAPSHOT_TTL_SECS,
//! DEFAULT_CAPACITY).

use actix_files::Files;
use actix_web::{cookie::Key, web::Data, App, HttpServer};
use soccer_meetup_web::web::{configure, session_middleware, AppCtx};
use soccer_meetup_web::{AppConfig, CachedStore, HttpStore, MemoryStore, SheetStore};
use std::sync::Arc;
use std::time::Duration;

/// Inactivity threshold: lineup drafts not touched for this long are dropped.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

fn build_store(config: &AppConfig) -> Arc<dyn SheetStore> {
    match &config.store_url {
        Some(url) => {
            log::info!("Using spreadsheet store at {}", url);
            Arc::new(CachedStore::new(HttpStore::new(url.clone()), config.snapshot_ttl()))
        }
        None => {
            log::warn!("STORE_URL not set; sign-ups are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    }
}

fn session_key(config: &AppConfig) -> Key {
    match config.session_key.as_deref() {
        Some(k) if k.len() >= 64 => Key::from(k.as_bytes()),
        Some(_) => {
            log::warn!("SESSION_KEY shorter than 64 bytes; using a random key");
            Key::generate()
        }
        None => Key::generate(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    if config.admin_password.is_none() {
        log::warn!("ADMIN_PASSWORD not set; admin mode is disabled");
    }
    if config.events.is_empty() {
        log::warn!("No events configured");
    }
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let key = session_key(&config);
    let store = build_store(&config);
    let state = Data::new(AppCtx::new(config, store));

    // Background task: every 30 minutes, drop lineup drafts inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let removed = state_cleanup.drafts.remove_idle(INACTIVITY_TIMEOUT);
            if removed > 0 {
                log::info!("Cleaned up {} inactive lineup draft(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(key.clone()))
            .app_data(state.clone())
            .configure(configure)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}
