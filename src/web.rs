//! REST API: HTML index, sign-up sheet routes, admin session and lineup editor routes.
//!
//! Store calls block, so every handler that touches the store runs its work in `web::block`.

use crate::config::{AppConfig, EventConfig};
use crate::logic::{partition, AttendanceStatus};
use crate::models::{EventRoster, Formation, Quarter, Signup};
use crate::service::{cancel, sign_up, EditError, LineupDrafts, LineupEditor, SheetError};
use crate::store::{load_roster, SheetStore, StoreError};
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get,
    http::StatusCode,
    post, put,
    web::{self, Data, Json, Path, ServiceConfig},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state.
pub struct AppCtx {
    pub config: AppConfig,
    pub store: Arc<dyn SheetStore>,
    /// Unsaved lineup edits by (event, quarter). Saving writes through to the store.
    pub drafts: LineupDrafts,
}

impl AppCtx {
    pub fn new(config: AppConfig, store: Arc<dyn SheetStore>) -> Self {
        Self {
            config,
            store,
            drafts: LineupDrafts::new(),
        }
    }

    fn editor(&self) -> LineupEditor<'_> {
        LineupEditor::new(self.store.as_ref(), &self.config.category, &self.drafts)
    }
}

type AppState = Data<AppCtx>;

const ADMIN_KEY: &str = "admin";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct EventSummary<'a> {
    id: &'a str,
    label: &'a str,
    capacity: usize,
}

#[derive(Serialize)]
struct RosterResponse<'a> {
    event_id: &'a str,
    label: &'a str,
    capacity: usize,
    full: bool,
    confirmed: &'a [Signup],
    waiting: &'a [Signup],
}

#[derive(Serialize)]
struct SignupResponse<'a> {
    #[serde(flatten)]
    roster: RosterResponse<'a>,
    name: &'a str,
    status: Option<AttendanceStatus>,
    waiting_position: Option<usize>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    order: usize,
    name: &'a str,
    signed_up_at: &'a str,
    status: AttendanceStatus,
}

#[derive(Deserialize)]
struct AddSignupBody {
    name: String,
}

#[derive(Deserialize)]
struct LoginBody {
    password: String,
}

#[derive(Deserialize)]
struct AssignBody {
    /// Player name, or empty / "미배정" to clear the slot. Omitted keeps the current player.
    #[serde(default)]
    player: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Deserialize)]
struct FormationBody {
    formation: String,
}

/// Path segment: event id (e.g. /api/events/{event})
#[derive(Deserialize)]
struct EventPath {
    event: String,
}

/// Path segments: event id and player name (e.g. /api/events/{event}/signups/{name})
#[derive(Deserialize)]
struct SignupPath {
    event: String,
    name: String,
}

/// Path segments: event id and quarter (e.g. /api/events/{event}/lineups/{quarter})
#[derive(Deserialize)]
struct LineupPath {
    event: String,
    quarter: String,
}

/// Path segments: event id, quarter and slot id.
#[derive(Deserialize)]
struct SlotPath {
    event: String,
    quarter: String,
    slot_id: String,
}

fn error_json(status: StatusCode, message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "error": message.to_string() }))
}

fn bad_request(message: impl std::fmt::Display) -> HttpResponse {
    error_json(StatusCode::BAD_REQUEST, message)
}

fn no_event() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No event" }))
}

fn store_error(e: StoreError) -> HttpResponse {
    error_json(StatusCode::SERVICE_UNAVAILABLE, e)
}

fn sheet_error(e: SheetError) -> HttpResponse {
    match e {
        SheetError::Roster(e) => bad_request(e),
        SheetError::Store(e) => store_error(e),
    }
}

fn edit_error(e: EditError) -> HttpResponse {
    match e {
        EditError::Store(e) => store_error(e),
        other => bad_request(other),
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn is_admin(session: &Session) -> bool {
    matches!(session.get::<bool>(ADMIN_KEY), Ok(Some(true)))
}

fn require_admin(session: &Session) -> Result<(), HttpResponse> {
    if is_admin(session) {
        Ok(())
    } else {
        Err(error_json(StatusCode::UNAUTHORIZED, "Admin login required"))
    }
}

fn find_event(state: &AppState, id: &str) -> Result<EventConfig, HttpResponse> {
    state.config.event(id).cloned().ok_or_else(no_event)
}

/// Admin check, event lookup and quarter parse shared by the lineup routes.
fn lineup_target(
    state: &AppState,
    session: &Session,
    event: &str,
    quarter: &str,
) -> Result<(EventConfig, Quarter), HttpResponse> {
    require_admin(session)?;
    let event = find_event(state, event)?;
    let quarter: Quarter = quarter.parse().map_err(|e| bad_request(e))?;
    Ok((event, quarter))
}

/// Run blocking store work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, HttpResponse>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| error_json(StatusCode::INTERNAL_SERVER_ERROR, e))
}

fn roster_response<'a>(state: &AppState, event: &'a EventConfig, roster: &'a EventRoster) -> RosterResponse<'a> {
    let capacity = state.config.capacity_of(event);
    let p = partition(&roster.signups, capacity);
    RosterResponse {
        event_id: &event.id,
        label: event.display_label(),
        capacity,
        full: p.is_full(),
        confirmed: p.confirmed,
        waiting: p.waiting,
    }
}

/// Session cookie middleware; the cookie is not Secure-only so plain HTTP deployments work.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .build()
}

/// Register every route. State (`Data<AppCtx>`) and the session middleware are added by the caller.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.route("/", web::get().to(serve_index_async))
        .service(api_health)
        .service(favicon)
        .service(api_list_events)
        .service(api_export_roster)
        .service(api_get_roster)
        .service(api_add_signup)
        .service(api_remove_signup)
        .service(api_admin_login)
        .service(api_admin_logout)
        .service(api_admin_status)
        .service(api_get_lineup)
        .service(api_assign_slot)
        .service(api_set_formation)
        .service(api_save_lineup);
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "soccer-meetup-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Configured events with their capacities.
#[get("/api/events")]
async fn api_list_events(state: AppState) -> HttpResponse {
    let events: Vec<EventSummary> = state
        .config
        .events
        .iter()
        .map(|e| EventSummary {
            id: &e.id,
            label: e.display_label(),
            capacity: state.config.capacity_of(e),
        })
        .collect();
    HttpResponse::Ok().json(events)
}

/// Confirmed and waiting lists for an event. An unreachable store shows an empty sheet.
#[get("/api/events/{event}/roster")]
async fn api_get_roster(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let event = match find_event(&state, &path.event) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let st = state.clone();
    let event_id = event.id.clone();
    match blocking(move || load_roster(st.store.as_ref(), &st.config.category, &event_id)).await {
        Ok(roster) => HttpResponse::Ok().json(roster_response(&state, &event, &roster)),
        Err(resp) => resp,
    }
}

/// Sign-up sheet as CSV (order, name, time, status).
#[get("/api/events/{event}/roster.csv")]
async fn api_export_roster(state: AppState, path: Path<EventPath>) -> HttpResponse {
    let event = match find_event(&state, &path.event) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let st = state.clone();
    let event_id = event.id.clone();
    let roster = match blocking(move || load_roster(st.store.as_ref(), &st.config.category, &event_id)).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let p = partition(&roster.signups, state.config.capacity_of(&event));
    let rows = p
        .confirmed
        .iter()
        .map(|s| (s, AttendanceStatus::Confirmed))
        .chain(p.waiting.iter().map(|s| (s, AttendanceStatus::Waiting)));
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (i, (s, status)) in rows.enumerate() {
        let row = CsvRow {
            order: i + 1,
            name: &s.player_name,
            signed_up_at: &s.timestamp,
            status,
        };
        if let Err(e) = writer.serialize(row) {
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    }
    match writer.into_inner() {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(bytes),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Sign up. Past capacity the name lands on the waitlist.
#[post("/api/events/{event}/signups")]
async fn api_add_signup(state: AppState, path: Path<EventPath>, body: Json<AddSignupBody>) -> HttpResponse {
    let event = match find_event(&state, &path.event) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let st = state.clone();
    let event_id = event.id.clone();
    let name = body.into_inner().name;
    let result = blocking(move || {
        sign_up(st.store.as_ref(), &st.config.category, &event_id, &name, &now_timestamp())
    })
    .await;
    let (roster, signup) = match result {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => return sheet_error(e),
        Err(resp) => return resp,
    };
    let p = partition(&roster.signups, state.config.capacity_of(&event));
    HttpResponse::Ok().json(SignupResponse {
        roster: roster_response(&state, &event, &roster),
        name: &signup.player_name,
        status: p.status_of(&signup.player_name),
        waiting_position: p.waiting_position(&signup.player_name),
    })
}

/// Cancel a sign-up. The next waiting name moves up automatically.
#[delete("/api/events/{event}/signups/{name}")]
async fn api_remove_signup(state: AppState, path: Path<SignupPath>) -> HttpResponse {
    let event = match find_event(&state, &path.event) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let st = state.clone();
    let event_id = event.id.clone();
    let name = path.into_inner().name;
    match blocking(move || cancel(st.store.as_ref(), &st.config.category, &event_id, &name)).await {
        Ok(Ok((roster, _))) => HttpResponse::Ok().json(roster_response(&state, &event, &roster)),
        Ok(Err(e)) => sheet_error(e),
        Err(resp) => resp,
    }
}

/// Enter admin mode with the static password.
#[post("/api/admin/login")]
async fn api_admin_login(state: AppState, session: Session, body: Json<LoginBody>) -> HttpResponse {
    if !state.config.check_admin_password(&body.password) {
        log::warn!("Rejected admin login");
        return error_json(StatusCode::UNAUTHORIZED, "Wrong password");
    }
    match session.insert(ADMIN_KEY, true) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "admin": true })),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

#[post("/api/admin/logout")]
async fn api_admin_logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(serde_json::json!({ "admin": false }))
}

#[get("/api/admin/status")]
async fn api_admin_status(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "admin": is_admin(&session) }))
}

/// Lineup editor view. Slots whose player dropped out of the confirmed list are shown once and
/// then released.
#[get("/api/events/{event}/lineups/{quarter}")]
async fn api_get_lineup(state: AppState, session: Session, path: Path<LineupPath>) -> HttpResponse {
    let (event, quarter) = match lineup_target(&state, &session, &path.event, &path.quarter) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let st = state.clone();
    let capacity = state.config.capacity_of(&event);
    match blocking(move || st.editor().view(&event.id, capacity, quarter)).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(resp) => resp,
    }
}

/// Put a player (or nobody) and/or a role into a slot. Only players offered for the slot are
/// accepted.
#[put("/api/events/{event}/lineups/{quarter}/slots/{slot_id}")]
async fn api_assign_slot(
    state: AppState,
    session: Session,
    path: Path<SlotPath>,
    body: Json<AssignBody>,
) -> HttpResponse {
    let (event, quarter) = match lineup_target(&state, &session, &path.event, &path.quarter) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let st = state.clone();
    let capacity = state.config.capacity_of(&event);
    let slot_id = path.into_inner().slot_id;
    let AssignBody { player, role } = body.into_inner();
    let result = blocking(move || {
        st.editor().assign(
            &event.id,
            capacity,
            quarter,
            &slot_id,
            player.as_deref(),
            role.as_deref(),
        )
    })
    .await;
    match result {
        Ok(Ok(view)) => HttpResponse::Ok().json(view),
        Ok(Err(e)) => edit_error(e),
        Err(resp) => resp,
    }
}

/// Change the formation; slots past the new counts lose their players.
#[put("/api/events/{event}/lineups/{quarter}/formation")]
async fn api_set_formation(
    state: AppState,
    session: Session,
    path: Path<LineupPath>,
    body: Json<FormationBody>,
) -> HttpResponse {
    let (event, quarter) = match lineup_target(&state, &session, &path.event, &path.quarter) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let formation: Formation = match body.formation.parse() {
        Ok(f) => f,
        Err(e) => return bad_request(e),
    };
    let st = state.clone();
    let capacity = state.config.capacity_of(&event);
    match blocking(move || st.editor().set_formation(&event.id, capacity, quarter, formation)).await {
        Ok(Ok(view)) => HttpResponse::Ok().json(view),
        Ok(Err(e)) => edit_error(e),
        Err(resp) => resp,
    }
}

/// Write the draft to the store. On failure the draft stays in memory unsaved.
#[post("/api/events/{event}/lineups/{quarter}/save")]
async fn api_save_lineup(state: AppState, session: Session, path: Path<LineupPath>) -> HttpResponse {
    let (event, quarter) = match lineup_target(&state, &session, &path.event, &path.quarter) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let st = state.clone();
    match blocking(move || st.editor().save(&event.id, quarter)).await {
        Ok(Ok(_)) => HttpResponse::Ok().json(serde_json::json!({ "saved": true })),
        Ok(Err(e)) => {
            log::warn!("Saving lineup {} {} failed: {}", path.event, quarter, e);
            edit_error(e)
        }
        Err(resp) => resp,
    }
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
