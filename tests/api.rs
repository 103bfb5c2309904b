mod common;

use actix_web::{
    cookie::{Cookie, Key},
    http::StatusCode,
    test,
    web::Data,
    App,
};
use common::{FlakyStore, EVENT};
use serde_json::{json, Value};
use soccer_meetup_web::web::{configure, session_middleware, AppCtx};
use soccer_meetup_web::{AppConfig, EventConfig};
use std::sync::Arc;

fn config() -> AppConfig {
    AppConfig {
        admin_password: Some("secret".to_string()),
        events: vec![EventConfig {
            id: EVENT.to_string(),
            label: None,
            capacity: Some(2),
        }],
        ..AppConfig::default()
    }
}

macro_rules! app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .wrap(session_middleware(Key::generate()))
                .app_data(Data::new(AppCtx::new(config(), $store.clone())))
                .configure(configure),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({ "password": "secret" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie: Cookie<'static> = resp.response().cookies().next().unwrap().into_owned();
        cookie
    }};
}

fn lineup_uri(rest: &str) -> String {
    format!("/api/events/{EVENT}/lineups/Q1{rest}")
}

fn slot<'v>(view: &'v Value, slot_id: &str) -> &'v Value {
    view["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["slot_id"] == slot_id)
        .unwrap()
}

#[actix_web::test]
async fn lineup_routes_require_admin() {
    let store = Arc::new(FlakyStore::with_signups(&["A"]));
    let app = app!(store);

    let req = test::TestRequest::get().uri(&lineup_uri("")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri(&lineup_uri("/slots/gk"))
        .set_json(json!({ "player": "A" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(json!({ "password": "wrong" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn signup_beyond_capacity_is_waiting() {
    let store = Arc::new(FlakyStore::with_signups(&["A", "B"]));
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri(&format!("/api/events/{EVENT}/signups"))
        .set_json(json!({ "name": "C" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "waiting");
    assert_eq!(body["waiting_position"], 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/events/{EVENT}/signups"))
        .set_json(json!({ "name": "A" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn signup_and_cancel_fail_when_store_unreadable() {
    let store = Arc::new(FlakyStore::with_signups(&["A"]));
    let app = app!(store);
    store.fail_reads(true);

    let req = test::TestRequest::post()
        .uri(&format!("/api/events/{EVENT}/signups"))
        .set_json(json!({ "name": "A" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/events/{EVENT}/signups/A"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);

    store.fail_reads(false);
    assert_eq!(store.stored_names(), vec!["A"]);
}

#[actix_web::test]
async fn stale_holder_is_shown_once_then_released() {
    let store = Arc::new(FlakyStore::with_signups(&["A", "B", "C"]));
    let app = app!(store);
    let cookie = login!(app);

    let req = test::TestRequest::put()
        .uri(&lineup_uri("/slots/gk"))
        .cookie(cookie.clone())
        .set_json(json!({ "player": "A" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/events/{EVENT}/signups/A"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&lineup_uri("")).cookie(cookie.clone()).to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slot(&first, "gk")["selected"], "A");
    assert_eq!(slot(&first, "gk")["stale"], true);
    assert_eq!(first["released"], json!(["gk"]));

    let req = test::TestRequest::get().uri(&lineup_uri("")).cookie(cookie).to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slot(&second, "gk")["selected"], "미배정");
    assert_eq!(second["released"], json!([]));
}

#[actix_web::test]
async fn choice_not_offered_is_rejected() {
    let store = Arc::new(FlakyStore::with_signups(&["A", "B", "C"]));
    let app = app!(store);
    let cookie = login!(app);

    for (slot_id, player) in [("gk", "A"), ("df_1", "A"), ("df_2", "C"), ("df_3", "Nobody")] {
        let req = test::TestRequest::put()
            .uri(&lineup_uri(&format!("/slots/{slot_id}")))
            .cookie(cookie.clone())
            .set_json(json!({ "player": player }))
            .to_request();
        let expected = if slot_id == "gk" { StatusCode::OK } else { StatusCode::BAD_REQUEST };
        assert_eq!(test::call_service(&app, req).await.status(), expected, "{slot_id} <- {player}");
    }
}

#[actix_web::test]
async fn role_can_be_picked_before_player() {
    let store = Arc::new(FlakyStore::with_signups(&["A", "B"]));
    let app = app!(store);
    let cookie = login!(app);

    let req = test::TestRequest::put()
        .uri(&lineup_uri("/slots/df_1"))
        .cookie(cookie.clone())
        .set_json(json!({ "role": "LB" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slot(&view, "df_1")["selected"], "미배정");
    assert_eq!(slot(&view, "df_1")["role"], "LB");

    let req = test::TestRequest::put()
        .uri(&lineup_uri("/slots/df_1"))
        .cookie(cookie)
        .set_json(json!({ "player": "B" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slot(&view, "df_1")["selected"], "B");
    assert_eq!(slot(&view, "df_1")["role"], "LB");
}

#[actix_web::test]
async fn failed_save_keeps_draft() {
    let store = Arc::new(FlakyStore::with_signups(&["A", "B"]));
    let app = app!(store);
    let cookie = login!(app);

    let req = test::TestRequest::put()
        .uri(&lineup_uri("/slots/gk"))
        .cookie(cookie.clone())
        .set_json(json!({ "player": "A" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    store.fail_writes(true);
    let req = test::TestRequest::post().uri(&lineup_uri("/save")).cookie(cookie.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);

    let req = test::TestRequest::get().uri(&lineup_uri("")).cookie(cookie.clone()).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slot(&view, "gk")["selected"], "A");

    store.fail_writes(false);
    let req = test::TestRequest::post().uri(&lineup_uri("/save")).cookie(cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["saved"], true);
}

#[actix_web::test]
async fn lineup_view_during_outage_keeps_bindings() {
    let store = Arc::new(FlakyStore::with_signups(&["A", "B"]));
    let app = app!(store);
    let cookie = login!(app);

    let req = test::TestRequest::put()
        .uri(&lineup_uri("/slots/gk"))
        .cookie(cookie.clone())
        .set_json(json!({ "player": "A" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    store.fail_reads(true);
    let req = test::TestRequest::get().uri(&lineup_uri("")).cookie(cookie.clone()).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["store_available"], false);
    assert_eq!(view["released"], json!([]));

    let req = test::TestRequest::put()
        .uri(&lineup_uri("/slots/df_1"))
        .cookie(cookie.clone())
        .set_json(json!({ "player": "B" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);

    store.fail_reads(false);
    let req = test::TestRequest::get().uri(&lineup_uri("")).cookie(cookie).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slot(&view, "gk")["selected"], "A");
}

#[actix_web::test]
async fn csv_export_marks_waiting_past_capacity() {
    let store = Arc::new(FlakyStore::with_signups(&["A", "B", "C"]));
    let app = app!(store);

    let req = test::TestRequest::get()
        .uri(&format!("/api/events/{EVENT}/roster.csv"))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = std::str::from_utf8(&body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "order,name,signed_up_at,status");
    assert!(lines[1].starts_with("1,A,") && lines[1].ends_with(",confirmed"));
    assert!(lines[2].starts_with("2,B,") && lines[2].ends_with(",confirmed"));
    assert!(lines[3].starts_with("3,C,") && lines[3].ends_with(",waiting"));
    assert_eq!(lines.len(), 4);
}
