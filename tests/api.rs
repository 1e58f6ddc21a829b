//! End-to-end tests driving the router against an in-memory store.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use basketball_team_api::{
    app,
    config::Config,
    db::DocumentStore,
    models::{is_valid_object_id, Collection},
    routes::diagnostics::DiagnosticReport,
    AppState,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

const UNUSED_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

fn configured() -> Config {
    Config {
        database_url: Some("sqlite::memory:".into()),
        database_name: Some("team_test".into()),
        ..Config::default()
    }
}

async fn test_store() -> DocumentStore {
    DocumentStore::in_memory("team_test").await.unwrap()
}

async fn test_app() -> (Router, DocumentStore) {
    let store = test_store().await;
    (app(AppState::new(Some(store.clone()), configured())), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn post_raw(app: &Router, uri: &str, content_type: Option<&str>, body: &str) -> StatusCode {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

fn created_id(body: &Value) -> String {
    let id = body["id"].as_str().expect("create returns an id").to_string();
    assert!(is_valid_object_id(&id), "not a store id: {id}");
    id
}

#[tokio::test]
async fn root_acknowledges() {
    let (app, _) = test_app().await;
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Basketball Team API running"}));
}

#[tokio::test]
async fn created_player_is_listed_with_public_id() {
    let (app, _) = test_app().await;

    let (status, body) = post(&app, "/api/players", json!({"name": "A. Smith", "number": 23, "position": "F"})).await;
    assert_eq!(status, StatusCode::OK);
    let id = created_id(&body);

    let (status, players) = get(&app, "/api/players").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(players, json!([{"id": id, "name": "A. Smith", "number": 23, "position": "F"}]));
}

#[tokio::test]
async fn player_without_position_lists_null() {
    let (app, _) = test_app().await;
    let (_, body) = post(&app, "/api/players", json!({"name": "B. Jones", "number": 0})).await;
    let id = created_id(&body);

    let (_, players) = get(&app, "/api/players").await;
    assert_eq!(players, json!([{"id": id, "name": "B. Jones", "number": 0, "position": null}]));
}

#[tokio::test]
async fn out_of_range_numbers_are_rejected_and_not_stored() {
    let (app, _) = test_app().await;

    for number in [-1, 100] {
        let (status, body) = post(&app, "/api/players", json!({"name": "C. Brown", "number": number})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "number");
    }

    let (_, players) = get(&app, "/api/players").await;
    assert_eq!(players, json!([]));
}

#[tokio::test]
async fn malformed_player_bodies_are_client_errors() {
    let (app, _) = test_app().await;

    let (status, _) = post(&app, "/api/players", json!({"number": 4})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post(&app, "/api/players", json!({"name": "D", "number": "four"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = post(&app, "/api/players", json!({"name": "", "number": 4})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "name");
}

#[tokio::test]
async fn unreadable_bodies_keep_their_rejection_status() {
    let (app, _) = test_app().await;
    let body = r#"{"name": "A. Smith", "number": 23}"#;

    let status = post_raw(&app, "/api/players", None, body).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let status = post_raw(&app, "/api/players", Some("application/json"), r#"{"name": "#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let status = post_raw(&app, "/api/players", Some("application/json"), body).await;
    assert_eq!(status, StatusCode::OK);

    let (_, players) = get(&app, "/api/players").await;
    assert_eq!(players.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn matches_round_trip_with_defaults() {
    let (app, _) = test_app().await;

    let (status, body) = post(&app, "/api/matches", json!({"opponent": "Rivals", "date": "2024-03-01T19:30:00Z"})).await;
    assert_eq!(status, StatusCode::OK);
    let id = created_id(&body);

    let (status, matches) = get(&app, "/api/matches").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        matches,
        json!([{
            "id": id,
            "opponent": "Rivals",
            "date": "2024-03-01T19:30:00",
            "home": true,
            "team_score": null,
            "opponent_score": null,
            "notes": null
        }])
    );
}

#[tokio::test]
async fn match_scores_must_not_be_negative() {
    let (app, _) = test_app().await;
    let (status, body) = post(
        &app,
        "/api/matches",
        json!({"opponent": "Rivals", "date": "2024-03-01", "home": false, "team_score": 70, "opponent_score": -2}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "opponent_score");

    let (_, matches) = get(&app, "/api/matches").await;
    assert_eq!(matches, json!([]));
}

#[tokio::test]
async fn statline_with_malformed_ids_is_rejected() {
    let (app, _) = test_app().await;

    let (status, body) = post(&app, "/api/stats", json!({"match_id": "abc", "player_id": UNUSED_ID})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid match_id or player_id");

    let (status, body) = post(&app, "/api/stats", json!({"match_id": UNUSED_ID, "player_id": "abc"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid match_id or player_id");

    let (_, stats) = get(&app, &format!("/api/stats/by-match/{UNUSED_ID}")).await;
    assert_eq!(stats, json!([]));
}

#[tokio::test]
async fn statline_may_reference_unknown_match() {
    let (app, _) = test_app().await;

    let (status, body) = post(
        &app,
        "/api/stats",
        json!({"match_id": UNUSED_ID, "player_id": UNUSED_ID, "points": 21, "assists": 4}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created_id(&body);

    let (status, stats) = get(&app, &format!("/api/stats/by-match/{UNUSED_ID}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!([{
            "id": id,
            "match_id": UNUSED_ID,
            "player_id": UNUSED_ID,
            "points": 21,
            "rebounds": 0,
            "assists": 4,
            "steals": 0,
            "blocks": 0,
            "turnovers": 0
        }])
    );
}

#[tokio::test]
async fn stats_are_filtered_by_match() {
    let (app, _) = test_app().await;

    let (_, player) = post(&app, "/api/players", json!({"name": "E. Green", "number": 7})).await;
    let player_id = created_id(&player);
    let (_, home) = post(&app, "/api/matches", json!({"opponent": "Hawks", "date": "2024-01-10T18:00:00"})).await;
    let home_id = created_id(&home);
    let (_, away) = post(&app, "/api/matches", json!({"opponent": "Owls", "date": "2024-01-17T18:00:00"})).await;
    let away_id = created_id(&away);

    for (match_id, points) in [(&home_id, 12), (&away_id, 30), (&home_id, 8)] {
        let (status, _) = post(
            &app,
            "/api/stats",
            json!({"match_id": match_id, "player_id": player_id, "points": points}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, stats) = get(&app, &format!("/api/stats/by-match/{home_id}")).await;
    let points: Vec<_> = stats.as_array().unwrap().iter().map(|s| s["points"].as_i64().unwrap()).collect();
    assert_eq!(points, [12, 8]);
    assert!(stats.as_array().unwrap().iter().all(|s| s["match_id"] == home_id.as_str()));
}

#[tokio::test]
async fn stats_lookup_rejects_malformed_match_id() {
    let (app, _) = test_app().await;
    let (status, body) = get(&app, "/api/stats/by-match/xyz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid match_id");
}

#[tokio::test]
async fn list_endpoints_never_expose_internal_ids() {
    let (app, _) = test_app().await;
    let (_, player) = post(&app, "/api/players", json!({"name": "F", "number": 1})).await;
    let player_id = created_id(&player);
    let (_, game) = post(&app, "/api/matches", json!({"opponent": "G", "date": "2024-02-02"})).await;
    let match_id = created_id(&game);
    post(&app, "/api/stats", json!({"match_id": match_id, "player_id": player_id})).await;

    for uri in ["/api/players".to_string(), "/api/matches".to_string(), format!("/api/stats/by-match/{match_id}")] {
        let (_, list) = get(&app, &uri).await;
        let records = list.as_array().unwrap();
        assert_eq!(records.len(), 1, "{uri}");
        for record in records {
            assert!(record["id"].is_string(), "{uri}");
            assert!(record.get("_id").is_none(), "{uri}");
        }
    }
}

#[tokio::test]
async fn data_endpoints_need_a_database() {
    let app = app(AppState::new(None, Config::default()));

    let (status, body) = get(&app, "/api/players").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Database not configured");

    let (status, _) = post(&app, "/api/matches", json!({"opponent": "H", "date": "2024-02-02"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn store_failures_are_server_errors() {
    let (app, store) = test_app().await;
    store.close().await;

    let (status, _) = post(&app, "/api/players", json!({"name": "I", "number": 9})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = get(&app, "/api/matches").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn diagnostics_report_working_store() {
    let (app, _) = test_app().await;
    post(&app, "/api/players", json!({"name": "J", "number": 2})).await;

    let (status, body) = get(&app, "/test").await;
    assert_eq!(status, StatusCode::OK);
    let report: DiagnosticReport = serde_json::from_value(body).unwrap();
    assert_eq!(report.backend, "✅ Running");
    assert_eq!(report.database, "✅ Connected & Working");
    assert_eq!(report.connection_status, "Connected");
    assert_eq!(report.collections, [Collection::Players.name()]);
    assert_eq!(report.database_url.as_deref(), Some("✅ Set"));
    assert_eq!(report.database_name.as_deref(), Some("✅ Set"));
}

#[tokio::test]
async fn diagnostics_list_at_most_ten_collections() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    // Created out of order; the report is alphabetical.
    for n in (0..12).rev() {
        sqlx::query(&format!(r#"CREATE TABLE "team_{n:02}" (_id TEXT PRIMARY KEY, doc TEXT)"#))
            .execute(&pool)
            .await
            .unwrap();
    }
    let store = DocumentStore::from_pool(pool, "team_test");
    let app = app(AppState::new(Some(store), configured()));

    let (status, body) = get(&app, "/test").await;
    assert_eq!(status, StatusCode::OK);
    let report: DiagnosticReport = serde_json::from_value(body).unwrap();
    let expected: Vec<String> = (0..10).map(|n| format!("team_{n:02}")).collect();
    assert_eq!(report.collections, expected);
    assert_eq!(report.database, "✅ Connected & Working");
}

#[tokio::test]
async fn diagnostics_survive_a_disconnected_store() {
    let (app, store) = test_app().await;
    store.close().await;

    let (status, body) = get(&app, "/test").await;
    assert_eq!(status, StatusCode::OK);
    let report: DiagnosticReport = serde_json::from_value(body).unwrap();
    assert!(report.database.starts_with("⚠️  Connected but Error: "), "{}", report.database);
    assert!(report.collections.is_empty());
}

#[tokio::test]
async fn diagnostics_without_a_store() {
    let app = app(AppState::new(None, Config::default()));

    let (status, body) = get(&app, "/test").await;
    assert_eq!(status, StatusCode::OK);
    let report: DiagnosticReport = serde_json::from_value(body).unwrap();
    assert_eq!(report.database, "⚠️  Available but not initialized");
    assert_eq!(report.connection_status, "Not Connected");
    assert_eq!(report.database_url.as_deref(), Some("❌ Not Set"));
    assert_eq!(report.database_name.as_deref(), Some("❌ Not Set"));
}
