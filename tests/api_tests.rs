//! Router-level tests for the JSON API.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use devboard::config::Config;
use devboard::db::{Database, now_ms};
use devboard::revalidate::RevalidationBus;
use devboard::service::TaskService;
use devboard::web::{AppState, build_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const CRON_SECRET: &str = "s3cret";

struct TestApp {
    app: Router,
    db: Arc<Database>,
    token: String,
    other_token: String,
}

fn setup() -> TestApp {
    let db = Arc::new(Database::open_in_memory().expect("in-memory db"));
    let alice = db.create_user(Some("Alice"), "alice@example.com", None).unwrap();
    let bob = db.create_user(Some("Bob"), "bob@example.com", None).unwrap();
    let token = db.create_session(&alice.id, 60_000).unwrap().token;
    let other_token = db.create_session(&bob.id, 60_000).unwrap().token;

    let mut config = Config::default();
    config.retention.cron_secret = Some(CRON_SECRET.to_string());
    let service = TaskService::new(Arc::clone(&db), Arc::new(RevalidationBus::new()));
    let app = build_router(AppState::from_service(service, &config));

    TestApp {
        app,
        db,
        token,
        other_token,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_is_public() {
    let t = setup();
    let (status, body) = send(&t.app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn requests_without_session_are_unauthorized() {
    let t = setup();
    for (method, uri) in [
        ("GET", "/api/tasks"),
        ("GET", "/api/labels"),
        ("GET", "/api/me"),
        ("DELETE", "/api/tasks/abc"),
        ("POST", "/api/tasks/abc/clone"),
    ] {
        let (status, body) = send(&t.app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let (status, _) = send(&t.app, "GET", "/api/tasks", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_is_accepted() {
    let t = setup();
    let request = Request::builder()
        .uri("/api/me")
        .header("cookie", format!("devboard.session-token={}", t.token))
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let me: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(me["email"], "alice@example.com");
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let t = setup();
    let token = Some(t.token.as_str());

    let (status, label) = send(
        &t.app,
        "POST",
        "/api/labels",
        token,
        Some(json!({"name": "Bug", "color": "#EF4444"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(label["name"], "bug");
    let label_id = label["id"].as_str().unwrap().to_string();

    let (status, task) = send(
        &t.app,
        "POST",
        "/api/tasks",
        token,
        Some(json!({"title": "Fix it", "priority": "HIGH", "label_ids": [label_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["priority"], "HIGH");
    assert_eq!(task["labels"][0]["name"], "bug");
    let id = task["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &t.app,
        "PATCH",
        &format!("/api/tasks/{}", id),
        token,
        Some(json!({"status": "IN_PROGRESS", "description": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "IN_PROGRESS");
    assert_eq!(updated["title"], "Fix it");

    let (status, copy) = send(
        &t.app,
        "POST",
        &format!("/api/tasks/{}/clone", id),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(copy["id"], task["id"]);
    assert_eq!(copy["title"], "Fix it");

    let (status, _) = send(&t.app, "DELETE", &format!("/api/tasks/{}", id), token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&t.app, "GET", &format!("/api/tasks/{}", id), token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, labels) = send(&t.app, "GET", "/api/labels", token, None).await;
    assert_eq!(labels[0]["task_count"], 1);

    let (status, restored) = send(
        &t.app,
        "POST",
        &format!("/api/tasks/{}/restore", id),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(restored["deleted_at"].is_null());

    let copy_id = copy["id"].as_str().unwrap();
    let (status, _) = send(
        &t.app,
        "DELETE",
        &format!("/api/tasks/{}/permanent", copy_id),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, list) = send(&t.app, "GET", "/api/tasks", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], task["id"]);
}

#[tokio::test]
async fn status_filter_query() {
    let t = setup();
    let token = Some(t.token.as_str());
    for (title, status) in [("a", "DONE"), ("b", "TODO"), ("c", "DONE")] {
        send(
            &t.app,
            "POST",
            "/api/tasks",
            token,
            Some(json!({"title": title, "status": status})),
        )
        .await;
    }

    let (_, done) = send(&t.app, "GET", "/api/tasks?status=DONE", token, None).await;
    let done = done.as_array().unwrap();
    assert_eq!(done.len(), 2);
    assert!(done.iter().all(|t| t["status"] == "DONE"));

    let (_, all) = send(&t.app, "GET", "/api/tasks?status=all", token, None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn validation_and_ownership_errors() {
    let t = setup();
    let (status, body) = send(
        &t.app,
        "POST",
        "/api/tasks",
        Some(&t.token),
        Some(json!({"title": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is required");
    assert_eq!(body["field"], "title");

    let (_, task) = send(
        &t.app,
        "POST",
        "/api/tasks",
        Some(&t.token),
        Some(json!({"title": "Mine"})),
    )
    .await;
    let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());
    let (status, body) = send(&t.app, "GET", &uri, Some(&t.other_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TASK_NOT_FOUND");

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/labels",
        Some(&t.token),
        Some(json!({"name": "dup"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        &t.app,
        "POST",
        "/api/labels",
        Some(&t.other_token),
        Some(json!({"name": "DUP"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Label already exists");
}

#[tokio::test]
async fn revision_moves_after_mutation() {
    let t = setup();
    let (_, before) = send(&t.app, "GET", "/api/revision", None, None).await;
    assert_eq!(before["revision"], 0);

    send(
        &t.app,
        "POST",
        "/api/tasks",
        Some(&t.token),
        Some(json!({"title": "bump"})),
    )
    .await;
    let (_, after) = send(&t.app, "GET", "/api/revision", None, None).await;
    assert_eq!(after, json!({"revision": 1}));

    // Polling is read-only: a second client sees the same answer
    let (_, again) = send(&t.app, "GET", "/api/revision", Some(&t.other_token), None).await;
    assert_eq!(again, after);
}

#[tokio::test]
async fn cron_cleanup_requires_secret_and_purges() {
    let t = setup();
    let (status, _) = send(&t.app, "GET", "/api/cron/cleanup-tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &t.app,
        "GET",
        "/api/cron/cleanup-tasks",
        Some(&t.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, task) = send(
        &t.app,
        "POST",
        "/api/tasks",
        Some(&t.token),
        Some(json!({"title": "old"})),
    )
    .await;
    let id = task["id"].as_str().unwrap();
    t.db
        .set_deleted_at(id, Some(now_ms() - 31 * 86_400_000))
        .unwrap();

    let (status, body) = send(
        &t.app,
        "GET",
        "/api/cron/cleanup-tasks",
        Some(CRON_SECRET),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"], 1);
    assert!(body["cutoffDate"].as_str().is_some());
}

#[tokio::test]
async fn cron_cleanup_refuses_when_secret_unset() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let service = TaskService::new(db, Arc::new(RevalidationBus::new()));
    let app = build_router(AppState::from_service(service, &Config::default()));

    let (status, _) = send(&app, "GET", "/api/cron/cleanup-tasks", Some(""), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
