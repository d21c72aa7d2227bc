//! End-to-end tests for the task REST API.
//!
//! Starts the server in-process on an ephemeral port and drives it through
//! `HttpTaskApi`, falling back to raw `reqwest` where the test needs the
//! status code itself.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use taskboard::api::http::HttpTaskApi;
use taskboard::api::{ApiError, TaskApi};
use taskboard_proto::{Category, Description, NewTask, Priority, Status, TaskId, TaskPatch};
use taskboard_server::api::{AppState, start_server};
use taskboard_server::auth::AuthGate;
use taskboard_server::store::TaskStore;
use url::Url;

const SECRET: &str = "integration-test-secret";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn mint_token(subject: &str, exp: i64) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": subject, "exp": exp }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode token")
}

fn valid_token() -> String {
    mint_token("user-1", now_secs() + 3600)
}

/// Starts a server with an empty in-memory store and returns its base URL.
async fn start() -> String {
    let state = Arc::new(AppState::new(TaskStore::new(), AuthGate::new(SECRET, None)));
    let (addr, _handle) = start_server("127.0.0.1:0", state)
        .await
        .expect("server should start");
    format!("http://{addr}")
}

fn client(base: &str, token: &str) -> HttpTaskApi {
    HttpTaskApi::new(
        Url::parse(base).unwrap(),
        token,
        Duration::from_secs(2),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        category: Category::Development,
        priority: Priority::Medium,
        status: Status::InProgress,
        duedate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        description: Description {
            summary: "first pass".into(),
            acceptance_criteria: vec!["compiles".into()],
            ..Description::default()
        },
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn crud_round_trip() {
    let base = start().await;
    let api = client(&base, &valid_token());

    let created = api.create(new_task("Write docs")).await.unwrap();
    assert_eq!(created.title, "Write docs");
    assert_eq!(created.status, Status::InProgress);
    assert_eq!(created.description.acceptance_criteria, vec!["compiles"]);

    let listed = api.list().await.unwrap();
    assert_eq!(listed, vec![created.clone()]);
    assert_eq!(api.get(created.id).await.unwrap(), created);

    let patch = TaskPatch {
        title: Some("Write better docs".into()),
        status: Some(Status::InReview),
        ..TaskPatch::default()
    };
    let updated = api.update(created.id, patch).await.unwrap();
    assert_eq!(updated.title, "Write better docs");
    assert_eq!(updated.status, Status::InReview);
    // Untouched fields survive a partial update.
    assert_eq!(updated.priority, Priority::Medium);
    assert_eq!(updated.description, created.description);

    api.delete(created.id).await.unwrap();
    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn created_ids_are_distinct() {
    let base = start().await;
    let api = client(&base, &valid_token());

    let a = api.create(new_task("a")).await.unwrap();
    let b = api.create(new_task("b")).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(api.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let base = start().await;
    let api = client(&base, &valid_token());
    let missing = TaskId::new(9999);

    assert_eq!(
        api.get(missing).await.unwrap_err(),
        ApiError::NotFound("Task with ID 9999 not found".into())
    );
    assert!(matches!(
        api.update(missing, TaskPatch::status(Status::Completed)).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(api.delete(missing).await, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn empty_title_is_validation_error() {
    let base = start().await;
    let api = client(&base, &valid_token());

    let err = api.create(new_task("   ")).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)), "got {err:?}");
    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn server_does_not_enforce_transitions() {
    // The transition table is a board rule; the API accepts any status.
    let base = start().await;
    let api = client(&base, &valid_token());
    let created = api
        .create(NewTask {
            status: Status::Completed,
            ..new_task("done")
        })
        .await
        .unwrap();

    let updated = api
        .update(created.id, TaskPatch::status(Status::OnHold))
        .await
        .unwrap();
    assert_eq!(updated.status, Status::OnHold);
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_uses_underscores_on_the_wire_and_accepts_labels() {
    let base = start().await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{base}/tasks"))
        .bearer_auth(valid_token())
        .json(&json!({
            "title": "spaced",
            "category": "Testing",
            "priority": "Low",
            "status": "On Hold",
            "duedate": "2024-02-29T10:00:00Z",
            "description": { "summary": "" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "On_Hold");
    assert_eq!(body["duedate"], "2024-02-29");
}

#[tokio::test]
async fn unknown_field_is_bad_request() {
    let base = start().await;
    let response = reqwest::Client::new()
        .patch(format!("{base}/tasks/1"))
        .bearer_auth(valid_token())
        .json(&json!({ "assignee": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn non_integer_id_is_bad_request() {
    let base = start().await;
    let response = reqwest::Client::new()
        .get(format!("{base}/tasks/abc"))
        .bearer_auth(valid_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let base = start().await;
    let response = reqwest::Client::new()
        .get(format!("{base}/tasks"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn mutations_without_token_leave_store_untouched() {
    let base = start().await;
    let api = client(&base, &valid_token());
    let existing = api.create(new_task("keep me")).await.unwrap();
    let http = reqwest::Client::new();
    let item = format!("{base}/tasks/{}", existing.id);

    let requests = [
        http.post(format!("{base}/tasks")).json(&json!({
            "title": "sneaky",
            "category": "Bugs",
            "priority": "High",
            "status": "In_Progress",
            "duedate": "2024-05-01",
            "description": {}
        })),
        http.patch(&item).json(&json!({ "status": "Completed" })),
        http.delete(&item),
    ];
    for request in requests {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    assert_eq!(api.list().await.unwrap(), vec![existing]);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let base = start().await;
    let api = client(&base, &mint_token("user-1", now_secs() - 3600));

    let err = api.list().await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)), "got {err:?}");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() {
    let base = start().await;
    let forged = encode(
        &Header::default(),
        &json!({ "sub": "mallory", "exp": now_secs() + 3600 }),
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();
    let api = client(&base, &forged);

    assert!(matches!(
        api.session().await,
        Err(ApiError::Authentication(_))
    ));
}

#[tokio::test]
async fn session_reports_subject() {
    let base = start().await;
    let exp = now_secs() + 600;
    let api = client(&base, &mint_token("alice@example.com", exp));

    let session = api.session().await.unwrap();
    assert_eq!(session.subject, "alice@example.com");
    assert_eq!(session.expires_at, exp);
}

#[tokio::test]
async fn health_needs_no_token() {
    let base = start().await;
    let response = reqwest::Client::new()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}
