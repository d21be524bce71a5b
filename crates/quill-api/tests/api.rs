//! End-to-end tests over the assembled router with an in-memory store.
//! The identity client points at a closed port; routes that would call the
//! provider are only exercised on their local-failure paths.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use quill_api::middleware::TokenVerifier;
use quill_api::router::router;
use quill_api::state::{AppState, AppStateInner};
use quill_db::Database;
use quill_identity::IdentityClient;
use quill_types::api::Claims;

const SECRET: &str = "test-secret";

fn test_state() -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        verifier: TokenVerifier::new(SECRET).unwrap(),
        identity: IdentityClient::new("http://127.0.0.1:9", "test-key"),
    })
}

fn token(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_is_public() {
    let app = router(test_state());
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn missing_or_garbled_bearer_is_rejected_before_the_store() {
    let state = test_state();
    let app = router(state.clone());
    let note = json!({ "title": "t", "content": "c" });

    let (status, body) = send(&app, "POST", "/api/notes", None, Some(note.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization header missing");

    let (status, body) = send(&app, "POST", "/api/notes", Some("garbage"), Some(note.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
    assert!(body["details"].is_string());

    // A header without the Bearer prefix is also rejected at the gate.
    let request = Request::builder()
        .method("POST")
        .uri("/api/notes")
        .header(header::AUTHORIZATION, "Token abc")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(note.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Neither rejected request touched the store.
    assert!(state.db.list_notes("user_a", false).unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/api/notes", Some(&token("user_a")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn note_crud_roundtrip_with_partial_update() {
    let app = router(test_state());
    let auth = token("user_a");

    let (status, created) = send(
        &app,
        "POST",
        "/api/notes",
        Some(&auth),
        Some(json!({ "title": "t", "content": "c", "tagIds": ["x"], "isPinned": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "t");
    assert_eq!(created["ownerId"], "user_a");
    assert_eq!(created["isPinned"], true);
    assert_eq!(created["isJournal"], false);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, "GET", &format!("/api/notes/{id}"), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["tagIds"], json!(["x"]));

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/notes/{id}"),
        Some(&auth),
        Some(json!({ "title": "renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "renamed");
    assert_eq!(updated["content"], "c");
    assert_eq!(updated["tagIds"], json!(["x"]));

    let (status, deleted) =
        send(&app, "DELETE", &format!("/api/notes/{id}"), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "success": true }));

    let (status, _) = send(&app, "GET", &format!("/api/notes/{id}"), Some(&auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting again reports absence, not an error.
    let (status, body) =
        send(&app, "DELETE", &format!("/api/notes/{id}"), Some(&auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Note not found");
}

#[tokio::test]
async fn notes_are_invisible_to_other_users() {
    let app = router(test_state());
    let alice = token("user_a");
    let bob = token("user_b");

    let (_, created) = send(
        &app,
        "POST",
        "/api/notes",
        Some(&alice),
        Some(json!({ "title": "secret", "content": "c" })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/notes", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Wrong owner is indistinguishable from absent: 404, not 403.
    let (status, _) = send(&app, "GET", &format!("/api/notes/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/notes/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/api/notes/{id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn journal_path_forces_the_flag_and_filters_by_it() {
    let app = router(test_state());
    let auth = token("user_a");

    // isJournal in the body is not part of the journal request shape.
    let (status, journal) = send(
        &app,
        "POST",
        "/api/journals",
        Some(&auth),
        Some(json!({ "title": "day one", "content": "...", "isJournal": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(journal["isJournal"], true);
    assert_eq!(journal["isPinned"], false);
    assert!(journal["date"].is_string());
    let journal_id = journal["id"].as_str().unwrap().to_string();

    let (_, plain) = send(
        &app,
        "POST",
        "/api/notes",
        Some(&auth),
        Some(json!({ "title": "plain", "content": "c" })),
    )
    .await;
    let plain_id = plain["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/api/journals", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], journal_id.as_str());

    // A plain note is NotFound through the journal path.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/journals/{plain_id}"),
        Some(&auth),
        Some(json!({ "title": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Journal entry not found");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/journals/{plain_id}"),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/journals/{journal_id}"),
        Some(&auth),
        Some(json!({ "title": "day 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn tag_lifecycle_with_cascading_cleanup() {
    let app = router(test_state());
    let alice = token("user_a");
    let bob = token("user_b");

    let (status, tag) = send(
        &app,
        "POST",
        "/api/tags",
        Some(&alice),
        Some(json!({ "name": "work", "color": "#00f" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tag["name"], "work");
    assert_eq!(tag["color"], "#00f");
    assert_eq!(tag["ownerId"], "user_a");
    let tag_id = tag["id"].as_str().unwrap().to_string();

    let (_, defaulted) = send(
        &app,
        "POST",
        "/api/tags",
        Some(&alice),
        Some(json!({ "name": "home" })),
    )
    .await;
    assert_eq!(defaulted["color"], "#999");

    let (_, note) = send(
        &app,
        "POST",
        "/api/notes",
        Some(&alice),
        Some(json!({ "title": "t", "content": "c", "tagIds": [tag_id] })),
    )
    .await;
    let note_id = note["id"].as_str().unwrap().to_string();
    assert_eq!(note["tagIds"], json!([tag_id.clone()]));

    // Bob referencing the same id value must be untouched by Alice's delete.
    let (_, bobs_note) = send(
        &app,
        "POST",
        "/api/notes",
        Some(&bob),
        Some(json!({ "title": "b", "content": "c", "tagIds": [tag_id] })),
    )
    .await;
    let bobs_note_id = bobs_note["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/tags/{tag_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, note_after) =
        send(&app, "GET", &format!("/api/notes/{note_id}"), Some(&alice), None).await;
    assert_eq!(note_after["tagIds"], json!([]));

    let (_, bobs_after) = send(
        &app,
        "GET",
        &format!("/api/notes/{bobs_note_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(bobs_after["tagIds"], json!([tag_id.clone()]));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/tags/{tag_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tag not found");
}

#[tokio::test]
async fn tag_update_is_partial() {
    let app = router(test_state());
    let auth = token("user_a");

    let (_, tag) = send(
        &app,
        "POST",
        "/api/tags",
        Some(&auth),
        Some(json!({ "name": "work", "color": "#00f" })),
    )
    .await;
    let id = tag["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/tags/{id}"),
        Some(&auth),
        Some(json!({ "color": "#fff" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "work");
    assert_eq!(updated["color"], "#fff");
}

#[tokio::test]
async fn foreign_profile_access_is_denied() {
    let app = router(test_state());
    let (status, body) = send(
        &app,
        "GET",
        "/api/users/user_b",
        Some(&token("user_a")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn metadata_update_requires_an_object() {
    let app = router(test_state());
    let auth = token("user_a");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/users/me/metadata",
        Some(&auth),
        Some(json!({ "metadata": "not-an-object" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Metadata object is required");

    let (status, _) = send(&app, "PUT", "/api/users/me/metadata", Some(&auth), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_note_body_is_a_client_error() {
    let app = router(test_state());
    let (status, _) = send(
        &app,
        "POST",
        "/api/notes",
        Some(&token("user_a")),
        Some(json!({ "title": "missing content" })),
    )
    .await;
    assert!(status.is_client_error());
}
