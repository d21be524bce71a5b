use axum::middleware::from_fn_with_state;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{journals, notes, tags, users};

/// Assemble the full route tree. Everything under /api sits behind the
/// bearer-token gate; /health is public.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route(
            "/journals",
            get(journals::list_journals).post(journals::create_journal),
        )
        .route(
            "/journals/{id}",
            get(journals::get_journal)
                .put(journals::update_journal)
                .delete(journals::delete_journal),
        )
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/tags/{id}", put(tags::update_tag).delete(tags::delete_tag))
        .route("/users/me", get(users::get_me))
        .route("/users/me/metadata", put(users::update_metadata))
        .route("/users/me/organizations", get(users::get_organizations))
        .route("/users/{id}", get(users::get_user))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().route("/health", get(health)).nest("/api", api)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
