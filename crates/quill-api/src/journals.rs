//! Journal entries are notes with `is_journal` set; these handlers differ
//! from the note handlers only in the forced flag, the extra match filter,
//! and the handler-side date default.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use quill_db::models::{NewNote, NotePatch};
use quill_types::api::{Claims, CreateJournalRequest, UpdateJournalRequest};
use quill_types::models::Note;

use crate::error::ApiError;
use crate::notes::{note_response, parse_client_date};
use crate::state::AppState;

pub async fn list_journals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let rows = tokio::task::spawn_blocking(move || db.db.list_notes(&owner, true))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok(Json(rows.into_iter().map(note_response).collect()))
}

pub async fn create_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateJournalRequest>,
) -> Result<Json<Note>, ApiError> {
    // Unlike the plain-note path, the date default is resolved here rather
    // than left to the repository, and is_journal is not client-settable.
    let new = NewNote {
        id: Uuid::new_v4().to_string(),
        owner_id: claims.sub,
        title: req.title,
        content: req.content,
        date: Some(parse_client_date(req.date.as_deref()).unwrap_or_else(Utc::now)),
        tag_ids: req.tag_ids,
        is_pinned: req.is_pinned,
        is_journal: true,
    };

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.insert_note(new))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok(Json(note_response(row)))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Note>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let row = tokio::task::spawn_blocking(move || db.db.get_note(&owner, &id, true))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??
        .ok_or(ApiError::NotFound("Journal entry"))?;

    Ok(Json(note_response(row)))
}

pub async fn update_journal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateJournalRequest>,
) -> Result<Json<Note>, ApiError> {
    // The match requires is_journal, so a plain note patched through this
    // path comes back NotFound instead of being converted.
    let patch = NotePatch {
        title: req.title,
        content: req.content,
        tag_ids: req.tag_ids,
        date: parse_client_date(req.date.as_deref()).map(|d| d.to_rfc3339()),
        is_pinned: req.is_pinned,
        is_journal: None,
    };

    let db = state.clone();
    let owner = claims.sub;
    let row = tokio::task::spawn_blocking(move || db.db.update_note(&owner, &id, &patch, true))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??
        .ok_or(ApiError::NotFound("Journal entry"))?;

    Ok(Json(note_response(row)))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let deleted = tokio::task::spawn_blocking(move || db.db.delete_note(&owner, &id, true))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    if !deleted {
        return Err(ApiError::NotFound("Journal entry"));
    }
    Ok(Json(json!({ "success": true })))
}
