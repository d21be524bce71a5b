use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use quill_db::models::{NewNote, NotePatch, NoteRow};
use quill_types::api::{Claims, CreateNoteRequest, UpdateNoteRequest};
use quill_types::models::Note;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let rows = tokio::task::spawn_blocking(move || db.db.list_notes(&owner, false))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok(Json(rows.into_iter().map(note_response).collect()))
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    // ownerId always comes from the verified token, never from the body.
    // date is left to the repository default when absent or unparsable.
    let new = NewNote {
        id: Uuid::new_v4().to_string(),
        owner_id: claims.sub,
        title: req.title,
        content: req.content,
        date: parse_client_date(req.date.as_deref()),
        tag_ids: req.tag_ids,
        is_pinned: req.is_pinned.unwrap_or(false),
        is_journal: req.is_journal.unwrap_or(false),
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

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Note>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let row = tokio::task::spawn_blocking(move || db.db.get_note(&owner, &id, false))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??
        .ok_or(ApiError::NotFound("Note"))?;

    Ok(Json(note_response(row)))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let patch = NotePatch {
        title: req.title,
        content: req.content,
        tag_ids: req.tag_ids,
        date: parse_client_date(req.date.as_deref()).map(|d| d.to_rfc3339()),
        is_pinned: req.is_pinned,
        is_journal: req.is_journal,
    };

    let db = state.clone();
    let owner = claims.sub;
    let row = tokio::task::spawn_blocking(move || db.db.update_note(&owner, &id, &patch, false))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??
        .ok_or(ApiError::NotFound("Note"))?;

    Ok(Json(note_response(row)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let deleted = tokio::task::spawn_blocking(move || db.db.delete_note(&owner, &id, false))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    if !deleted {
        return Err(ApiError::NotFound("Note"));
    }
    Ok(Json(json!({ "success": true })))
}

/// Client-supplied dates are RFC 3339; anything unparsable is treated as
/// absent rather than an error.
pub(crate) fn parse_client_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

pub(crate) fn note_response(row: NoteRow) -> Note {
    let date = row.date.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt date '{}' on note '{}': {}", row.date, row.id, e);
        DateTime::default()
    });

    Note {
        id: row.id,
        title: row.title,
        content: row.content,
        date,
        tag_ids: row.tag_ids,
        is_pinned: row.is_pinned,
        is_journal: row.is_journal,
        owner_id: row.owner_id,
    }
}
