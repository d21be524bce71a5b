use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use quill_db::models::{NewTag, TagPatch, TagRow};
use quill_types::api::{Claims, CreateTagRequest, UpdateTagRequest};
use quill_types::models::Tag;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_tags(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let rows = tokio::task::spawn_blocking(move || db.db.list_tags(&owner))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok(Json(rows.into_iter().map(tag_response).collect()))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTagRequest>,
) -> Result<Json<Tag>, ApiError> {
    let new = NewTag {
        id: Uuid::new_v4().to_string(),
        owner_id: claims.sub,
        name: req.name,
        color: req.color,
    };

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.insert_tag(new))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    Ok(Json(tag_response(row)))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, ApiError> {
    let patch = TagPatch {
        name: req.name,
        color: req.color,
    };

    let db = state.clone();
    let owner = claims.sub;
    let row = tokio::task::spawn_blocking(move || db.db.update_tag(&owner, &id, &patch))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??
        .ok_or(ApiError::NotFound("Tag"))?;

    Ok(Json(tag_response(row)))
}

/// Deleting a tag also scrubs its id from every note the owner has; the
/// repository does both in one locked section.
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.clone();
    let owner = claims.sub;
    let deleted = tokio::task::spawn_blocking(move || db.db.delete_tag(&owner, &id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    if !deleted {
        return Err(ApiError::NotFound("Tag"));
    }
    Ok(Json(json!({ "success": true })))
}

fn tag_response(row: TagRow) -> Tag {
    Tag {
        id: row.id,
        name: row.name,
        color: row.color,
        owner_id: row.owner_id,
    }
}
