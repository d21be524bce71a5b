//! Profile endpoints are pure passthrough to the identity provider — no
//! local user records exist. Upstream failures surface as a generic 500;
//! the provider's own errors only reach the logs.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::json;
use tracing::error;

use quill_types::api::{Claims, UpdateMetadataRequest};
use quill_types::models::{OrganizationMembership, UserProfile};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state.identity.get_user(&claims.sub).await.map_err(|e| {
        error!("Error fetching user profile: {}", e);
        ApiError::Upstream("Failed to fetch user profile")
    })?;
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    // Self-access only; there are no admin roles.
    if user_id != claims.sub {
        return Err(ApiError::Forbidden);
    }

    let user = state.identity.get_user(&user_id).await.map_err(|e| {
        error!("Error fetching user: {}", e);
        ApiError::Upstream("Failed to fetch user")
    })?;
    Ok(Json(user))
}

pub async fn update_metadata(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateMetadataRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let metadata = match req.metadata {
        Some(metadata) if metadata.is_object() => metadata,
        _ => return Err(ApiError::Validation("Metadata object is required".to_string())),
    };

    let user = state
        .identity
        .update_user_metadata(&claims.sub, &metadata)
        .await
        .map_err(|e| {
            error!("Error updating user metadata: {}", e);
            ApiError::Upstream("Failed to update user metadata")
        })?;

    Ok(Json(json!({ "success": true, "user": user })))
}

pub async fn get_organizations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrganizationMembership>>, ApiError> {
    let organizations = state.identity.get_organizations(&claims.sub).await.map_err(|e| {
        error!("Error fetching user organizations: {}", e);
        ApiError::Upstream("Failed to fetch user organizations")
    })?;
    Ok(Json(organizations))
}
