use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as seen on the wire. Journal entries are notes with
/// `is_journal == true` — a filtered view, not a separate collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    /// Ordered tag references. May point at tags that no longer exist;
    /// deleting a tag scrubs its id from the owner's notes after the fact.
    pub tag_ids: Vec<String>,
    pub is_pinned: bool,
    pub is_journal: bool,
    pub owner_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub owner_id: String,
}

/// Profile shape returned by the users endpoints. Built from the identity
/// provider's user record — nothing here is stored locally.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub image_url: Option<String>,
    pub created_at: Option<i64>,
    pub last_sign_in_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_metadata: Option<serde_json::Value>,
}

/// Organization memberships are passed through from the identity provider
/// verbatim; the server adds no structure of its own.
pub type OrganizationMembership = serde_json::Value;
