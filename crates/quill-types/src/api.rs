use serde::{Deserialize, Deserializer, Serialize};

// -- JWT Claims --

/// Claims carried by the identity provider's bearer token. Only the subject
/// and expiry are read; any other claims in the token are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Notes --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// RFC 3339; unparsable values fall back to the creation-time default.
    pub date: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_journal: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub date: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_journal: Option<bool>,
}

// -- Journals --

/// The journal path never accepts `isJournal` from the body — the flag is
/// forced server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJournalRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "bool_or_false")]
    pub is_pinned: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJournalRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub date: Option<String>,
    pub is_pinned: Option<bool>,
}

// -- Tags --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct UpdateMetadataRequest {
    /// Must be a JSON object; validated by the handler so the error body
    /// matches the rest of the API.
    pub metadata: Option<serde_json::Value>,
}

/// Accept any JSON value, treating everything but a literal `true`/`false`
/// as false.
fn bool_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}
