//! Database row types — these map directly to SQLite rows.
//! Distinct from the quill-types wire models to keep the DB layer
//! independent.

use chrono::{DateTime, Utc};

pub const DEFAULT_TAG_COLOR: &str = "#999";

#[derive(Debug, Clone)]
pub struct NoteRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    /// RFC 3339 text, set at insert time.
    pub date: String,
    pub tag_ids: Vec<String>,
    pub is_pinned: bool,
    pub is_journal: bool,
}

#[derive(Debug, Clone)]
pub struct TagRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub color: String,
}

/// Insert payload for a note. `date` left as None takes the creation-time
/// default at the repository; the journal path resolves its own date before
/// calling in.
#[derive(Debug)]
pub struct NewNote {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub date: Option<DateTime<Utc>>,
    pub tag_ids: Vec<String>,
    pub is_pinned: bool,
    pub is_journal: bool,
}

#[derive(Debug)]
pub struct NewTag {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub color: Option<String>,
}

/// Field-by-field note patch: None leaves the stored value untouched.
#[derive(Debug, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub date: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_journal: Option<bool>,
}

#[derive(Debug, Default)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}
