use crate::Database;
use crate::models::{DEFAULT_TAG_COLOR, NewNote, NewTag, NotePatch, NoteRow, TagPatch, TagRow};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::debug;

const NOTE_COLUMNS: &str = "id, owner_id, title, content, date, tag_ids, is_pinned, is_journal";

impl Database {
    // -- Notes --
    //
    // Every query here matches on owner_id. A note owned by someone else is
    // indistinguishable from one that does not exist: lookups return None,
    // deletes return false.

    pub fn list_notes(&self, owner: &str, journal_only: bool) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| {
            let sql = if journal_only {
                format!("SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = ?1 AND is_journal = 1")
            } else {
                format!("SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = ?1")
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner], map_note_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_note(&self, owner: &str, id: &str, journal_only: bool) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| query_note(conn, owner, id, journal_only))
    }

    /// Insert a note. A missing `date` takes the creation-time default here,
    /// mirroring a schema-level default; callers that want a different
    /// default resolve it before calling in.
    pub fn insert_note(&self, new: NewNote) -> Result<NoteRow> {
        let date = new.date.unwrap_or_else(Utc::now).to_rfc3339();
        let tag_ids_json = serde_json::to_string(&new.tag_ids)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (id, owner_id, title, content, date, tag_ids, is_pinned, is_journal)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.id,
                    new.owner_id,
                    new.title,
                    new.content,
                    date,
                    tag_ids_json,
                    new.is_pinned,
                    new.is_journal,
                ],
            )?;
            Ok(())
        })?;

        Ok(NoteRow {
            id: new.id,
            owner_id: new.owner_id,
            title: new.title,
            content: new.content,
            date,
            tag_ids: new.tag_ids,
            is_pinned: new.is_pinned,
            is_journal: new.is_journal,
        })
    }

    /// Apply a field-by-field patch to an owned note. With `journal_only`
    /// the match additionally requires `is_journal`, so patching a plain
    /// note through the journal path comes back None.
    pub fn update_note(
        &self,
        owner: &str,
        id: &str,
        patch: &NotePatch,
        journal_only: bool,
    ) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let Some(mut row) = query_note(conn, owner, id, journal_only)? else {
                return Ok(None);
            };

            if let Some(title) = &patch.title {
                row.title = title.clone();
            }
            if let Some(content) = &patch.content {
                row.content = content.clone();
            }
            if let Some(tag_ids) = &patch.tag_ids {
                row.tag_ids = tag_ids.clone();
            }
            if let Some(date) = &patch.date {
                row.date = date.clone();
            }
            if let Some(is_pinned) = patch.is_pinned {
                row.is_pinned = is_pinned;
            }
            if let Some(is_journal) = patch.is_journal {
                row.is_journal = is_journal;
            }

            conn.execute(
                "UPDATE notes
                 SET title = ?1, content = ?2, date = ?3, tag_ids = ?4, is_pinned = ?5, is_journal = ?6
                 WHERE id = ?7 AND owner_id = ?8",
                params![
                    row.title,
                    row.content,
                    row.date,
                    serde_json::to_string(&row.tag_ids)?,
                    row.is_pinned,
                    row.is_journal,
                    row.id,
                    owner,
                ],
            )?;

            Ok(Some(row))
        })
    }

    pub fn delete_note(&self, owner: &str, id: &str, journal_only: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let sql = if journal_only {
                "DELETE FROM notes WHERE id = ?1 AND owner_id = ?2 AND is_journal = 1"
            } else {
                "DELETE FROM notes WHERE id = ?1 AND owner_id = ?2"
            };
            let deleted = conn.execute(sql, params![id, owner])?;
            Ok(deleted > 0)
        })
    }

    // -- Tags --

    pub fn list_tags(&self, owner: &str) -> Result<Vec<TagRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, owner_id, name, color FROM tags WHERE owner_id = ?1")?;
            let rows = stmt
                .query_map([owner], map_tag_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_tag(&self, new: NewTag) -> Result<TagRow> {
        let color = new.color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tags (id, owner_id, name, color) VALUES (?1, ?2, ?3, ?4)",
                params![new.id, new.owner_id, new.name, color],
            )?;
            Ok(())
        })?;

        Ok(TagRow {
            id: new.id,
            owner_id: new.owner_id,
            name: new.name,
            color,
        })
    }

    /// Partial update: omitted fields keep their stored value.
    pub fn update_tag(&self, owner: &str, id: &str, patch: &TagPatch) -> Result<Option<TagRow>> {
        self.with_conn(|conn| {
            let Some(mut row) = query_tag(conn, owner, id)? else {
                return Ok(None);
            };

            if let Some(name) = &patch.name {
                row.name = name.clone();
            }
            if let Some(color) = &patch.color {
                row.color = color.clone();
            }

            conn.execute(
                "UPDATE tags SET name = ?1, color = ?2 WHERE id = ?3 AND owner_id = ?4",
                params![row.name, row.color, row.id, owner],
            )?;

            Ok(Some(row))
        })
    }

    /// Delete an owned tag, then scrub its id from the tag_ids of every
    /// note belonging to the same owner. The two steps run back to back on
    /// the single locked connection, so other requests cannot interleave,
    /// but they are not one SQL transaction: a crash between them leaves
    /// dangling references behind.
    pub fn delete_tag(&self, owner: &str, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tags WHERE id = ?1 AND owner_id = ?2",
                params![id, owner],
            )?;
            if deleted == 0 {
                return Ok(false);
            }

            // LIKE is only a prefilter; the exact membership check happens
            // on the parsed array below.
            let pattern = format!("%\"{}\"%", id);
            let mut stmt =
                conn.prepare("SELECT id, tag_ids FROM notes WHERE owner_id = ?1 AND tag_ids LIKE ?2")?;
            let referencing = stmt
                .query_map(params![owner, pattern], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut scrubbed = 0usize;
            for (note_id, raw) in referencing {
                let mut tag_ids: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
                let before = tag_ids.len();
                tag_ids.retain(|t| t != id);
                if tag_ids.len() == before {
                    continue;
                }
                conn.execute(
                    "UPDATE notes SET tag_ids = ?1 WHERE id = ?2",
                    params![serde_json::to_string(&tag_ids)?, note_id],
                )?;
                scrubbed += 1;
            }
            debug!("Deleted tag {}, scrubbed {} note(s)", id, scrubbed);

            Ok(true)
        })
    }
}

fn query_note(
    conn: &Connection,
    owner: &str,
    id: &str,
    journal_only: bool,
) -> Result<Option<NoteRow>> {
    let sql = if journal_only {
        format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND owner_id = ?2 AND is_journal = 1"
        )
    } else {
        format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND owner_id = ?2")
    };
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row(params![id, owner], map_note_row).optional()
}

fn query_tag(conn: &Connection, owner: &str, id: &str) -> Result<Option<TagRow>> {
    let mut stmt =
        conn.prepare("SELECT id, owner_id, name, color FROM tags WHERE id = ?1 AND owner_id = ?2")?;
    stmt.query_row(params![id, owner], map_tag_row).optional()
}

fn map_note_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NoteRow> {
    let tag_ids_raw: String = row.get(5)?;
    Ok(NoteRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        date: row.get(4)?,
        tag_ids: serde_json::from_str(&tag_ids_raw).unwrap_or_default(),
        is_pinned: row.get(6)?,
        is_journal: row.get(7)?,
    })
}

fn map_tag_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TagRow> {
    Ok(TagRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
