use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS notes (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL,
            title       TEXT NOT NULL DEFAULT '',
            content     TEXT NOT NULL DEFAULT '',
            date        TEXT NOT NULL,
            tag_ids     TEXT NOT NULL DEFAULT '[]',
            is_pinned   INTEGER NOT NULL DEFAULT 0,
            is_journal  INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notes_owner
            ON notes(owner_id);

        CREATE INDEX IF NOT EXISTS idx_notes_owner_journal
            ON notes(owner_id, is_journal);

        -- tag_ids holds a JSON array of tag ids. There is deliberately no
        -- foreign key: a note may reference a tag that no longer exists,
        -- and tag deletion scrubs references as a follow-up write.

        CREATE TABLE IF NOT EXISTS tags (
            id          TEXT PRIMARY KEY,
            owner_id    TEXT NOT NULL,
            name        TEXT NOT NULL,
            color       TEXT NOT NULL DEFAULT '#999',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_tags_owner
            ON tags(owner_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
