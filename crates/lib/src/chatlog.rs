//! # Message Log
//!
//! Append-only per-user chat history. The user can bulk-delete their own
//! entries; individual entries are never edited.

use crate::errors::AssistantError;
use serde::Serialize;
use turso::{params, Database};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct MessageLogEntry {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// Appends one message to the user's log.
pub async fn append_message(
    db: &Database,
    user_id: &str,
    role: &str,
    content: &str,
) -> Result<(), AssistantError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO message_log (id, user_id, role, content) VALUES (?, ?, ?, ?)",
        params![Uuid::new_v4().to_string(), user_id, role, content],
    )
    .await?;
    Ok(())
}

/// A page of the user's messages, oldest first for proper conversation
/// flow.
pub async fn list_messages(
    db: &Database,
    user_id: &str,
    limit: u32,
    offset: u32,
) -> Result<Vec<MessageLogEntry>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT id, role, content, created_at FROM message_log \
                 WHERE user_id = ? ORDER BY created_at ASC, rowid ASC \
                 LIMIT {limit} OFFSET {offset}"
            ),
            params![user_id],
        )
        .await?;

    let mut messages = Vec::new();
    while let Some(row) = rows.next().await? {
        messages.push(MessageLogEntry {
            id: row.get(0)?,
            role: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
        });
    }
    Ok(messages)
}

/// Deletes every message the user has logged. Returns the number removed.
pub async fn clear_messages(db: &Database, user_id: &str) -> Result<u64, AssistantError> {
    let conn = db.connect()?;
    let deleted = conn
        .execute("DELETE FROM message_log WHERE user_id = ?", params![user_id])
        .await?;
    Ok(deleted)
}
