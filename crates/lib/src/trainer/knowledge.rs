//! # Knowledge Storage & Retrieval
//!
//! Voice blobs are an append-only log. Retrieval always works from the
//! highest committed version; raw uploads are stored alongside commits in
//! the same version space but never advance it on their own.

use crate::{
    errors::AssistantError,
    prompts::NO_NOTES_PLACEHOLDER,
    text::truncate_chars,
    types::{BlobKind, VoiceBlob},
};
use turso::{params, Database, Row};
use uuid::Uuid;

/// Upper bound on the knowledge text handed to the prompt assembler. A hard
/// character cutoff, not sentence-aware.
pub const KNOWLEDGE_CHAR_LIMIT: usize = 10_000;

fn blob_from_row(row: &Row) -> Result<VoiceBlob, AssistantError> {
    let kind: String = row.get(2)?;
    let kind = match kind.as_str() {
        "qa" => BlobKind::Qa,
        _ => BlobKind::Upload,
    };
    Ok(VoiceBlob {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        content: row.get(3)?,
        version: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const BLOB_COLUMNS: &str = "id, user_id, kind, content, version, created_at";

/// Stores raw uploaded text as an `upload` blob.
///
/// The blob records the user's current maximum version (0 when none) rather
/// than incrementing it: only commits advance the counter, but the next
/// commit's max scan still sees this row.
pub async fn store_upload(
    db: &Database,
    user_id: &str,
    content: &str,
) -> Result<VoiceBlob, AssistantError> {
    let conn = db.connect()?;
    let blob_id = Uuid::new_v4().to_string();

    conn.execute(
        "INSERT INTO voice_blobs (id, user_id, kind, content, version) \
         SELECT ?, ?, 'upload', ?, COALESCE(MAX(version), 0) \
         FROM voice_blobs WHERE user_id = ?",
        params![blob_id.clone(), user_id, content, user_id],
    )
    .await?;

    let mut rows = conn
        .query(
            &format!("SELECT {BLOB_COLUMNS} FROM voice_blobs WHERE id = ?"),
            params![blob_id],
        )
        .await?;
    let row = rows.next().await?.ok_or_else(|| {
        AssistantError::StorageOperationFailed("stored upload disappeared before readback".into())
    })?;
    blob_from_row(&row)
}

/// The latest committed coach notes for a user, ready for prompt assembly.
///
/// Among `qa` blobs, picks the one(s) with the maximum version. Multiple
/// blobs sharing that version should not happen under the uniqueness
/// invariant but are tolerated by concatenating their contents with a blank
/// line. No commits at all yields a fixed placeholder. The result is
/// truncated to [`KNOWLEDGE_CHAR_LIMIT`] characters.
pub async fn latest_qa_notes(db: &Database, user_id: &str) -> Result<String, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT content FROM voice_blobs \
             WHERE user_id = ? AND kind = 'qa' \
               AND version = (SELECT MAX(version) FROM voice_blobs \
                              WHERE user_id = ? AND kind = 'qa') \
             ORDER BY created_at ASC",
            params![user_id, user_id],
        )
        .await?;

    let mut contents: Vec<String> = Vec::new();
    while let Some(row) = rows.next().await? {
        contents.push(row.get(0)?);
    }

    if contents.is_empty() {
        return Ok(NO_NOTES_PLACEHOLDER.to_string());
    }

    let joined = contents.join("\n\n");
    Ok(truncate_chars(&joined, KNOWLEDGE_CHAR_LIMIT).to_string())
}

/// The most recently uploaded raw transcript's content, or the empty string
/// when the user has never uploaded one.
pub async fn latest_upload_text(db: &Database, user_id: &str) -> Result<String, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT content FROM voice_blobs \
             WHERE user_id = ? AND kind = 'upload' \
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![user_id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(String::new()),
    }
}

/// All committed Q&A blobs for a user, newest version first.
pub async fn list_qa_blobs(db: &Database, user_id: &str) -> Result<Vec<VoiceBlob>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {BLOB_COLUMNS} FROM voice_blobs \
                 WHERE user_id = ? AND kind = 'qa' ORDER BY version DESC"
            ),
            params![user_id],
        )
        .await?;

    let mut blobs = Vec::new();
    while let Some(row) = rows.next().await? {
        blobs.push(blob_from_row(&row)?);
    }
    Ok(blobs)
}

/// The most recent raw uploads for a user, newest first.
pub async fn list_recent_uploads(
    db: &Database,
    user_id: &str,
    limit: u32,
) -> Result<Vec<VoiceBlob>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {BLOB_COLUMNS} FROM voice_blobs \
                 WHERE user_id = ? AND kind = 'upload' \
                 ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
            ),
            params![user_id],
        )
        .await?;

    let mut blobs = Vec::new();
    while let Some(row) = rows.next().await? {
        blobs.push(blob_from_row(&row)?);
    }
    Ok(blobs)
}

/// The most recent blobs of any kind, newest first, for trend analysis.
pub async fn list_recent_blobs(
    db: &Database,
    user_id: &str,
    limit: u32,
) -> Result<Vec<VoiceBlob>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {BLOB_COLUMNS} FROM voice_blobs \
                 WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
            ),
            params![user_id],
        )
        .await?;

    let mut blobs = Vec::new();
    while let Some(row) = rows.next().await? {
        blobs.push(blob_from_row(&row)?);
    }
    Ok(blobs)
}
