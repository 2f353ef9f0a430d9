//! # Commit / Versioning Engine
//!
//! Folds a user's current answers into one immutable voice blob, assigns it
//! the next version number for that user, and stamps the user's
//! last-trained timestamp.
//!
//! Version numbers are monotonic per user across *all* blob kinds: the next
//! version is computed as `max(version over every blob) + 1` inside a
//! single INSERT...SELECT statement, so two racing commits cannot read the
//! same maximum. The partial unique index on `(user_id, version)` for
//! `kind = 'qa'` backs this up, and a conflict is retried.

use crate::{
    errors::AssistantError,
    questions::question_text,
    trainer::list_answers,
    types::AnswerRecord,
};
use turso::{params, Database};
use uuid::Uuid;

/// Written instead of an empty blob when a user commits with no answers, so
/// every blob is non-empty and prompt-safe.
pub const EMPTY_COMMIT_PLACEHOLDER: &str = "No answers provided.";

const COMMIT_RETRIES: u32 = 3;

/// Renders answered questions as `Q{idx}: ...\nA{idx}: ...` blocks joined
/// by blank lines, in ascending index order. Answers that trim to nothing
/// are skipped; zero renderable answers yields the placeholder.
pub fn render_qa_blob(answers: &[AnswerRecord]) -> String {
    let blocks: Vec<String> = answers
        .iter()
        .filter(|record| !record.answer.trim().is_empty())
        .map(|record| {
            format!(
                "Q{idx}: {question}\nA{idx}: {answer}",
                idx = record.question_index,
                question = question_text(record.question_index).unwrap_or_default(),
                answer = record.answer.trim()
            )
        })
        .collect();

    if blocks.is_empty() {
        EMPTY_COMMIT_PLACEHOLDER.to_string()
    } else {
        blocks.join("\n\n")
    }
}

/// Commits the user's current answers as a new `qa` blob and returns the
/// new version number.
///
/// Commit is never gated on readiness: any number of answers, including
/// zero, is accepted.
pub async fn commit(db: &Database, user_id: &str) -> Result<i64, AssistantError> {
    let answers = list_answers(db, user_id).await?;
    let content = render_qa_blob(&answers);

    let conn = db.connect()?;
    let mut last_error = None;

    for _ in 0..COMMIT_RETRIES {
        let blob_id = Uuid::new_v4().to_string();

        // Single atomic read-max-and-insert: the max scan covers every blob
        // kind, so uploads participate in the version space.
        let inserted = conn
            .execute(
                "INSERT INTO voice_blobs (id, user_id, kind, content, version) \
                 SELECT ?, ?, 'qa', ?, COALESCE(MAX(version), 0) + 1 \
                 FROM voice_blobs WHERE user_id = ?",
                params![blob_id.clone(), user_id, content.clone(), user_id],
            )
            .await;

        match inserted {
            Ok(_) => {
                let mut rows = conn
                    .query(
                        "SELECT version FROM voice_blobs WHERE id = ?",
                        params![blob_id],
                    )
                    .await?;
                let row = rows.next().await?.ok_or_else(|| {
                    AssistantError::StorageOperationFailed(
                        "committed blob disappeared before readback".to_string(),
                    )
                })?;
                let version: i64 = row.get(0)?;

                conn.execute(
                    "UPDATE users SET last_trained_at = CURRENT_TIMESTAMP WHERE id = ?",
                    params![user_id],
                )
                .await?;

                return Ok(version);
            }
            Err(e) if e.to_string().contains("UNIQUE") => {
                tracing::warn!(user_id, "commit lost a version race, retrying");
                last_error = Some(e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AssistantError::StorageOperationFailed(format!(
        "commit failed after {COMMIT_RETRIES} version conflicts: {}",
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}
