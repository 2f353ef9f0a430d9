//! # Voice Trainer
//!
//! The training pipeline: per-question answer storage (`mod`), the commit
//! and versioning engine (`commit`), and versioned knowledge retrieval
//! (`knowledge`).

pub mod commit;
pub mod knowledge;

use crate::{errors::AssistantError, types::AnswerRecord};
use turso::{params, Database};
use uuid::Uuid;

/// Reads one answer, returning the empty string when unset.
pub async fn get_answer(
    db: &Database,
    user_id: &str,
    question_index: u32,
) -> Result<String, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT answer FROM training_answers WHERE user_id = ? AND question_index = ?",
            params![user_id, question_index as i64],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(String::new()),
    }
}

/// Upserts one answer, overwriting any prior value unconditionally.
/// Last writer wins; there is no concurrency check.
pub async fn set_answer(
    db: &Database,
    user_id: &str,
    question_index: u32,
    answer: &str,
) -> Result<(), AssistantError> {
    let conn = db.connect()?;

    // Update first, insert on miss, for maximum compatibility.
    let updated = conn
        .execute(
            "UPDATE training_answers SET answer = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE user_id = ? AND question_index = ?",
            params![answer, user_id, question_index as i64],
        )
        .await?;

    if updated == 0 {
        conn.execute(
            "INSERT INTO training_answers (id, user_id, question_index, answer) \
             VALUES (?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                user_id,
                question_index as i64,
                answer
            ],
        )
        .await?;
    }
    Ok(())
}

/// All stored answers for a user, ordered by question index ascending.
pub async fn list_answers(
    db: &Database,
    user_id: &str,
) -> Result<Vec<AnswerRecord>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT question_index, answer, updated_at FROM training_answers \
             WHERE user_id = ? ORDER BY question_index ASC",
            params![user_id],
        )
        .await?;

    let mut answers = Vec::new();
    while let Some(row) = rows.next().await? {
        let question_index: i64 = row.get(0)?;
        answers.push(AnswerRecord {
            question_index: question_index as u32,
            answer: row.get(1)?,
            updated_at: row.get(2)?,
        });
    }
    Ok(answers)
}
