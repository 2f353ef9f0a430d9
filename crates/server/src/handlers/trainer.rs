//! # Trainer Route Handlers
//!
//! The questionnaire surface: questions, per-question answers, readiness
//! status, commit, history, and prefill from uploaded material.

use super::{provider_error_code, read_form};
use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    Json,
};
use coachvoice::{
    analysis::parse_prefill_answers,
    completeness::assess,
    prompts::tasks::prefill_user_prompt,
    questions::{validate_index, QUESTIONS, QUESTION_COUNT},
    trainer::{
        commit::commit,
        get_answer,
        knowledge::{latest_upload_text, list_qa_blobs, list_recent_uploads},
        list_answers, set_answer,
    },
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// `GET /trainer/questions`: the fixed 30-question list.
pub async fn questions_handler(_user: AuthenticatedUser) -> Json<Value> {
    Json(json!({ "questions": QUESTIONS }))
}

/// `GET /trainer/answer/{index}`: one answer, or the empty string if unset.
pub async fn get_answer_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(index): Path<u32>,
) -> Result<Json<Value>, AppError> {
    validate_index(index)?;
    let answer = get_answer(&app_state.sqlite_provider.db, &user.0.id, index).await?;
    Ok(Json(json!({ "question_index": index, "answer": answer })))
}

#[derive(Deserialize)]
pub struct SetAnswerRequest {
    pub answer: String,
}

/// `POST /trainer/answer/{index}`: unconditional upsert of one answer.
pub async fn set_answer_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(index): Path<u32>,
    Json(payload): Json<SetAnswerRequest>,
) -> Result<Json<Value>, AppError> {
    validate_index(index)?;
    set_answer(
        &app_state.sqlite_provider.db,
        &user.0.id,
        index,
        &payload.answer,
    )
    .await?;
    Ok(Json(json!({ "ok": true })))
}

/// `GET /trainer/status`: answered indices, solid count, and the readiness
/// signal against the 24-of-30 target.
pub async fn status_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let answers = list_answers(&app_state.sqlite_provider.db, &user.0.id).await?;

    let answered_ids: Vec<u32> = answers
        .iter()
        .filter(|a| !a.answer.trim().is_empty())
        .map(|a| a.question_index)
        .collect();

    // Score all 30 slots; questions with no stored row count as empty.
    let mut snapshot = vec![""; QUESTION_COUNT];
    for record in &answers {
        if let Some(slot) = (record.question_index as usize)
            .checked_sub(1)
            .and_then(|i| snapshot.get_mut(i))
        {
            *slot = record.answer.as_str();
        }
    }
    let report = assess(snapshot);

    Ok(Json(json!({
        "answered_count": answered_ids.len(),
        "answered_ids": answered_ids,
        "solid_count": report.solid,
        "readiness": report.readiness_message(),
        "last_trained_at": user.0.last_trained_at,
    })))
}

/// `POST /trainer/commit`: freezes the current answers into a new versioned
/// voice blob. Never gated on readiness.
pub async fn commit_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let version = commit(&app_state.sqlite_provider.db, &user.0.id).await?;
    info!(user_id = %user.0.id, version, "Committed voice blob");
    Ok(Json(json!({ "ok": true, "voice_version": version })))
}

#[derive(Serialize)]
struct SessionSummary {
    id: String,
    version: i64,
    created_at: String,
    question_count: usize,
    preview: String,
    total_characters: usize,
}

#[derive(Serialize)]
struct UploadSummary {
    id: String,
    created_at: String,
    character_count: usize,
    preview: String,
    voice_version: i64,
}

const HISTORY_UPLOAD_LIMIT: u32 = 10;

/// `GET /trainer/history`: committed sessions summarized newest first, plus
/// the most recent raw uploads.
pub async fn history_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let db = &app_state.sqlite_provider.db;
    let qa_blobs = list_qa_blobs(db, &user.0.id).await?;
    let uploads = list_recent_uploads(db, &user.0.id, HISTORY_UPLOAD_LIMIT).await?;

    let question_re = Regex::new(r"Q\d+:").expect("static regex");
    let preview_re = Regex::new(r"A\d+:\s*(.{0,200})").expect("static regex");

    let sessions: Vec<SessionSummary> = qa_blobs
        .iter()
        .map(|blob| {
            let question_count = question_re.find_iter(&blob.content).count();
            let preview = preview_re
                .captures(&blob.content)
                .and_then(|caps| caps.get(1))
                .map(|m| format!("{}...", m.as_str().trim()))
                .unwrap_or_default();
            SessionSummary {
                id: blob.id.clone(),
                version: blob.version,
                created_at: blob.created_at.clone(),
                question_count,
                preview,
                total_characters: blob.content.chars().count(),
            }
        })
        .collect();

    let upload_summaries: Vec<UploadSummary> = uploads
        .iter()
        .map(|blob| UploadSummary {
            id: blob.id.clone(),
            created_at: blob.created_at.clone(),
            character_count: blob.content.chars().count(),
            preview: format!(
                "{}...",
                coachvoice::text::truncate_chars(&blob.content, 200)
            ),
            voice_version: blob.version,
        })
        .collect();

    let current_version = sessions.first().map(|s| s.version).unwrap_or(0);

    Ok(Json(json!({
        "training_sessions": sessions,
        "uploads": upload_summaries,
        "total_versions": sessions.len(),
        "current_version": current_version,
        "last_trained_at": user.0.last_trained_at,
    })))
}

#[derive(Deserialize, Default)]
pub struct PrefillParams {
    #[serde(default)]
    pub use_latest: Option<bool>,
}

/// `POST /trainer/prefill`: drafts answers to all 30 questions from an
/// uploaded file or the latest raw upload, and upserts every index.
///
/// When the model's output cannot be parsed, nothing is written: the
/// stored answers are left untouched and the response carries an error
/// code instead.
pub async fn prefill_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<PrefillParams>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let db = &app_state.sqlite_provider.db;

    let source = if params.use_latest.unwrap_or(false) {
        let text = latest_upload_text(db, &user.0.id).await?;
        if text.is_empty() {
            return Err(AppError::Validation(
                "No previous upload found".to_string(),
            ));
        }
        text
    } else {
        let form = match multipart {
            Ok(multipart) => read_form(multipart).await?,
            Err(_) => {
                return Err(AppError::Validation(
                    "Provide a file or set use_latest=true".to_string(),
                ))
            }
        };
        match form.file {
            Some((_, bytes)) if !bytes.is_empty() => {
                String::from_utf8_lossy(&bytes).into_owned()
            }
            _ => {
                return Err(AppError::Validation(
                    "Provide a file or set use_latest=true".to_string(),
                ))
            }
        }
    };

    let task = app_state.task("prefill")?;
    let provider = app_state.provider_for(task)?;
    let raw = provider
        .generate(
            &task.system_prompt,
            &prefill_user_prompt(&source),
            task.temperature,
        )
        .await?;

    let answers = match parse_prefill_answers(&raw) {
        Ok(answers) => answers,
        Err(e) => {
            warn!(user_id = %user.0.id, "Prefill response unusable: {e}");
            return Ok(Json(json!({
                "ok": false,
                "filled": 0,
                "error_code": provider_error_code(&e),
            })));
        }
    };

    let mut filled = 0;
    for (index, answer) in answers {
        if !answer.trim().is_empty() {
            filled += 1;
        }
        set_answer(db, &user.0.id, index, &answer).await?;
    }

    Ok(Json(json!({ "ok": true, "filled": filled })))
}
