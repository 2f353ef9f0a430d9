//! # Chat Route Handlers
//!
//! The conversational surface: chatting with the trained assistant, the
//! message log, and speech-to-text for dictated answers.
//!
//! A provider failure never reaches the end user as a bare 5xx: the user's
//! message is logged before the provider call, and the reply degrades to a
//! fixed fallback sentence with a machine-readable error code.

use super::{provider_error_code, read_form};
use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use coachvoice::{
    chatlog::{append_message, clear_messages, list_messages, MessageLogEntry},
    prompts::build_system_prompt,
    trainer::knowledge::latest_qa_notes,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// What the user sees when the model cannot be reached.
const CHAT_FALLBACK_REPLY: &str = "I hit a snag reaching the model just now. Your message is \
    saved, give it another try in a moment.";

/// What the trainer shows when transcription fails; the recording is not
/// stored, so the user is pointed at manual input.
const WHISPER_FALLBACK_TEXT: &str = "[Transcription is unavailable right now. Type your answer \
    instead, or try the microphone again shortly.]";

/// `POST /bot/chat`: builds the persona prompt from the latest committed
/// notes, asks the model for a reply, and logs both sides.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = read_form(multipart).await?;
    let message = form.text("message").unwrap_or_default().to_string();
    if message.is_empty() {
        return Err(AppError::Validation("Missing message".to_string()));
    }
    let coach_name = form.text_or("coach_name", "Coach");

    let db = &app_state.sqlite_provider.db;
    let notes = latest_qa_notes(db, &user.0.id).await?;
    let system = build_system_prompt(&coach_name, &notes);

    // The user's input is logged before the provider call so it survives a
    // provider failure.
    append_message(db, &user.0.id, "user", &message).await?;

    let task = app_state.task("chat")?;
    let provider = app_state.provider_for(task)?;

    let (reply, error_code) = match provider.generate(&system, &message, task.temperature).await {
        Ok(reply) => (reply, None),
        Err(e) if e.is_provider_failure() => {
            warn!(user_id = %user.0.id, "Chat provider failed: {e}");
            (
                CHAT_FALLBACK_REPLY.to_string(),
                Some(provider_error_code(&e)),
            )
        }
        Err(e) => return Err(e.into()),
    };

    append_message(db, &user.0.id, "assistant", &reply).await?;

    Ok(Json(json!({ "reply": reply, "error_code": error_code })))
}

#[derive(Deserialize, Default)]
pub struct HistoryParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Serialize)]
struct Conversation {
    date: String,
    messages: Vec<MessageLogEntry>,
}

const HISTORY_DEFAULT_LIMIT: u32 = 50;

/// `GET /bot/chat/history`: a page of the log, oldest first, grouped into
/// conversations by calendar date.
pub async fn chat_history_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(HISTORY_DEFAULT_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let messages = list_messages(&app_state.sqlite_provider.db, &user.0.id, limit, offset).await?;
    let total_messages = messages.len();

    let mut conversations: Vec<Conversation> = Vec::new();
    for message in messages {
        // Timestamps are stored as "YYYY-MM-DD HH:MM:SS"; the date prefix
        // is the grouping key.
        let date = message
            .created_at
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        match conversations.last_mut() {
            Some(conversation) if conversation.date == date => {
                conversation.messages.push(message)
            }
            _ => conversations.push(Conversation {
                date,
                messages: vec![message],
            }),
        }
    }

    Ok(Json(json!({
        "conversations": conversations,
        "total_messages": total_messages,
        "has_more": total_messages as u32 == limit,
    })))
}

/// `DELETE /bot/chat/history`: bulk-deletes the caller's message log.
pub async fn clear_chat_history_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let deleted = clear_messages(&app_state.sqlite_provider.db, &user.0.id).await?;
    info!(user_id = %user.0.id, deleted, "Cleared chat history");

    Ok(Json(json!({
        "success": true,
        "message": "Chat history cleared successfully",
    })))
}

/// `POST /trainer/whisper`: transcribes a recorded answer. Real
/// transcription with a timeout; failure degrades to placeholder text plus
/// an error code rather than a 5xx.
pub async fn whisper_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = read_form(multipart).await?;
    let (file_name, bytes) = form
        .file
        .ok_or_else(|| AppError::Validation("No file".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Empty audio file".to_string()));
    }

    match app_state.transcriber.transcribe(&file_name, bytes).await {
        Ok(text) => Ok(Json(json!({ "text": text, "error_code": null }))),
        Err(e) if e.is_provider_failure() => {
            warn!(user_id = %user.0.id, "Transcription failed: {e}");
            Ok(Json(json!({
                "text": WHISPER_FALLBACK_TEXT,
                "error_code": provider_error_code(&e),
            })))
        }
        Err(e) => Err(e.into()),
    }
}
