//! Raw transcript upload handler.

use super::read_form;
use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    extract::{Multipart, State},
    Json,
};
use coachvoice::trainer::knowledge::store_upload;
use serde_json::{json, Value};
use tracing::info;

/// `POST /train/upload`: stores uploaded text as an `upload` voice blob.
/// The upload participates in the version space but never advances it.
pub async fn upload_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = read_form(multipart).await?;
    let bytes = match form.file {
        Some((_, bytes)) if !bytes.is_empty() => bytes,
        _ => return Err(AppError::Validation("No file".to_string())),
    };

    let text = String::from_utf8_lossy(&bytes).into_owned();
    let blob = store_upload(&app_state.sqlite_provider.db, &user.0.id, &text).await?;
    info!(user_id = %user.0.id, blob_id = %blob.id, "Stored raw upload");

    Ok(Json(json!({ "ok": true, "saved_chars": text.chars().count() })))
}
