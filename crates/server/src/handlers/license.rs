//! # License Route Handlers
//!
//! Minting a new license key, verifying an existing one, and linking an
//! external account.

use crate::{errors::AppError, state::AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use core_access::{
    find_user, generate_license_key, get_or_create_user, is_valid_license_format,
    link_external_account,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use turso::params;

#[derive(Serialize)]
pub struct CreateLicenseResponse {
    pub success: bool,
    pub license_key: String,
    pub user_id: String,
    pub message: String,
}

/// `POST /license`: mints a fresh key and provisions the account for it.
pub async fn create_license_handler(
    State(app_state): State<AppState>,
) -> Result<Json<CreateLicenseResponse>, AppError> {
    let license_key = generate_license_key();
    let user = get_or_create_user(&app_state.sqlite_provider.db, &license_key).await?;
    info!(user_id = %user.id, "Created new user account");

    Ok(Json(CreateLicenseResponse {
        success: true,
        license_key,
        user_id: user.id,
        message: "New user account created successfully".to_string(),
    }))
}

#[derive(Deserialize)]
pub struct VerifyLicenseParams {
    pub license_key: Option<String>,
}

async fn count_rows(
    db: &turso::Database,
    sql: &str,
    user_id: &str,
) -> Result<i64, AppError> {
    let conn = db.connect().map_err(coachvoice::AssistantError::from)?;
    let mut rows = conn
        .query(sql, params![user_id])
        .await
        .map_err(coachvoice::AssistantError::from)?;
    let row = rows
        .next()
        .await
        .map_err(coachvoice::AssistantError::from)?;
    match row {
        Some(row) => Ok(row.get(0).map_err(coachvoice::AssistantError::from)?),
        None => Ok(0),
    }
}

/// `GET /license?license_key=`: verifies a key and returns the account's
/// profile and aggregate counts. Unlike the authenticated endpoints, this
/// never provisions an account.
pub async fn verify_license_handler(
    State(app_state): State<AppState>,
    Query(params): Query<VerifyLicenseParams>,
) -> Result<Json<Value>, AppError> {
    let license_key = params
        .license_key
        .ok_or_else(|| AppError::Validation("License key required".to_string()))?;

    if !is_valid_license_format(&license_key) {
        return Err(AppError::Unauthorized("Invalid license key".to_string()));
    }

    let db = &app_state.sqlite_provider.db;
    let user = find_user(db, &license_key)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let training_blobs =
        count_rows(db, "SELECT COUNT(*) FROM voice_blobs WHERE user_id = ?", &user.id).await?;
    let projects =
        count_rows(db, "SELECT COUNT(*) FROM projects WHERE user_id = ?", &user.id).await?;
    let answers = count_rows(
        db,
        "SELECT COUNT(*) FROM training_answers WHERE user_id = ?",
        &user.id,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "user": {
            "id": user.id,
            "license_key": user.license_key,
            "email": user.email,
            "created_at": user.created_at,
            "last_trained_at": user.last_trained_at,
            "stats": {
                "training_blobs": training_blobs,
                "projects": projects,
                "answers": answers,
            },
        },
    })))
}

#[derive(Deserialize)]
pub struct LinkAccountRequest {
    pub access_token: String,
}

/// `POST /license/link`: validates an external account token, fetches the
/// profile it belongs to, and upserts the matching user. New accounts get a
/// freshly minted license key; existing ones get their profile refreshed.
pub async fn link_account_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<LinkAccountRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.access_token.is_empty() {
        return Err(AppError::Validation("Account token required".to_string()));
    }

    let account_client = app_state
        .account_client
        .as_ref()
        .ok_or_else(|| AppError::Validation("Account linking is not configured".to_string()))?;

    let profile = account_client.fetch_profile(&payload.access_token).await?;
    let user = link_external_account(&app_state.sqlite_provider.db, &profile).await?;
    info!(user_id = %user.id, external_id = %profile.id, "Linked external account");

    Ok(Json(json!({
        "success": true,
        "user_id": user.id,
        "license_key": user.license_key,
    })))
}
