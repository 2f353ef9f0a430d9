//! # Trend Route Handlers
//!
//! Cross-entity trend analysis over a user's recent transcripts, training
//! blobs, and insights. Reads run the analysis through the model and cache
//! the report; a provider or parse failure degrades to the neutral empty
//! report so the dashboard never breaks on an upstream hiccup.

use super::provider_error_code;
use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{extract::State, Json};
use chrono::Utc;
use coachvoice::{
    analysis::{parse_structured, GeneratedInsight, TrendReport},
    prompts::tasks::insight_generation_user_prompt,
    trends::{build_trend_prompt, cache_trend_report, clear_trend_cache, gather_trend_inputs},
    AssistantError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

/// `GET /trends`: gathers recent data, runs trend analysis, caches and
/// returns the report.
pub async fn get_trends_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let db = &app_state.sqlite_provider.db;
    let inputs = gather_trend_inputs(db, &user.0.id).await?;
    info!(
        user_id = %user.0.id,
        transcripts = inputs.transcripts.len(),
        blobs = inputs.blobs.len(),
        insights = inputs.insights.len(),
        "Running trend analysis"
    );

    let task = app_state.task("trend_analysis")?;
    let provider = app_state.provider_for(task)?;

    let report_result: Result<TrendReport, AssistantError> = provider
        .generate(&task.system_prompt, &build_trend_prompt(&inputs), task.temperature)
        .await
        .and_then(|raw| parse_structured(&raw));

    let (report, error_code) = match report_result {
        Ok(report) => {
            // Only genuine reports are cached; a fallback would poison the
            // cache with an empty result.
            cache_trend_report(db, &user.0.id, &serde_json::to_string(&report)?).await?;
            (report, None)
        }
        Err(e) if e.is_provider_failure() => {
            warn!(user_id = %user.0.id, "Trend analysis failed: {e}");
            (TrendReport::default(), Some(provider_error_code(&e)))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(json!({
        "trends": report,
        "error_code": error_code,
        "metadata": {
            "transcripts_analyzed": inputs.transcripts.len(),
            "training_data_points": inputs.blobs.len(),
            "insights_processed": inputs.insights.len(),
            "analysis_date": Utc::now().to_rfc3339(),
        },
    })))
}

#[derive(Deserialize)]
pub struct TrendActionRequest {
    pub action: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// `POST /trends`: action dispatch. `generate_insight` turns trend data
/// into one actionable insight; `update_trends` clears the cached reports
/// so the next read re-analyzes.
pub async fn post_trends_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<TrendActionRequest>,
) -> Result<Json<Value>, AppError> {
    let db = &app_state.sqlite_provider.db;

    match payload.action.as_str() {
        "generate_insight" => {
            let data = payload
                .data
                .ok_or_else(|| AppError::Validation("Trend data required".to_string()))?;

            let task = app_state.task("insight_generation")?;
            let provider = app_state.provider_for(task)?;

            let raw = provider
                .generate(
                    &task.system_prompt,
                    &insight_generation_user_prompt(&serde_json::to_string_pretty(&data)?),
                    task.temperature,
                )
                .await?;
            let insight: GeneratedInsight = parse_structured(&raw)?;

            Ok(Json(json!({ "insight": insight })))
        }
        "update_trends" => {
            let cleared = clear_trend_cache(db, &user.0.id).await?;
            info!(user_id = %user.0.id, cleared, "Cleared trend cache");
            Ok(Json(json!({
                "trends": { "message": "Trend analysis refreshed" },
            })))
        }
        _ => Err(AppError::Validation("Invalid action".to_string())),
    }
}
