//! # Transcript Route Handlers
//!
//! Transcript creation plus its best-effort secondary flow: AI analysis and
//! insight generation. The analysis adapter returns an explicit `Result`;
//! this handler decides that a provider failure degrades to the neutral
//! fallback analysis while any persistence failure is logged and dropped,
//! so transcript creation itself always succeeds.

use super::read_form;
use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    extract::{Multipart, State},
    Json,
};
use coachvoice::{
    analysis::{parse_structured, TranscriptAnalysis, DEFAULT_ANALYSIS_CONFIDENCE},
    projects::{create_insight, create_transcript, project_owned, store_analysis, NewTranscript},
    prompts::tasks::transcript_analysis_user_prompt,
    AssistantError,
};
use serde_json::{json, Value};
use tracing::{info, warn};

async fn persist_analysis(
    app_state: &AppState,
    project_id: &str,
    transcript_id: &str,
    analysis: &TranscriptAnalysis,
) -> Result<(), AssistantError> {
    let db = &app_state.sqlite_provider.db;
    store_analysis(db, transcript_id, analysis, DEFAULT_ANALYSIS_CONFIDENCE).await?;

    // One insight per pain point and per opportunity found.
    for pain_point in &analysis.pain_points {
        create_insight(
            db,
            project_id,
            "bottleneck",
            &format!("Pain Point: {pain_point}"),
            &format!("Identified from success team call: {pain_point}"),
            "medium",
        )
        .await?;
    }
    for opportunity in &analysis.opportunities {
        create_insight(
            db,
            project_id,
            "opportunity",
            &format!("Opportunity: {opportunity}"),
            &format!("Identified from success team call: {opportunity}"),
            "medium",
        )
        .await?;
    }
    Ok(())
}

/// `POST /transcripts`: creates a transcript under a project the caller
/// owns, then triggers analysis and insight generation best-effort.
pub async fn create_transcript_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = read_form(multipart).await?;

    let project_id = form.text("project_id").unwrap_or_default().to_string();
    let title = form.text("title").unwrap_or_default().to_string();
    let content = form.text("content").unwrap_or_default().to_string();
    if project_id.is_empty() || title.is_empty() || content.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let call_date = form.text("call_date").filter(|s| !s.is_empty()).map(String::from);
    let duration_minutes = form
        .text("duration")
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|&d| d > 0);
    let participants = form
        .text("participants")
        .filter(|s| !s.is_empty())
        .map(String::from);

    let db = &app_state.sqlite_provider.db;
    if !project_owned(db, &user.0.id, &project_id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    let transcript = create_transcript(
        db,
        &project_id,
        &NewTranscript {
            title,
            content: content.clone(),
            call_date,
            duration_minutes,
            participants,
        },
    )
    .await?;
    info!(user_id = %user.0.id, transcript_id = %transcript.id, "Created transcript");

    // Best-effort analysis: a provider failure degrades to the neutral
    // fallback, and nothing on this path can fail the request.
    let task = app_state.task("transcript_analysis")?;
    let provider = app_state.provider_for(task)?;
    let analysis_result: Result<TranscriptAnalysis, AssistantError> = provider
        .generate(
            &task.system_prompt,
            &transcript_analysis_user_prompt(&content),
            task.temperature,
        )
        .await
        .and_then(|raw| parse_structured(&raw));
    let analysis = match analysis_result {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(transcript_id = %transcript.id, "Transcript analysis failed: {e}");
            TranscriptAnalysis::fallback()
        }
    };
    if let Err(e) = persist_analysis(&app_state, &project_id, &transcript.id, &analysis).await {
        warn!(transcript_id = %transcript.id, "Failed to persist analysis: {e}");
    }

    Ok(Json(json!({
        "success": true,
        "transcript_id": transcript.id,
        "message": "Transcript uploaded and analyzed successfully",
    })))
}
