//! # Trend Analysis Inputs & Cache
//!
//! Gathers the cross-entity data fed into trend analysis (recent
//! transcripts with their analyses, voice blobs, and insights), renders the
//! prompt sections, and manages the cached reports.

use crate::{
    errors::AssistantError,
    projects::{recent_insights_for_user, recent_transcripts_for_user, ProjectInsight,
               TranscriptWithAnalysis},
    prompts::tasks::{trend_analysis_user_prompt, TREND_EXCERPT_CHAR_LIMIT},
    text::truncate_chars,
    trainer::knowledge::list_recent_blobs,
    types::VoiceBlob,
};
use turso::{params, Database};
use uuid::Uuid;

pub const TREND_TRANSCRIPT_LIMIT: u32 = 50;
pub const TREND_BLOB_LIMIT: u32 = 20;
pub const TREND_INSIGHT_LIMIT: u32 = 30;

#[derive(Debug)]
pub struct TrendInputs {
    pub transcripts: Vec<TranscriptWithAnalysis>,
    pub blobs: Vec<VoiceBlob>,
    pub insights: Vec<ProjectInsight>,
}

/// Fetches the bounded windows of recent data the trend task analyzes.
pub async fn gather_trend_inputs(
    db: &Database,
    user_id: &str,
) -> Result<TrendInputs, AssistantError> {
    let transcripts = recent_transcripts_for_user(db, user_id, TREND_TRANSCRIPT_LIMIT).await?;
    let blobs = list_recent_blobs(db, user_id, TREND_BLOB_LIMIT).await?;
    let insights = recent_insights_for_user(db, user_id, TREND_INSIGHT_LIMIT).await?;
    Ok(TrendInputs {
        transcripts,
        blobs,
        insights,
    })
}

/// Renders the gathered data into the trend-analysis user prompt. Each
/// transcript and training excerpt is clipped so the whole window fits one
/// request.
pub fn build_trend_prompt(inputs: &TrendInputs) -> String {
    let transcript_sections = inputs
        .transcripts
        .iter()
        .map(|t| {
            format!(
                "Date: {}\nContent: {}...",
                t.transcript.call_date,
                truncate_chars(&t.transcript.content, TREND_EXCERPT_CHAR_LIMIT)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let training_sections = inputs
        .blobs
        .iter()
        .map(|b| {
            format!(
                "Version: {}\nContent: {}...",
                b.version,
                truncate_chars(&b.content, TREND_EXCERPT_CHAR_LIMIT)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let insight_lines = inputs
        .insights
        .iter()
        .map(|i| format!("{}: {} - {}", i.insight_type, i.title, i.description))
        .collect::<Vec<_>>()
        .join("\n");

    trend_analysis_user_prompt(&transcript_sections, &training_sections, &insight_lines)
}

/// Stores a serialized trend report for later reuse.
pub async fn cache_trend_report(
    db: &Database,
    user_id: &str,
    report_json: &str,
) -> Result<(), AssistantError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO trend_analyses (id, user_id, analysis_data) VALUES (?, ?, ?)",
        params![Uuid::new_v4().to_string(), user_id, report_json],
    )
    .await?;
    Ok(())
}

/// Drops every cached report for the user; the next read re-analyzes.
pub async fn clear_trend_cache(db: &Database, user_id: &str) -> Result<u64, AssistantError> {
    let conn = db.connect()?;
    let deleted = conn
        .execute(
            "DELETE FROM trend_analyses WHERE user_id = ?",
            params![user_id],
        )
        .await?;
    Ok(deleted)
}
