//! # Dashboard Route Handler
//!
//! Derived metrics over a user's projects: either a single project's
//! detail with milestone completion and sentiment distribution, or the
//! cross-project overview with recent activity.

use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use coachvoice::projects::{
    get_project, list_projects, recent_insights_for_user, recent_transcripts_for_user,
    ProjectDetail,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Deserialize, Default)]
pub struct DashboardParams {
    pub project_id: Option<String>,
}

const RECENT_ACTIVITY_LIMIT: u32 = 5;

fn completion_rate(completed: usize, total: usize) -> f64 {
    if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

fn project_metrics(detail: &ProjectDetail) -> Value {
    let total_milestones = detail.milestones.len();
    let completed_milestones = detail
        .milestones
        .iter()
        .filter(|m| m.status == "completed")
        .count();
    let open_insights = detail.insights.iter().filter(|i| i.status == "open").count();
    let critical_insights = detail
        .insights
        .iter()
        .filter(|i| i.severity == "critical")
        .count();

    let mut sentiment_counts: Map<String, Value> = Map::new();
    for transcript in &detail.transcripts {
        if let Some(analysis) = &transcript.analysis {
            let count = sentiment_counts
                .entry(analysis.sentiment.clone())
                .or_insert(json!(0));
            *count = json!(count.as_u64().unwrap_or(0) + 1);
        }
    }

    json!({
        "total_milestones": total_milestones,
        "completed_milestones": completed_milestones,
        "completion_rate": completion_rate(completed_milestones, total_milestones),
        "total_transcripts": detail.transcripts.len(),
        "total_insights": detail.insights.len(),
        "open_insights": open_insights,
        "critical_insights": critical_insights,
        "sentiment_counts": sentiment_counts,
    })
}

/// `GET /dashboard[?project_id=]`: project metrics or the overall overview.
pub async fn dashboard_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Value>, AppError> {
    let db = &app_state.sqlite_provider.db;

    if let Some(project_id) = params.project_id {
        let detail = get_project(db, &user.0.id, &project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        let metrics = project_metrics(&detail);
        let mut project = serde_json::to_value(&detail)?;
        project["metrics"] = metrics;
        return Ok(Json(json!({ "project": project })));
    }

    let projects = list_projects(db, &user.0.id).await?;

    let total_projects = projects.len();
    let active_projects = projects
        .iter()
        .filter(|p| p.project.status == "active")
        .count();
    let completed_projects = projects
        .iter()
        .filter(|p| p.project.status == "completed")
        .count();
    let total_milestones: usize = projects.iter().map(|p| p.milestones.len()).sum();
    let completed_milestones: usize = projects
        .iter()
        .map(|p| {
            p.milestones
                .iter()
                .filter(|m| m.status == "completed")
                .count()
        })
        .sum();
    let total_transcripts: usize = projects.iter().map(|p| p.transcripts.len()).sum();
    let total_insights: usize = projects.iter().map(|p| p.insights.len()).sum();
    let critical_insights: usize = projects
        .iter()
        .map(|p| {
            p.insights
                .iter()
                .filter(|i| i.severity == "critical")
                .count()
        })
        .sum();

    let project_summaries: Vec<Value> = projects
        .iter()
        .map(|detail| {
            let metrics = project_metrics(detail);
            serde_json::to_value(detail).map(|mut value| {
                value["metrics"] = metrics;
                value
            })
        })
        .collect::<Result<_, _>>()?;

    let recent_transcripts =
        recent_transcripts_for_user(db, &user.0.id, RECENT_ACTIVITY_LIMIT).await?;
    let recent_insights = recent_insights_for_user(db, &user.0.id, RECENT_ACTIVITY_LIMIT).await?;

    Ok(Json(json!({
        "overview": {
            "total_projects": total_projects,
            "active_projects": active_projects,
            "completed_projects": completed_projects,
            "total_milestones": total_milestones,
            "completed_milestones": completed_milestones,
            "completion_rate": completion_rate(completed_milestones, total_milestones),
            "total_transcripts": total_transcripts,
            "total_insights": total_insights,
            "critical_insights": critical_insights,
        },
        "projects": project_summaries,
        "recent_activity": {
            "transcripts": recent_transcripts,
            "insights": recent_insights,
        },
    })))
}
