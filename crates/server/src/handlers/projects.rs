//! # Project Route Handlers
//!
//! CRUD over a coach's client projects. Every operation is scoped to the
//! caller's user id; acting on another user's project returns the same
//! not-found response as acting on a nonexistent one.

use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use coachvoice::projects::{
    create_project, delete_project, get_project, list_projects, update_project, NewProject,
    ProjectUpdate,
};
use serde_json::{json, Value};
use tracing::info;

/// `GET /projects`: all of the caller's projects with nested records.
pub async fn list_projects_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let projects = list_projects(&app_state.sqlite_provider.db, &user.0.id).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// `POST /projects`: creates a project, optionally with initial milestones.
pub async fn create_project_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<NewProject>,
) -> Result<Json<Value>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Project name required".to_string()));
    }

    let project = create_project(&app_state.sqlite_provider.db, &user.0.id, &payload).await?;
    info!(user_id = %user.0.id, project_id = %project.project.id, "Created project");
    Ok(Json(json!({ "project": project })))
}

/// `GET /projects/{id}`: one project with everything it owns.
pub async fn get_project_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let project = get_project(&app_state.sqlite_provider.db, &user.0.id, &project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(Json(json!({ "project": project })))
}

/// `PUT /projects/{id}`: partial update.
pub async fn update_project_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(project_id): Path<String>,
    Json(payload): Json<ProjectUpdate>,
) -> Result<Json<Value>, AppError> {
    let updated =
        update_project(&app_state.sqlite_provider.db, &user.0.id, &project_id, &payload).await?;
    if !updated {
        return Err(AppError::NotFound("Project not found".to_string()));
    }
    Ok(Json(json!({ "success": true })))
}

/// `DELETE /projects/{id}`: removes a project and everything it owns.
pub async fn delete_project_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = delete_project(&app_state.sqlite_provider.db, &user.0.id, &project_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Project not found".to_string()));
    }
    Ok(Json(json!({ "success": true })))
}
