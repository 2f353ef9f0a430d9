//! # Projects, Transcripts & Insights
//!
//! Plain CRUD over the client-project records a coach manages. Every query
//! is scoped by the owning user id at the SQL boundary; project-owned rows
//! (milestones, transcripts, insights) are reached through a subquery on
//! `projects.user_id`, so a row belonging to another user is
//! indistinguishable from one that does not exist.

use crate::{analysis::TranscriptAnalysis, errors::AssistantError};
use serde::{Deserialize, Serialize};
use turso::{params, Database, Row};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub content: String,
    pub call_date: String,
    pub duration_minutes: Option<i64>,
    pub participants: Option<String>,
    pub created_at: String,
}

/// A stored analysis, with the JSON list columns decoded.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptAnalysisRecord {
    pub id: String,
    pub transcript_id: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub pain_points: Vec<String>,
    pub opportunities: Vec<String>,
    pub action_items: Vec<String>,
    pub sentiment: String,
    pub confidence: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptWithAnalysis {
    #[serde(flatten)]
    pub transcript: Transcript,
    pub analysis: Option<TranscriptAnalysisRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectInsight {
    pub id: String,
    pub project_id: String,
    #[serde(rename = "type")]
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProjectCounts {
    pub milestones: usize,
    pub transcripts: usize,
    pub insights: usize,
}

/// A project with all of its owned records, as returned by list/get.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub milestones: Vec<Milestone>,
    pub transcripts: Vec<TranscriptWithAnalysis>,
    pub insights: Vec<ProjectInsight>,
    pub counts: ProjectCounts,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMilestone {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub milestones: Vec<NewMilestone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTranscript {
    pub title: String,
    pub content: String,
    pub call_date: Option<String>,
    pub duration_minutes: Option<i64>,
    pub participants: Option<String>,
}

fn optional_text(row: &Row, index: usize) -> Result<Option<String>, AssistantError> {
    match row.get_value(index)? {
        turso::Value::Text(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn text_or_null(value: &Option<String>) -> turso::Value {
    match value {
        Some(s) => turso::Value::Text(s.clone()),
        None => turso::Value::Null,
    }
}

fn integer_or_null(value: Option<i64>) -> turso::Value {
    match value {
        Some(i) => turso::Value::Integer(i),
        None => turso::Value::Null,
    }
}

fn optional_integer(row: &Row, index: usize) -> Result<Option<i64>, AssistantError> {
    match row.get_value(index)? {
        turso::Value::Integer(i) => Ok(Some(i)),
        _ => Ok(None),
    }
}

fn json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

const PROJECT_COLUMNS: &str = "id, user_id, name, description, status, client_name, \
                               client_email, start_date, end_date, created_at, updated_at";

fn project_from_row(row: &Row) -> Result<Project, AssistantError> {
    Ok(Project {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: optional_text(row, 3)?,
        status: row.get(4)?,
        client_name: optional_text(row, 5)?,
        client_email: optional_text(row, 6)?,
        start_date: optional_text(row, 7)?,
        end_date: optional_text(row, 8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn milestone_from_row(row: &Row) -> Result<Milestone, AssistantError> {
    Ok(Milestone {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: optional_text(row, 3)?,
        status: row.get(4)?,
        due_date: optional_text(row, 5)?,
        completed_at: optional_text(row, 6)?,
        created_at: row.get(7)?,
    })
}

fn transcript_from_row(row: &Row) -> Result<Transcript, AssistantError> {
    Ok(Transcript {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        call_date: row.get(4)?,
        duration_minutes: optional_integer(row, 5)?,
        participants: optional_text(row, 6)?,
        created_at: row.get(7)?,
    })
}

fn analysis_from_row(row: &Row) -> Result<TranscriptAnalysisRecord, AssistantError> {
    let key_points: String = row.get(3)?;
    let pain_points: String = row.get(4)?;
    let opportunities: String = row.get(5)?;
    let action_items: String = row.get(6)?;
    Ok(TranscriptAnalysisRecord {
        id: row.get(0)?,
        transcript_id: row.get(1)?,
        summary: row.get(2)?,
        key_points: json_list(&key_points),
        pain_points: json_list(&pain_points),
        opportunities: json_list(&opportunities),
        action_items: json_list(&action_items),
        sentiment: row.get(7)?,
        confidence: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn insight_from_row(row: &Row) -> Result<ProjectInsight, AssistantError> {
    Ok(ProjectInsight {
        id: row.get(0)?,
        project_id: row.get(1)?,
        insight_type: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        severity: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const MILESTONE_COLUMNS: &str =
    "id, project_id, title, description, status, due_date, completed_at, created_at";
const TRANSCRIPT_COLUMNS: &str =
    "id, project_id, title, content, call_date, duration_minutes, participants, created_at";
const ANALYSIS_COLUMNS: &str = "id, transcript_id, summary, key_points, pain_points, \
                                opportunities, action_items, sentiment, confidence, created_at";
const INSIGHT_COLUMNS: &str =
    "id, project_id, type, title, description, severity, status, created_at";

/// Returns whether a project exists *and* belongs to the user. The two
/// conditions are deliberately indistinguishable to callers.
pub async fn project_owned(
    db: &Database,
    user_id: &str,
    project_id: &str,
) -> Result<bool, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT 1 FROM projects WHERE id = ? AND user_id = ?",
            params![project_id, user_id],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

pub async fn create_project(
    db: &Database,
    user_id: &str,
    new: &NewProject,
) -> Result<ProjectDetail, AssistantError> {
    let conn = db.connect()?;
    let project_id = Uuid::new_v4().to_string();

    let values: Vec<turso::Value> = vec![
        turso::Value::Text(project_id.clone()),
        turso::Value::Text(user_id.to_string()),
        turso::Value::Text(new.name.clone()),
        text_or_null(&new.description),
        text_or_null(&new.client_name),
        text_or_null(&new.client_email),
    ];
    conn.execute(
        "INSERT INTO projects (id, user_id, name, description, client_name, client_email, start_date) \
         VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
        values,
    )
    .await?;

    for milestone in &new.milestones {
        let values: Vec<turso::Value> = vec![
            turso::Value::Text(Uuid::new_v4().to_string()),
            turso::Value::Text(project_id.clone()),
            turso::Value::Text(milestone.title.clone()),
            text_or_null(&milestone.description),
            text_or_null(&milestone.due_date),
        ];
        conn.execute(
            "INSERT INTO milestones (id, project_id, title, description, due_date) \
             VALUES (?, ?, ?, ?, ?)",
            values,
        )
        .await?;
    }

    get_project(db, user_id, &project_id).await?.ok_or_else(|| {
        AssistantError::StorageOperationFailed("created project disappeared before readback".into())
    })
}

async fn load_milestones(db: &Database, project_id: &str) -> Result<Vec<Milestone>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {MILESTONE_COLUMNS} FROM milestones \
                 WHERE project_id = ? ORDER BY created_at ASC, rowid ASC"
            ),
            params![project_id],
        )
        .await?;
    let mut milestones = Vec::new();
    while let Some(row) = rows.next().await? {
        milestones.push(milestone_from_row(&row)?);
    }
    Ok(milestones)
}

async fn load_transcripts(
    db: &Database,
    project_id: &str,
) -> Result<Vec<TranscriptWithAnalysis>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {TRANSCRIPT_COLUMNS} FROM transcripts \
                 WHERE project_id = ? ORDER BY created_at DESC, rowid DESC"
            ),
            params![project_id],
        )
        .await?;

    let mut transcripts = Vec::new();
    while let Some(row) = rows.next().await? {
        transcripts.push(transcript_from_row(&row)?);
    }

    let mut detailed = Vec::with_capacity(transcripts.len());
    for transcript in transcripts {
        let analysis = load_analysis(db, &transcript.id).await?;
        detailed.push(TranscriptWithAnalysis {
            transcript,
            analysis,
        });
    }
    Ok(detailed)
}

pub async fn load_analysis(
    db: &Database,
    transcript_id: &str,
) -> Result<Option<TranscriptAnalysisRecord>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!("SELECT {ANALYSIS_COLUMNS} FROM transcript_analyses WHERE transcript_id = ?"),
            params![transcript_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(analysis_from_row(&row)?)),
        None => Ok(None),
    }
}

async fn load_insights(
    db: &Database,
    project_id: &str,
) -> Result<Vec<ProjectInsight>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {INSIGHT_COLUMNS} FROM project_insights \
                 WHERE project_id = ? ORDER BY created_at DESC, rowid DESC"
            ),
            params![project_id],
        )
        .await?;
    let mut insights = Vec::new();
    while let Some(row) = rows.next().await? {
        insights.push(insight_from_row(&row)?);
    }
    Ok(insights)
}

async fn assemble_detail(db: &Database, project: Project) -> Result<ProjectDetail, AssistantError> {
    let milestones = load_milestones(db, &project.id).await?;
    let transcripts = load_transcripts(db, &project.id).await?;
    let insights = load_insights(db, &project.id).await?;
    let counts = ProjectCounts {
        milestones: milestones.len(),
        transcripts: transcripts.len(),
        insights: insights.len(),
    };
    Ok(ProjectDetail {
        project,
        milestones,
        transcripts,
        insights,
        counts,
    })
}

/// All projects owned by the user, most recently updated first.
pub async fn list_projects(
    db: &Database,
    user_id: &str,
) -> Result<Vec<ProjectDetail>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {PROJECT_COLUMNS} FROM projects \
                 WHERE user_id = ? ORDER BY updated_at DESC, rowid DESC"
            ),
            params![user_id],
        )
        .await?;

    let mut projects = Vec::new();
    while let Some(row) = rows.next().await? {
        projects.push(project_from_row(&row)?);
    }

    let mut details = Vec::with_capacity(projects.len());
    for project in projects {
        details.push(assemble_detail(db, project).await?);
    }
    Ok(details)
}

/// One project by id, scoped to the user; `None` covers both "absent" and
/// "not yours".
pub async fn get_project(
    db: &Database,
    user_id: &str,
    project_id: &str,
) -> Result<Option<ProjectDetail>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ? AND user_id = ?"),
            params![project_id, user_id],
        )
        .await?;

    match rows.next().await? {
        Some(row) => Ok(Some(assemble_detail(db, project_from_row(&row)?).await?)),
        None => Ok(None),
    }
}

/// Applies a partial update; returns false when the project is absent or
/// not owned by the user.
pub async fn update_project(
    db: &Database,
    user_id: &str,
    project_id: &str,
    update: &ProjectUpdate,
) -> Result<bool, AssistantError> {
    let conn = db.connect()?;

    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<turso::Value> = Vec::new();
    if let Some(name) = &update.name {
        assignments.push("name = ?");
        values.push(name.clone().into());
    }
    if let Some(description) = &update.description {
        assignments.push("description = ?");
        values.push(description.clone().into());
    }
    if let Some(status) = &update.status {
        assignments.push("status = ?");
        values.push(status.clone().into());
    }
    if let Some(client_name) = &update.client_name {
        assignments.push("client_name = ?");
        values.push(client_name.clone().into());
    }
    if let Some(client_email) = &update.client_email {
        assignments.push("client_email = ?");
        values.push(client_email.clone().into());
    }
    if let Some(end_date) = &update.end_date {
        assignments.push("end_date = ?");
        values.push(end_date.clone().into());
    }
    assignments.push("updated_at = CURRENT_TIMESTAMP");

    let sql = format!(
        "UPDATE projects SET {} WHERE id = ? AND user_id = ?",
        assignments.join(", ")
    );
    values.push(project_id.to_string().into());
    values.push(user_id.to_string().into());

    let changed = conn.execute(&sql, values).await?;
    Ok(changed > 0)
}

/// Deletes a project and everything it owns; returns false when the project
/// is absent or not owned by the user.
pub async fn delete_project(
    db: &Database,
    user_id: &str,
    project_id: &str,
) -> Result<bool, AssistantError> {
    let conn = db.connect()?;

    let deleted = conn
        .execute(
            "DELETE FROM projects WHERE id = ? AND user_id = ?",
            params![project_id, user_id],
        )
        .await?;
    if deleted == 0 {
        return Ok(false);
    }

    conn.execute(
        "DELETE FROM transcript_analyses WHERE transcript_id IN \
         (SELECT id FROM transcripts WHERE project_id = ?)",
        params![project_id],
    )
    .await?;
    conn.execute(
        "DELETE FROM transcripts WHERE project_id = ?",
        params![project_id],
    )
    .await?;
    conn.execute(
        "DELETE FROM milestones WHERE project_id = ?",
        params![project_id],
    )
    .await?;
    conn.execute(
        "DELETE FROM project_insights WHERE project_id = ?",
        params![project_id],
    )
    .await?;
    Ok(true)
}

/// Inserts a transcript under a project. Ownership of the project must be
/// verified by the caller first.
pub async fn create_transcript(
    db: &Database,
    project_id: &str,
    new: &NewTranscript,
) -> Result<Transcript, AssistantError> {
    let conn = db.connect()?;
    let transcript_id = Uuid::new_v4().to_string();

    let values: Vec<turso::Value> = vec![
        turso::Value::Text(transcript_id.clone()),
        turso::Value::Text(project_id.to_string()),
        turso::Value::Text(new.title.clone()),
        turso::Value::Text(new.content.clone()),
        text_or_null(&new.call_date),
        integer_or_null(new.duration_minutes),
        text_or_null(&new.participants),
    ];
    conn.execute(
        "INSERT INTO transcripts (id, project_id, title, content, call_date, duration_minutes, participants) \
         VALUES (?, ?, ?, ?, COALESCE(?, CURRENT_TIMESTAMP), ?, ?)",
        values,
    )
    .await?;

    let mut rows = conn
        .query(
            &format!("SELECT {TRANSCRIPT_COLUMNS} FROM transcripts WHERE id = ?"),
            params![transcript_id],
        )
        .await?;
    let row = rows.next().await?.ok_or_else(|| {
        AssistantError::StorageOperationFailed(
            "created transcript disappeared before readback".into(),
        )
    })?;
    transcript_from_row(&row)
}

/// Stores the derived analysis for a transcript. At most one analysis per
/// transcript; this is only called right after transcript creation.
pub async fn store_analysis(
    db: &Database,
    transcript_id: &str,
    analysis: &TranscriptAnalysis,
    confidence: f64,
) -> Result<(), AssistantError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO transcript_analyses \
         (id, transcript_id, summary, key_points, pain_points, opportunities, action_items, sentiment, confidence) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            Uuid::new_v4().to_string(),
            transcript_id,
            analysis.summary.clone(),
            serde_json::to_string(&analysis.key_points)?,
            serde_json::to_string(&analysis.pain_points)?,
            serde_json::to_string(&analysis.opportunities)?,
            serde_json::to_string(&analysis.action_items)?,
            analysis.sentiment.clone(),
            confidence
        ],
    )
    .await?;
    Ok(())
}

/// Records one auto-generated insight on a project.
pub async fn create_insight(
    db: &Database,
    project_id: &str,
    insight_type: &str,
    title: &str,
    description: &str,
    severity: &str,
) -> Result<(), AssistantError> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO project_insights (id, project_id, type, title, description, severity) \
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            Uuid::new_v4().to_string(),
            project_id,
            insight_type,
            title,
            description,
            severity
        ],
    )
    .await?;
    Ok(())
}

/// Recent transcripts across every project the user owns, newest first.
pub async fn recent_transcripts_for_user(
    db: &Database,
    user_id: &str,
    limit: u32,
) -> Result<Vec<TranscriptWithAnalysis>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {TRANSCRIPT_COLUMNS} FROM transcripts \
                 WHERE project_id IN (SELECT id FROM projects WHERE user_id = ?) \
                 ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
            ),
            params![user_id],
        )
        .await?;

    let mut transcripts = Vec::new();
    while let Some(row) = rows.next().await? {
        transcripts.push(transcript_from_row(&row)?);
    }

    let mut detailed = Vec::with_capacity(transcripts.len());
    for transcript in transcripts {
        let analysis = load_analysis(db, &transcript.id).await?;
        detailed.push(TranscriptWithAnalysis {
            transcript,
            analysis,
        });
    }
    Ok(detailed)
}

/// Recent insights across every project the user owns, newest first.
pub async fn recent_insights_for_user(
    db: &Database,
    user_id: &str,
    limit: u32,
) -> Result<Vec<ProjectInsight>, AssistantError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {INSIGHT_COLUMNS} FROM project_insights \
                 WHERE project_id IN (SELECT id FROM projects WHERE user_id = ?) \
                 ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
            ),
            params![user_id],
        )
        .await?;

    let mut insights = Vec::new();
    while let Some(row) = rows.next().await? {
        insights.push(insight_from_row(&row)?);
    }
    Ok(insights)
}
