//! # SQLite Schema
//!
//! This module centralizes the schema DDL for the SQLite provider. Every
//! statement is idempotent so the full list can run on every startup.

/// All table and index creation statements, in dependency order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        license_key TEXT NOT NULL UNIQUE,
        external_account_id TEXT,
        display_name TEXT,
        email TEXT,
        avatar_url TEXT,
        last_trained_at TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS training_answers (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        question_index INTEGER NOT NULL,
        answer TEXT NOT NULL DEFAULT '',
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (user_id, question_index)
    );",
    "CREATE TABLE IF NOT EXISTS voice_blobs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        content TEXT NOT NULL,
        version INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    // Commits must never reuse a version number for a user; uploads share
    // the version space but are allowed to repeat the current value.
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_voice_blobs_qa_version
        ON voice_blobs (user_id, version) WHERE kind = 'qa';",
    "CREATE TABLE IF NOT EXISTS message_log (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        client_name TEXT,
        client_email TEXT,
        start_date TEXT,
        end_date TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS milestones (
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        due_date TEXT,
        completed_at TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS transcripts (
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        call_date TEXT NOT NULL,
        duration_minutes INTEGER,
        participants TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS transcript_analyses (
        id TEXT PRIMARY KEY,
        transcript_id TEXT NOT NULL UNIQUE,
        summary TEXT NOT NULL,
        key_points TEXT NOT NULL,
        pain_points TEXT NOT NULL,
        opportunities TEXT NOT NULL,
        action_items TEXT NOT NULL,
        sentiment TEXT NOT NULL,
        confidence REAL NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS project_insights (
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL,
        type TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        severity TEXT NOT NULL DEFAULT 'medium',
        status TEXT NOT NULL DEFAULT 'open',
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS trend_analyses (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        analysis_data TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE INDEX IF NOT EXISTS idx_voice_blobs_user ON voice_blobs (user_id);",
    "CREATE INDEX IF NOT EXISTS idx_training_answers_user ON training_answers (user_id);",
    "CREATE INDEX IF NOT EXISTS idx_message_log_user ON message_log (user_id);",
    "CREATE INDEX IF NOT EXISTS idx_projects_user ON projects (user_id);",
    "CREATE INDEX IF NOT EXISTS idx_milestones_project ON milestones (project_id);",
    "CREATE INDEX IF NOT EXISTS idx_transcripts_project ON transcripts (project_id);",
    "CREATE INDEX IF NOT EXISTS idx_project_insights_project ON project_insights (project_id);",
];
