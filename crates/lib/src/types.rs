//! Shared domain types for the training pipeline.

use serde::{Deserialize, Serialize};

/// One stored questionnaire answer for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// 1-based question index.
    pub question_index: u32,
    pub answer: String,
    pub updated_at: String,
}

/// The two kinds of voice blob a user accumulates. They share one version
/// space per user: commits increment it, uploads only record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobKind {
    /// A committed Q&A training session.
    Qa,
    /// A raw transcript upload.
    Upload,
}

impl BlobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobKind::Qa => "qa",
            BlobKind::Upload => "upload",
        }
    }
}

/// An immutable, versioned knowledge artifact. Append-only: rows are never
/// updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceBlob {
    pub id: String,
    pub user_id: String,
    pub kind: BlobKind,
    pub content: String,
    pub version: i64,
    pub created_at: String,
}
