//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for
//! `coachvoice-server`, split into logical sub-modules by surface area
//! (license, trainer, chat, projects, ...).

pub mod chat;
pub mod dashboard;
pub mod general;
pub mod license;
pub mod projects;
pub mod trainer;
pub mod transcripts;
pub mod trends;
pub mod upload;

// Re-export all handlers from the sub-modules to make them easily
// accessible to the router under a single `handlers::` path.
pub use chat::*;
pub use dashboard::*;
pub use general::*;
pub use license::*;
pub use projects::*;
pub use trainer::*;
pub use transcripts::*;
pub use trends::*;
pub use upload::*;

// Shared items used by multiple handler modules.
use crate::errors::AppError;
use axum::extract::Multipart;
use coachvoice::AssistantError;
use std::collections::HashMap;

/// The machine-readable code attached to responses that substituted a safe
/// fallback for a provider failure.
pub(crate) fn provider_error_code(err: &AssistantError) -> &'static str {
    match err {
        AssistantError::AiTimeout => "provider_timeout",
        AssistantError::AnalysisParse(_) => "provider_parse_error",
        _ => "provider_unavailable",
    }
}

/// A fully drained multipart form: text fields by name, plus at most one
/// uploaded file.
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    pub file: Option<(String, Vec<u8>)>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn text_or(&self, name: &str, default: &'static str) -> String {
        match self.text(name) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }
}

/// Drains a multipart body into `FormData`. A malformed body is a
/// validation error, surfaced before any write.
pub(crate) async fn read_form(mut multipart: Multipart) -> Result<FormData, AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload.bin").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?;
            file = Some((file_name, bytes.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?;
            fields.insert(name, value);
        }
    }

    Ok(FormData { fields, file })
}
