use anyhow::Result;
use async_trait::async_trait;
use coachvoice::errors::AssistantError;
use coachvoice::providers::ai::{AiProvider, Transcription};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use turso::Database;

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub db: Database,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let db = turso::Builder::new_local(":memory:").build().await?;
        let conn = db.connect()?;

        // Initialize the schema using the shared SQL constants.
        for statement in coachvoice::providers::db::sqlite::sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }

        Ok(Self { db })
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String, f32)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the system prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String, f32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, AssistantError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((
            system_prompt.to_string(),
            user_prompt.to_string(),
            temperature,
        ));

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if system_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(AssistantError::AiApi(format!(
            "MockAiProvider: No response programmed for system prompt. Got: '{system_prompt}'"
        )))
    }
}

// --- Mock Transcription Provider ---

#[derive(Clone, Debug)]
pub struct MockTranscription {
    result: Arc<Mutex<Option<String>>>,
}

impl MockTranscription {
    pub fn new() -> Self {
        Self {
            result: Arc::new(Mutex::new(None)),
        }
    }

    /// Pre-programs the text every transcription call returns. Without a
    /// programmed result, calls fail like a broken upstream.
    pub fn set_result(&self, text: &str) {
        *self.result.lock().unwrap() = Some(text.to_string());
    }
}

impl Default for MockTranscription {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcription for MockTranscription {
    async fn transcribe(&self, _file_name: &str, _audio: Vec<u8>) -> Result<String, AssistantError> {
        match self.result.lock().unwrap().clone() {
            Some(text) => Ok(text),
            None => Err(AssistantError::AiApi(
                "MockTranscription: no result programmed".to_string(),
            )),
        }
    }
}
