use thiserror::Error;

/// Custom error types for the application.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Failed to build HTTP client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Request to AI provider failed: {0}")]
    AiRequest(reqwest::Error),
    #[error("AI provider timed out")]
    AiTimeout,
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("Request to account provider failed: {0}")]
    AccountRequest(reqwest::Error),
    #[error("Account provider returned an error: {0}")]
    AccountApi(String),
    #[error("Structured response parse failed: {0}")]
    AnalysisParse(String),
    #[error("Question index {0} is out of range (1..={max})", max = crate::questions::QUESTION_COUNT)]
    QuestionIndexOutOfRange(u32),
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Failed to serialize result: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl From<turso::Error> for AssistantError {
    fn from(err: turso::Error) -> Self {
        AssistantError::StorageOperationFailed(err.to_string())
    }
}

impl AssistantError {
    /// Whether this error came from the external AI provider (as opposed to
    /// local storage or input validation). Callers use this to decide when a
    /// safe fallback response is appropriate.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            AssistantError::AiRequest(_)
                | AssistantError::AiTimeout
                | AssistantError::AiApi(_)
                | AssistantError::AiDeserialization(_)
                | AssistantError::AnalysisParse(_)
        )
    }
}
