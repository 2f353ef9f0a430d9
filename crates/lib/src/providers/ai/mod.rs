pub mod openai;
pub mod whisper;

use crate::errors::AssistantError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::time::Duration;

/// Every call to an external provider carries an explicit deadline; a hung
/// upstream surfaces as `AssistantError::AiTimeout` instead of a stuck
/// request.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// A trait for interacting with an AI chat provider.
///
/// This trait defines a common interface for generating conversational and
/// structured responses from different model backends.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result is the raw text of the model's single reply; structured
    /// tasks parse it afterwards.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, AssistantError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// A trait for speech-to-text providers.
#[async_trait]
pub trait Transcription: Send + Sync + Debug + DynClone {
    /// Transcribes an audio payload to text.
    async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String, AssistantError>;
}

dyn_clone::clone_trait_object!(Transcription);

/// Maps a reqwest failure to the right provider error, keeping timeouts
/// distinct from other transport failures.
pub(crate) fn classify_request_error(err: reqwest::Error) -> AssistantError {
    if err.is_timeout() {
        AssistantError::AiTimeout
    } else {
        AssistantError::AiRequest(err)
    }
}
