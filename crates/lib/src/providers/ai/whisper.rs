use crate::{
    errors::AssistantError,
    providers::ai::{classify_request_error, Transcription, PROVIDER_TIMEOUT},
};
use async_trait::async_trait;
use reqwest::{multipart, Client as ReqwestClient};
use serde::Deserialize;
use std::fmt::Debug;

#[derive(Deserialize, Debug)]
struct TranscriptionResponse {
    text: String,
}

/// A provider for an OpenAI-compatible audio transcription API.
#[derive(Clone, Debug)]
pub struct WhisperProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl WhisperProvider {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, AssistantError> {
        let client = ReqwestClient::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(AssistantError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Transcription for WhisperProvider {
    async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String, AssistantError> {
        let part = multipart::Part::bytes(audio).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .multipart(form)
            .send()
            .await
            .map_err(classify_request_error)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AssistantError::AiApi(error_text));
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .map_err(AssistantError::AiDeserialization)?;

        Ok(transcription.text)
    }
}
