//! Client for the external account provider used when a coach links their
//! hosted account. The provider validates an access token and returns the
//! profile it belongs to; everything else about account management stays on
//! the provider's side.

use crate::{errors::AssistantError, providers::ai::PROVIDER_TIMEOUT};
use core_access::ExternalProfile;
use reqwest::Client as ReqwestClient;

#[derive(Clone, Debug)]
pub struct AccountClient {
    client: ReqwestClient,
    api_url: String,
}

impl AccountClient {
    /// Creates a client pointed at the provider's profile endpoint.
    pub fn new(api_url: String) -> Result<Self, AssistantError> {
        let client = ReqwestClient::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(AssistantError::ReqwestClientBuild)?;
        Ok(Self { client, api_url })
    }

    /// Validates the token by fetching the profile it grants access to.
    /// An invalid or expired token surfaces as `AccountApi`.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, AssistantError> {
        let response = self
            .client
            .get(&self.api_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(AssistantError::AccountRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AssistantError::AccountApi(error_text));
        }

        response
            .json::<ExternalProfile>()
            .await
            .map_err(AssistantError::AccountRequest)
    }
}
