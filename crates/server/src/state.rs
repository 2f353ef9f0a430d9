//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the
//! logic for building it at startup. The `AppState` holds all shared
//! resources, such as the configuration, database provider, and
//! instantiated AI provider clients, making them accessible to all request
//! handlers.

use crate::config::AppConfig;
use coachvoice::providers::{
    account::AccountClient,
    ai::{openai::OpenAiProvider, whisper::WhisperProvider, AiProvider, Transcription},
    db::sqlite::SqliteProvider,
};
use std::{collections::HashMap, sync::Arc};

/// A fully resolved task configuration with non-optional fields.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    pub provider: String,
    pub system_prompt: String,
    pub temperature: f32,
}

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// A map of fully resolved tasks, ready for use by handlers.
    pub tasks: Arc<HashMap<String, ResolvedTask>>,
    /// The primary database provider.
    pub sqlite_provider: Arc<SqliteProvider>,
    /// A map of instantiated AI providers, keyed by their name from the config.
    pub ai_providers: Arc<HashMap<String, Box<dyn AiProvider>>>,
    /// The speech-to-text provider.
    pub transcriber: Arc<Box<dyn Transcription>>,
    /// Client for the external account provider; `None` disables linking.
    pub account_client: Option<Arc<AccountClient>>,
}

impl AppState {
    /// Resolves a task by name; a missing task is a server misconfiguration.
    pub fn task(&self, name: &str) -> anyhow::Result<&ResolvedTask> {
        self.tasks
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Task '{name}' not found in config"))
    }

    /// The AI provider a resolved task is configured to use.
    pub fn provider_for(&self, task: &ResolvedTask) -> anyhow::Result<&dyn AiProvider> {
        self.ai_providers
            .get(&task.provider)
            .map(|provider| provider.as_ref())
            .ok_or_else(|| anyhow::anyhow!("Provider '{}' not found", task.provider))
    }
}

/// Builds the shared application state from the configuration.
///
/// This function instantiates an AI provider client for each entry in the
/// `providers` section, the transcription client, the optional account
/// client, and the SQLite provider, and ensures the schema is up to date.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let mut ai_providers: HashMap<String, Box<dyn AiProvider>> = HashMap::new();
    for (name, provider_config) in &config.providers {
        let provider: Box<dyn AiProvider> = match provider_config.provider.as_str() {
            "openai" => {
                let api_url = provider_config.api_url.clone().ok_or_else(|| {
                    anyhow::anyhow!("api_url is required for openai provider '{name}'")
                })?;
                Box::new(OpenAiProvider::new(
                    api_url,
                    provider_config.api_key.clone(),
                    Some(provider_config.model_name.clone()),
                )?)
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported AI provider type '{}' for provider '{}'",
                    provider_config.provider,
                    name
                ));
            }
        };
        ai_providers.insert(name.clone(), provider);
    }

    // Resolve all tasks. The config loading layers programmatic defaults
    // underneath the file, so every default task arrives fully populated; a
    // failure here means a malformed config file.
    let mut resolved_tasks = HashMap::new();
    for (name, task_config) in &config.tasks {
        let provider = task_config.provider.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'provider' field")
        })?;
        let system_prompt = task_config.system_prompt.clone().unwrap_or_default();
        let temperature = task_config.temperature.ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'temperature' field")
        })?;

        resolved_tasks.insert(
            name.clone(),
            ResolvedTask {
                provider,
                system_prompt,
                temperature,
            },
        );
    }

    let transcriber: Box<dyn Transcription> = Box::new(WhisperProvider::new(
        config.transcription.api_url.clone(),
        config.transcription.api_key.clone(),
        config.transcription.model_name.clone(),
    )?);

    let account_client = match &config.account_api_url {
        Some(url) => Some(Arc::new(AccountClient::new(url.clone())?)),
        None => None,
    };

    let sqlite_provider = SqliteProvider::new(&config.db_url).await?;
    tracing::info!(db_path = %config.db_url, "Initialized local storage provider (SQLite).");
    // Ensure the database schema is up-to-date on startup.
    sqlite_provider.initialize_schema().await?;

    Ok(AppState {
        config: Arc::new(config),
        tasks: Arc::new(resolved_tasks),
        sqlite_provider: Arc::new(sqlite_provider),
        ai_providers: Arc::new(ai_providers),
        transcriber: Arc::new(transcriber),
        account_client,
    })
}
