//! # Application Configuration
//!
//! This module defines the configuration structure for `coachvoice-server`
//! and provides the logic for loading it from a `config.yml` file and
//! environment variables. Task prompts and temperatures have programmatic
//! defaults built from the library's prompt constants, so a minimal config
//! only has to name its providers.

use coachvoice::prompts::tasks::{
    INSIGHT_GENERATION_SYSTEM_PROMPT, PREFILL_SYSTEM_PROMPT, TRANSCRIPT_ANALYSIS_SYSTEM_PROMPT,
    TREND_ANALYSIS_SYSTEM_PROMPT,
};
use config::{
    Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue,
    ValueKind as ConfigValueKind,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Profile endpoint of the external account provider, used for account
    /// linking. Linking is disabled when unset.
    #[serde(default)]
    pub account_api_url: Option<String>,
    /// Configuration for the speech-to-text provider.
    pub transcription: TranscriptionConfig,
    /// A map of named, reusable AI provider configurations.
    pub providers: HashMap<String, ProviderConfig>,
    /// A map of tasks, each specifying a provider, prompt, and temperature.
    pub tasks: HashMap<String, TaskConfig>,
}

fn default_port() -> u16 {
    8080
}

fn default_db_url() -> String {
    "db/coachvoice.db".to_string()
}

/// Configuration for the transcription provider.
#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptionConfig {
    pub api_url: String,
    pub model_name: String,
    pub api_key: Option<String>,
}

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider (currently only "openai"-compatible).
    pub provider: String,
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Defines the prompt and provider for a specific application task.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaskConfig {
    /// The key of the provider to use from the `providers` map.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Constructs a `config::Value` map of the default, hardcoded tasks from
/// the library. This serves as the base layer of configuration.
///
/// The chat task has no static system prompt: its instruction is assembled
/// per request from the persona template and the caller's coach notes.
fn build_default_tasks() -> HashMap<String, ConfigValue> {
    let tasks: Vec<(&str, (&str, &str, f64))> = vec![
        ("chat", ("openai_default", "", 0.6)),
        ("prefill", ("openai_default", PREFILL_SYSTEM_PROMPT, 0.2)),
        (
            "transcript_analysis",
            ("openai_default", TRANSCRIPT_ANALYSIS_SYSTEM_PROMPT, 0.3),
        ),
        (
            "trend_analysis",
            ("openai_default", TREND_ANALYSIS_SYSTEM_PROMPT, 0.3),
        ),
        (
            "insight_generation",
            ("openai_default", INSIGHT_GENERATION_SYSTEM_PROMPT, 0.4),
        ),
    ];

    tasks
        .into_iter()
        .map(|(name, (provider, system_prompt, temperature))| {
            let mut table = HashMap::new();
            table.insert("provider".to_string(), ConfigValue::from(provider));
            table.insert(
                "system_prompt".to_string(),
                ConfigValue::from(system_prompt),
            );
            table.insert("temperature".to_string(), ConfigValue::from(temperature));
            (
                name.to_string(),
                ConfigValue::new(None, ConfigValueKind::Table(table)),
            )
        })
        .collect()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap();
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| "".to_string())
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `COACHVOICE_...` variables
///   (e.g., `COACHVOICE_TRANSCRIPTION__API_URL`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults from the library.
        .set_default("tasks", build_default_tasks())?;

    // Layer 2: Main config file.
    let main_config_path = match config_path_override {
        Some(override_path) => override_path.to_string(),
        None => format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")),
    };

    let main_content = read_and_substitute(&main_config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists."
        ))
    })?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    let settings = builder
        // Layer 3: Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("COACHVOICE")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    info!(
        providers = config.providers.len(),
        tasks = config.tasks.len(),
        "Configuration loaded"
    );
    Ok(config)
}
