use std::env;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://planner.db?mode=rwc";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Process configuration, read once at startup from the environment.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub firebase_project_id: Option<String>,
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    pub ai_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid("PORT", e.to_string()))?,
            Err(_) => 8000,
        };
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let firebase_project_id = env::var("FIREBASE_PROJECT_ID").ok().filter(|v| !v.is_empty());
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .map(SecretString::from);
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let ai_timeout_secs = match env::var("AI_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::Invalid("AI_TIMEOUT_SECS", e.to_string()))?,
            Err(_) => DEFAULT_AI_TIMEOUT_SECS,
        };
        Ok(Self {
            host,
            port,
            database_url,
            firebase_project_id,
            openai_api_key,
            openai_model,
            ai_timeout: Duration::from_secs(ai_timeout_secs),
        })
    }
}
