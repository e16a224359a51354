use db::{DbErr, DbService};
use server::{AppState, http};
use services::services::ai::AiService;
use services::services::auth::{AuthMode, AuthService};
use services::services::config::{Config, ConfigError};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn build_auth(config: &Config) -> Result<AuthService, ConfigError> {
    if let Some(project_id) = config.firebase_project_id.clone() {
        return Ok(AuthService::new(AuthMode::Firebase { project_id }));
    }
    #[cfg(feature = "dev-auth")]
    {
        tracing::warn!("FIREBASE_PROJECT_ID not set; running with development auth");
        Ok(AuthService::new(AuthMode::Development))
    }
    #[cfg(not(feature = "dev-auth"))]
    {
        Err(ConfigError::Missing("FIREBASE_PROJECT_ID"))
    }
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},db={level},utils={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(&filter_string)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config = Config::from_env()?;
    let db = DbService::new(&config.database_url).await?;
    let auth = build_auth(&config)?;
    let ai = AiService::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.ai_timeout,
    );
    if !ai.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set; AI endpoints will serve fallback content");
    }

    let state = AppState::new(db, auth, ai);
    let app = http::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
}
