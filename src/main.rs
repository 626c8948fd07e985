use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use repolens::analyzer::Analyzer;
use repolens::api;
use repolens::config::AppConfig;
use repolens::github::GithubClient;
use repolens::llm::LlmClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("repolens=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    if config.llm.api_key.is_none() {
        info!("OPENROUTER_API_KEY not set, explanations will use fallback text");
    }

    let github = GithubClient::new(config.github_token.clone());
    let llm = LlmClient::new(config.llm.clone());
    let analyzer = Arc::new(Analyzer::new(github, llm));
    let app = api::router(analyzer, config.cors_origins.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!(port = config.port, "repolens API listening");
    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
