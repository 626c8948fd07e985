use crate::llm::LlmConfig;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Process configuration, resolved once at startup from environment
/// variables. Empty-string values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub port: u16,
    pub github_token: Option<String>,
    pub llm: LlmConfig,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env_var("PORT")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let llm = LlmConfig {
            api_key: env_var("OPENROUTER_API_KEY"),
            model: env_var("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: crate::llm::DEFAULT_ENDPOINT.to_string(),
            site_url: env_var("OPENROUTER_SITE_URL"),
            app_name: env_var("OPENROUTER_APP_NAME"),
        };

        Self {
            port,
            github_token: env_var("GITHUB_TOKEN"),
            llm,
            cors_origins: parse_cors_origins(&env_var("CORS_ORIGIN").unwrap_or_default()),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Splits a comma-separated origin list, normalizing each entry.
pub fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_origin)
        .filter(|origin| !origin.is_empty())
        .collect()
}

/// Trims whitespace and trailing slashes so configured origins and request
/// `Origin` headers compare equal.
pub fn normalize_origin(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}
