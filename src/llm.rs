//! Client for an OpenRouter-style chat-completions endpoint.
//!
//! The client is soft-disabled when no API key is configured: `generate`
//! reports `Unavailable(NotConfigured)` without touching the network, and
//! callers substitute a fixed fallback string. Request failures degrade the
//! same way; they are never surfaced as errors.

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const TEMPERATURE: f64 = 0.2;

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub site_url: Option<String>,
    pub app_name: Option<String>,
}

/// Why no text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No API key configured; the designed soft-disabled mode.
    NotConfigured,
    /// The endpoint answered non-2xx, the transport failed, or the response
    /// carried no completion text.
    RequestFailed,
}

/// Outcome of one generation call. Callers decide whether to substitute
/// fallback text or propagate the unavailability further.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Text(String),
    Unavailable(UnavailableReason),
}

impl Generation {
    /// The trimmed completion text, or `fallback` when unavailable.
    pub fn text_or(self, fallback: &str) -> String {
        match self {
            Generation::Text(text) => text.trim().to_string(),
            Generation::Unavailable(_) => fallback.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Generation::Text(_))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Sends one prompt as a single user turn. No retries, no streaming.
    pub async fn generate(&self, prompt: &str) -> Generation {
        let Some(api_key) = &self.config.api_key else {
            return Generation::Unavailable(UnavailableReason::NotConfigured);
        };

        let mut request = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.config.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": TEMPERATURE,
            }));
        if let Some(site_url) = &self.config.site_url {
            request = request.header("HTTP-Referer", site_url);
        }
        if let Some(app_name) = &self.config.app_name {
            request = request.header("X-Title", app_name);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(model = %self.config.model, %error, "LLM request failed");
                return Generation::Unavailable(UnavailableReason::RequestFailed);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                model = %self.config.model,
                status = status.as_u16(),
                body = %body,
                "LLM request failed"
            );
            return Generation::Unavailable(UnavailableReason::RequestFailed);
        }

        let data: ChatResponse = match response.json().await {
            Ok(data) => data,
            Err(error) => {
                warn!(model = %self.config.model, %error, "LLM response unreadable");
                return Generation::Unavailable(UnavailableReason::RequestFailed);
            }
        };

        match data.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(content) => Generation::Text(content),
            None => Generation::Unavailable(UnavailableReason::RequestFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(str::to_string),
            model: "openai/gpt-4o-mini".to_string(),
            endpoint: format!("{}/chat/completions", server.uri()),
            site_url: None,
            app_name: None,
        }
    }

    #[tokio::test]
    async fn unconfigured_client_makes_no_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = LlmClient::new(config_for(&server, None));
        let outcome = client.generate("anything").await;
        assert_eq!(
            outcome,
            Generation::Unavailable(UnavailableReason::NotConfigured)
        );
    }

    #[tokio::test]
    async fn returns_completion_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "openai/gpt-4o-mini",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  hi there \n"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(config_for(&server, Some("test-key")));
        let outcome = client.generate("hello").await;
        assert_eq!(outcome, Generation::Text("  hi there \n".to_string()));
        assert_eq!(outcome.text_or("fallback"), "hi there");
    }

    #[tokio::test]
    async fn non_2xx_degrades_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = LlmClient::new(config_for(&server, Some("test-key")));
        assert_eq!(
            client.generate("hello").await,
            Generation::Unavailable(UnavailableReason::RequestFailed)
        );
    }

    #[tokio::test]
    async fn missing_content_degrades_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = LlmClient::new(config_for(&server, Some("test-key")));
        assert_eq!(
            client.generate("hello").await,
            Generation::Unavailable(UnavailableReason::RequestFailed)
        );
    }

    #[test]
    fn text_or_substitutes_fallback() {
        let fallback = "LLM is not configured.";
        assert_eq!(
            Generation::Unavailable(UnavailableReason::NotConfigured).text_or(fallback),
            fallback
        );
        assert!(Generation::Text("x".to_string()).is_available());
    }
}
