//! OpenRouter chat-completions client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use bidiq_shared::{AppConfig, BidIqError, OpenRouterConfig, Result, resolve_api_key};

use crate::Summarizer;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("BidIQ/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body echoed into error messages.
const MAX_ERROR_DETAIL: usize = 300;

/// Low temperature keeps the JSON output stable.
const TEMPERATURE: f32 = 0.2;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    /// OpenRouter reports some provider failures in a 200 body.
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`Summarizer`] backed by the OpenRouter chat-completions API.
pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    /// Build a client from the `[openrouter]` config section and an API key.
    pub fn new(config: &OpenRouterConfig, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(BidIqError::config(format!(
                "empty API key (expected in {})",
                config.api_key_env
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BidIqError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.default_model.clone(),
        })
    }

    /// Build a client from app config, reading the key from the environment.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;
        Self::new(&config.openrouter, api_key)
    }

    /// Override the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Model ID requests are sent with.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Summarizer for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn summarize(&self, system: &str, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BidIqError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = truncate(&detail, MAX_ERROR_DETAIL);
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(BidIqError::RateLimited(format!("HTTP {status}: {detail}")));
            }
            return Err(BidIqError::Upstream {
                status: status.as_u16(),
                message: detail.to_owned(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BidIqError::parse(format!("invalid completion response: {e}")))?;

        if let Some(err) = parsed.error {
            let code = err.code.as_ref().and_then(error_code);
            return Err(match code {
                Some(429) => BidIqError::RateLimited(err.message),
                Some(status) => BidIqError::Upstream {
                    status,
                    message: err.message,
                },
                None => BidIqError::Network(err.message),
            });
        }

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| BidIqError::parse("completion response contained no content"))?;

        debug!(response_len = text.len(), "completion received");
        Ok(text)
    }
}

/// Error codes arrive as numbers or numeric strings.
fn error_code(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{RetryPolicy, retry};

    use super::*;

    fn client_for(server: &MockServer) -> OpenRouterClient {
        let config = OpenRouterConfig {
            base_url: server.uri(),
            default_model: "test/model".into(),
            timeout_secs: 5,
            ..OpenRouterConfig::default()
        };
        OpenRouterClient::new(&config, "test-key".into()).expect("build client")
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "gen-1",
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn empty_api_key_rejected() {
        let result = OpenRouterClient::new(&OpenRouterConfig::default(), String::new());
        assert!(matches!(result, Err(BidIqError::Config { .. })));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let config = OpenRouterConfig {
            base_url: "https://example.com/api/v1/".into(),
            ..OpenRouterConfig::default()
        };
        let client = OpenRouterClient::new(&config, "k".into()).expect("build");
        assert_eq!(client.endpoint, "https://example.com/api/v1/chat/completions");
        assert_eq!(client.with_model("other/model").model(), "other/model");
    }

    #[test]
    fn request_serializes_messages() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[tokio::test]
    async fn summarize_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "test/model" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"ok\":true}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client.summarize("system", "document").await.expect("summarize");
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn http_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .summarize("system", "document")
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .summarize("system", "document")
            .await
            .unwrap_err();
        match err {
            BidIqError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_body_with_429_code_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "code": 429, "message": "Provider returned 429" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .summarize("system", "document")
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn empty_choices_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .summarize("system", "document")
            .await
            .unwrap_err();
        assert!(matches!(err, BidIqError::Parse { .. }));
    }

    #[tokio::test]
    async fn retry_recovers_from_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("done")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let text = retry(|| client.summarize("system", "document"), policy)
            .await
            .expect("third attempt succeeds");
        assert_eq!(text, "done");
    }

    #[test]
    fn error_codes_parse_from_numbers_and_strings() {
        assert_eq!(error_code(&json!(429)), Some(429));
        assert_eq!(error_code(&json!("502")), Some(502));
        assert_eq!(error_code(&json!(null)), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 100), "short");
    }
}
