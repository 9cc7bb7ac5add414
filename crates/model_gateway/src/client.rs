//! OpenAI-compatible chat/vision client.
//!
//! Issues one chat-completion request carrying the rubric text and the
//! inline image payload, and maps HTTP failures to typed errors.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use stylecheck_core::{config::ModelConfig, Error, Result, VisionClient};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiVisionClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Secret<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiVisionClient {
    /// Create a client with the shipped defaults (gpt-4o, 800 tokens,
    /// temperature 0.3, 30 s timeout).
    pub fn new(api_key: Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key,
            model: "gpt-4o".to_string(),
            max_tokens: 800,
            temperature: 0.3,
            timeout: Duration::from_secs(30),
        }
    }

    /// Build a client from configuration. Fails when no API key is set.
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("model.api_key is not set".to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
            timeout: Duration::from_secs(cfg.request_timeout_secs),
        })
    }

    /// Override the endpoint base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request<'a>(&'a self, rubric: &'a str, image_data_uri: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: rubric },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_data_uri },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn critique_image(&self, rubric: &str, image_data_uri: &str) -> Result<String> {
        let request = self.build_request(rubric, image_data_uri);

        tracing::debug!(
            model = %self.model,
            image_len = image_data_uri.len(),
            "Sending critique request"
        );

        let send = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send();

        // Cooperative cancellation: dropping the in-flight future aborts
        // the request once the timer fires.
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))?
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "Model endpoint returned error");
            return Err(map_status(status, &body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::unknown_api(format!("malformed completion body: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::unknown_api("No analysis received from AI"))
    }
}

fn classify_transport(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        Error::network(err.to_string())
    } else {
        Error::unknown_api(err.to_string())
    }
}

fn map_status(status: u16, body: &str) -> Error {
    match status {
        401 => Error::Auth,
        429 => Error::RateLimit,
        500 => Error::ServiceUnavailable,
        400 => Error::bad_request(upstream_message(body)),
        _ => Error::unknown_api(upstream_message(body)),
    }
}

fn upstream_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .unwrap_or_else(|| "Unknown error".to_string())
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OpenAiVisionClient {
        OpenAiVisionClient::new(Secret::new("sk-test".to_string()))
    }

    #[test]
    fn request_body_shape() {
        let client = test_client();
        let request = client.build_request("rate this", "data:image/jpeg;base64,AAAA");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert_eq!(body["messages"][0]["content"][0]["text"], "rate this");
        assert_eq!(body["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            body["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(map_status(401, ""), Error::Auth));
        assert!(matches!(map_status(429, ""), Error::RateLimit));
        assert!(matches!(map_status(500, ""), Error::ServiceUnavailable));
        assert!(matches!(map_status(400, ""), Error::BadRequest(_)));
        assert!(matches!(map_status(503, ""), Error::UnknownApi(_)));
    }

    #[test]
    fn upstream_message_extraction() {
        let body = r#"{"error":{"message":"model overloaded","type":"server_error"}}"#;
        match map_status(418, body) {
            Error::UnknownApi(msg) => assert_eq!(msg, "model overloaded"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
