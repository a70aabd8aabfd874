//! Gemini provider using the generateContent API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionError, CompletionProvider, PERSONA_PREAMBLE};
use crate::config::AppConfig;

pub struct GeminiClient {
    client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: HttpClient::new(),
            api_key: config.google_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            timeout: Duration::from_secs(config.completion_timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(user_message: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: format!("{PERSONA_PREAMBLE}\n\nUser: {user_message}"),
                }],
            }],
        }
    }

    fn extract_text(response: GeminiResponse) -> Result<String, CompletionError> {
        if let Some(error) = response.error {
            return Err(CompletionError::Api {
                status: error.code,
                message: error.message,
            });
        }

        let mut text = String::new();
        if let Some(candidate) = response.candidates.unwrap_or_default().into_iter().next() {
            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(t) = part.text {
                        text.push_str(&t);
                    }
                }
            }
        }

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CompletionError::Malformed("no candidate text in response".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, user_message: &str) -> Result<String, CompletionError> {
        let url = format!("{}?key={}", self.endpoint(), self.api_key);
        debug!("requesting completion from {}", self.endpoint());

        let response = self
            .client
            .post(&url)
            .json(&Self::build_request(user_message))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        Self::extract_text(body)
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiApiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiApiError {
    code: u16,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_wraps_message_in_preamble() {
        let request = GeminiClient::build_request("What is Rust?");
        let json = serde_json::to_value(&request).unwrap();

        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("You are a friendly"));
        assert!(text.ends_with("User: What is Rust?"));
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": { "parts": [{"text": "Hello "}, {"text": "world."}] }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(GeminiClient::extract_text(response).unwrap(), "Hello world.");
    }

    #[test]
    fn test_extract_text_trims_whitespace() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  padded \n"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(GeminiClient::extract_text(response).unwrap(), "padded");
    }

    #[test]
    fn test_extract_text_surfaces_embedded_error() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"error": {"code": 429, "message": "quota exceeded"}}"#,
        )
        .unwrap();

        match GeminiClient::extract_text(response) {
            Err(CompletionError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            GeminiClient::extract_text(response),
            Err(CompletionError::Malformed(_))
        ));
    }

    #[test]
    fn test_endpoint_uses_configured_model() {
        let mut config = AppConfig::from_env();
        config.gemini_base_url = "https://example.test/v1beta/".to_string();
        config.gemini_model = "gemini-2.5-flash".to_string();

        let client = GeminiClient::new(&config);
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
