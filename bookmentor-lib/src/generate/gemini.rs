use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::generate::{Generation, Generator};
use crate::{Error, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// Gemini `generateContent` REST client
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiGenerator {
    /// Create a client for `model` with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(
            api_key,
            model,
            Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        )
    }

    /// Create a client with a per-request timeout.
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from the `[generation]` config section.
    ///
    /// Fails if no API key is configured.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("generation.api_key is not set".to_string()))?;

        Ok(Self::with_timeout(
            api_key,
            config.model.as_str(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.base_url.as_str()))
    }

    /// Point the client at another endpoint, e.g. a proxy.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn request(
        &self,
        system: Option<&str>,
        prompt: &str,
    ) -> std::result::Result<String, String> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart { text: prompt }],
            }],
            system_instruction: system.map(|text| Content {
                role: None,
                parts: vec![TextPart { text }],
            }),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("provider returned {status}: {}", detail.trim()));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {e}"))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err("response contained no text".to_string());
        }
        Ok(text)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, system: Option<&str>, prompt: &str) -> Generation {
        debug!(model = %self.model, prompt_chars = prompt.len(), "sending generation request");
        match self.request(system, prompt).await {
            Ok(text) => Generation::Text(text),
            Err(message) => {
                warn!(model = %self.model, error = %message, "generation failed");
                Generation::Error(message)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/models/gemini-2.0-flash:generateContent";

    fn generator(server: &MockServer) -> GeminiGenerator {
        GeminiGenerator::new("test-key", DEFAULT_GEMINI_MODEL)
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Explain osmosis"}]}],
                "systemInstruction": {"parts": [{"text": "Be brief."}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "Water moves "}, {"text": "across membranes."}]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generation = generator(&server).generate(Some("Be brief."), "Explain osmosis").await;
        assert_eq!(generation, Generation::Text("Water moves across membranes.".into()));
    }

    #[tokio::test]
    async fn test_http_error_becomes_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let Generation::Error(message) = generator(&server).generate(None, "hi").await else {
            panic!("expected an error");
        };
        assert!(message.contains("429"));
        assert!(message.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let generation = generator(&server).generate(None, "hi").await;
        assert_eq!(generation, Generation::Error("response contained no text".into()));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_error() {
        let generator = GeminiGenerator::new("k", "m")
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        assert!(!generator.generate(None, "hi").await.is_text());
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = GenerationConfig::default();
        assert!(matches!(
            GeminiGenerator::from_config(&config),
            Err(Error::Config(_))
        ));

        let config = GenerationConfig {
            api_key: Some("key".into()),
            base_url: "http://localhost:8080/v1/".into(),
            ..GenerationConfig::default()
        };
        let generator = GeminiGenerator::from_config(&config).unwrap();
        assert_eq!(generator.model_name(), DEFAULT_GEMINI_MODEL);
        assert_eq!(
            generator.endpoint(),
            "http://localhost:8080/v1/models/gemini-2.0-flash:generateContent"
        );
    }
}
