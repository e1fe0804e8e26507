//! AI client implementation using the Gemini `generateContent` API.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::AiConfig;
use super::types::{GenerateRequest, GenerateResponse, Part, Usage};

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Response does not match the expected schema: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Trait for AI clients.
///
/// Calls are single-shot: implementations must not retry. The `prompt_name`
/// identifies the prompt for logging and for fakes.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn complete(
        &self,
        prompt_name: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, AiError>;
}

/// Client for the hosted Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    config: AiConfig,
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Error response from the Gemini API.
#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleApiError,
}

#[derive(Debug, Deserialize)]
struct GoogleApiError {
    message: String,
}

fn build_request(request: &GenerateRequest) -> GeminiRequest<'_> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => GeminiPart::Text { text: text.clone() },
            Part::Image(image) => GeminiPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: BASE64.encode(&image.bytes),
                },
            },
        })
        .collect();

    let wants_config = request.response_schema.is_some()
        || request.max_output_tokens.is_some()
        || request.temperature.is_some();

    let generation_config = wants_config.then(|| GenerationConfig {
        response_mime_type: request
            .response_schema
            .as_ref()
            .map(|_| "application/json"),
        response_schema: request.response_schema.as_ref(),
        max_output_tokens: request.max_output_tokens,
        temperature: request.temperature,
    });

    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user",
            parts,
        }],
        generation_config,
    }
}

fn parse_response(body: &str) -> Result<GenerateResponse, AiError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|e| AiError::ParseError(e.to_string()))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AiError::ParseError("No candidates in response".to_string()))?;

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let usage = response
        .usage_metadata
        .map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    Ok(GenerateResponse { text, usage })
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        let body = build_request(&request);

        tracing::debug!(
            prompt_name = prompt_name,
            model = %self.config.model,
            "Calling AI API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<GoogleErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(AiError::Api { status, message });
        }

        let parsed = parse_response(&text)?;

        tracing::debug!(
            prompt_name = prompt_name,
            prompt_tokens = parsed.usage.prompt_tokens,
            completion_tokens = parsed.usage.completion_tokens,
            "AI API call completed"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageData;
    use serde_json::json;

    #[test]
    fn test_build_multimodal_request() {
        let request = GenerateRequest {
            parts: vec![
                Part::image(ImageData::new(vec![1, 2, 3], "image/jpeg")),
                Part::text("¿Qué hay?"),
            ],
            ..Default::default()
        };

        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AQID"}},
                        {"text": "¿Qué hay?"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_build_json_request() {
        let schema = json!({"type": "OBJECT"});
        let request = GenerateRequest {
            parts: vec![Part::text("recetas")],
            response_schema: Some(schema.clone()),
            ..Default::default()
        };

        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(
            body["generationConfig"],
            json!({"responseMimeType": "application/json", "responseSchema": schema})
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "candidates": [{"content": {"parts": [{"text": "tomates, "}, {"text": "huevos"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4, "totalTokenCount": 14}
        }"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.text, "tomates, huevos");
        assert_eq!(response.usage.total_tokens, 14);
    }

    #[test]
    fn test_parse_response_without_text_is_empty() {
        let response = parse_response(r#"{"candidates": [{"finishReason": "STOP"}]}"#).unwrap();
        assert_eq!(response.text, "");
    }

    #[test]
    fn test_parse_response_without_candidates() {
        assert!(matches!(
            parse_response(r#"{"candidates": []}"#),
            Err(AiError::ParseError(_))
        ));
        assert!(matches!(
            parse_response("<html>"),
            Err(AiError::ParseError(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(AiConfig::new("key")).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
