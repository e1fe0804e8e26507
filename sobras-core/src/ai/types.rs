//! AI request and response types.

use serde::{Deserialize, Serialize};

use crate::image::ImageData;

/// One part of a multimodal prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Image(ImageData),
}

impl Part {
    pub fn text(content: impl Into<String>) -> Self {
        Part::Text(content.into())
    }

    pub fn image(image: ImageData) -> Self {
        Part::Image(image)
    }
}

/// Request for a single generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    /// If set, a JSON response matching this schema is requested.
    pub response_schema: Option<serde_json::Value>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a generation.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// The generated text (JSON text when a schema was requested).
    pub text: String,
    pub usage: Usage,
}
