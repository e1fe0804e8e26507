//! AI gateway: ingredient identification and recipe generation.
//!
//! This module provides:
//! - `AiClient` trait for abstracting the hosted model
//! - `GeminiClient`, talking to the Gemini `generateContent` API
//! - `FakeAiClient` for tests and offline demos
//! - `identify_ingredients` and `generate_recipes`, the two gateway operations
//!
//! # Configuration
//!
//! - `SOBRAS_AI_PROVIDER` (optional): "gemini" (default) or "fake"
//! - `GEMINI_API_KEY` (required for gemini): Your Gemini API key
//! - `SOBRAS_AI_MODEL` (optional): Model name, e.g., "gemini-2.5-flash"
//! - `SOBRAS_AI_BASE_URL` (optional): API base URL
//! - `SOBRAS_AI_TIMEOUT_SECS` (optional): Request timeout in seconds
//!
//! # Example
//!
//! ```ignore
//! use sobras_core::ai::{create_client_from_env, identify_ingredients};
//!
//! let client = create_client_from_env()?;
//! let ingredients = identify_ingredients(client.as_ref(), &image).await?;
//! ```

mod client;
mod config;
mod fake;
mod generate;
mod identify;
pub mod prompts;
mod types;

pub use client::{AiClient, AiError, GeminiClient};
pub use config::{AiConfig, ConfigError};
pub use fake::{FakeAiClient, FakeResponse};
pub use generate::{generate_recipes, parse_recipe_batch, RECIPES_PER_BATCH};
pub use identify::{identify_ingredients, parse_ingredient_list};
pub use types::{GenerateRequest, GenerateResponse, Part, Usage};

/// Create the client selected by `SOBRAS_AI_PROVIDER`.
pub fn create_client_from_env() -> Result<Box<dyn AiClient>, AiError> {
    let provider = std::env::var("SOBRAS_AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
    create_client(&provider, AiConfig::from_env)
}

/// Create a client for a named provider. The config loader is only called
/// for providers that need it.
pub fn create_client<F>(provider: &str, load_config: F) -> Result<Box<dyn AiClient>, AiError>
where
    F: FnOnce() -> Result<AiConfig, ConfigError>,
{
    match provider {
        "fake" => Ok(Box::new(FakeAiClient::with_demo_responses())),
        "gemini" => Ok(Box::new(GeminiClient::new(load_config()?)?)),
        other => Err(AiError::Config(ConfigError::InvalidValue {
            name: "SOBRAS_AI_PROVIDER".to_string(),
            value: other.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_fake_client_skips_config() {
        let result = create_client("fake", || {
            Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_create_gemini_client_requires_config() {
        let result = create_client("gemini", || {
            Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))
        });
        assert!(matches!(result, Err(AiError::Config(_))));

        assert!(create_client("gemini", || Ok(AiConfig::new("k"))).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        let result = create_client("openai", || Ok(AiConfig::new("k")));
        assert!(matches!(result, Err(AiError::Config(_))));
    }
}
