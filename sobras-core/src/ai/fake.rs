//! Fake AI client for testing and offline demos.
//!
//! Responses are registered per prompt name and returned for every call with
//! that name. Calls are recorded so tests can assert what was (or was not)
//! sent.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::prompts::{GENERATE_PROMPT_NAME, IDENTIFY_PROMPT_NAME};
use super::{AiClient, AiError, GenerateRequest, GenerateResponse, Usage};

/// Canned response for a prompt.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Text(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct FakeAiClient {
    responses: HashMap<String, FakeResponse>,
    calls: Mutex<Vec<(String, GenerateRequest)>>,
}

impl FakeAiClient {
    /// Create a new FakeAiClient with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, prompt_name: &str, response: FakeResponse) -> Self {
        self.responses.insert(prompt_name.to_string(), response);
        self
    }

    pub fn with_text(self, prompt_name: &str, text: &str) -> Self {
        self.with_response(prompt_name, FakeResponse::Text(text.to_string()))
    }

    pub fn with_error(self, prompt_name: &str, error: &str) -> Self {
        self.with_response(prompt_name, FakeResponse::Error(error.to_string()))
    }

    /// A client that answers both prompts with plausible content.
    pub fn with_demo_responses() -> Self {
        Self::new()
            .with_text(
                IDENTIFY_PROMPT_NAME,
                "tomates, cebolla, pimiento verde, huevos, patatas",
            )
            .with_text(GENERATE_PROMPT_NAME, DEMO_RECIPES)
    }

    fn calls(&self) -> MutexGuard<'_, Vec<(String, GenerateRequest)>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of calls made with this prompt name.
    pub fn call_count(&self, prompt_name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(name, _)| name == prompt_name)
            .count()
    }

    /// The most recent request sent with this prompt name.
    pub fn last_request(&self, prompt_name: &str) -> Option<GenerateRequest> {
        self.calls()
            .iter()
            .rev()
            .find(|(name, _)| name == prompt_name)
            .map(|(_, request)| request.clone())
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        self.calls().push((prompt_name.to_string(), request));

        match self.responses.get(prompt_name) {
            Some(FakeResponse::Text(text)) => Ok(GenerateResponse {
                text: text.clone(),
                usage: Usage::default(),
            }),
            Some(FakeResponse::Error(e)) => Err(AiError::RequestFailed(e.clone())),
            None => Err(AiError::RequestFailed(format!(
                "FakeAiClient: no response configured for prompt {}",
                prompt_name
            ))),
        }
    }
}

const DEMO_RECIPES: &str = r#"{"recipes": [
  {
    "name": "Tortilla de patatas con pimiento",
    "description": "La clásica tortilla jugosa con un toque de pimiento verde.",
    "usedIngredients": ["Patatas", "Huevos", "Cebolla", "Pimiento verde"],
    "missingIngredients": ["Aceite de oliva", "Sal"],
    "steps": [
      "Pela y corta las patatas y la cebolla en láminas finas.",
      "Fríelas a fuego medio con el pimiento hasta que estén tiernas.",
      "Bate los huevos, mezcla con las patatas escurridas y cuaja por ambos lados."
    ],
    "difficulty": "Medium",
    "prepTime": "40 min",
    "dietaryTags": ["Vegetariano", "Sin Gluten"],
    "ingredientFacts": [
      {"ingredient": "Huevos", "fact": "Aportan proteína completa de alto valor biológico."}
    ]
  },
  {
    "name": "Pisto rápido",
    "description": "Verduras pochadas con tomate, perfectas para mojar pan.",
    "usedIngredients": ["Tomates", "Cebolla", "Pimiento verde"],
    "missingIngredients": ["Aceite de oliva"],
    "steps": [
      "Pica la cebolla y el pimiento y póchalos a fuego lento.",
      "Añade el tomate troceado y cocina 15 minutos."
    ],
    "difficulty": "Easy",
    "prepTime": "25 min",
    "dietaryTags": ["Vegano"],
    "ingredientFacts": [
      {"ingredient": "Tomates", "fact": "El licopeno se absorbe mejor cuando el tomate está cocinado."}
    ]
  },
  {
    "name": "Huevos a la flamenca",
    "description": "Huevos cuajados al horno sobre un sofrito de tomate.",
    "usedIngredients": ["Huevos", "Tomates", "Cebolla"],
    "missingIngredients": ["Guisantes"],
    "steps": [
      "Prepara un sofrito con cebolla y tomate.",
      "Reparte en cazuelitas, casca los huevos encima y hornea 10 minutos a 200 grados."
    ],
    "difficulty": "Easy",
    "prepTime": "30 min",
    "dietaryTags": ["Vegetariano"],
    "ingredientFacts": [
      {"ingredient": "Cebolla", "fact": "Contiene quercetina, un antioxidante natural."}
    ]
  }
]}"#;
