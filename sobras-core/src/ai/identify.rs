//! Ingredient identification from a photo.

use crate::ai::prompts::{render_identify_prompt, IDENTIFY_PROMPT_NAME};
use crate::ai::{AiClient, AiError, GenerateRequest, Part};
use crate::image::ImageData;
use crate::ingredients::IngredientList;

/// Ask the model which ingredients appear in the image.
///
/// An empty list is a successful answer, distinct from an error.
pub async fn identify_ingredients(
    ai_client: &dyn AiClient,
    image: &ImageData,
) -> Result<Vec<String>, AiError> {
    let request = GenerateRequest {
        parts: vec![Part::image(image.clone()), Part::text(render_identify_prompt())],
        ..Default::default()
    };

    let response = ai_client.complete(IDENTIFY_PROMPT_NAME, request).await?;
    let ingredients = parse_ingredient_list(&response.text);

    tracing::debug!(count = ingredients.len(), "Identified ingredients");
    Ok(ingredients)
}

/// Split a comma-separated answer into display-cased ingredient names.
///
/// Tokens are trimmed, their first letter upper-cased, and empty or repeated
/// tokens dropped. Order is preserved.
pub fn parse_ingredient_list(text: &str) -> Vec<String> {
    let names = text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(capitalize_first)
        .collect();

    IngredientList::from_identified(names).as_slice().to_vec()
}

fn capitalize_first(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;

    #[test]
    fn test_parse_ingredient_list() {
        assert_eq!(
            parse_ingredient_list(" tomates, cebolla ,, pimiento verde,huevos, "),
            vec!["Tomates", "Cebolla", "Pimiento verde", "Huevos"]
        );
    }

    #[test]
    fn test_parse_keeps_accents_and_drops_repeats() {
        assert_eq!(
            parse_ingredient_list("ñame, órégano, Ñame"),
            vec!["Ñame", "Órégano"]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_ingredient_list("").is_empty());
        assert!(parse_ingredient_list("  ,  , ").is_empty());
    }

    #[tokio::test]
    async fn test_identify_sends_image_and_prompt() {
        let client = FakeAiClient::new().with_text(IDENTIFY_PROMPT_NAME, "leche, huevos");
        let image = ImageData::new(vec![0xFF, 0xD8], "image/jpeg");

        let ingredients = identify_ingredients(&client, &image).await.unwrap();
        assert_eq!(ingredients, vec!["Leche", "Huevos"]);

        let request = client.last_request(IDENTIFY_PROMPT_NAME).unwrap();
        assert_eq!(request.parts[0], Part::image(image));
        assert!(request.response_schema.is_none());
    }

    #[tokio::test]
    async fn test_identify_propagates_errors() {
        let client = FakeAiClient::new().with_error(IDENTIFY_PROMPT_NAME, "boom");
        let image = ImageData::new(vec![1], "image/png");
        assert!(identify_ingredients(&client, &image).await.is_err());
    }
}
