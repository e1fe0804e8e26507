//! Recipe generation from ingredients and filters.

use std::collections::HashSet;

use serde::Deserialize;

use crate::ai::prompts::{recipe_response_schema, render_generate_prompt, GENERATE_PROMPT_NAME};
use crate::ai::{AiClient, AiError, GenerateRequest, Part};
use crate::filters::Filters;
use crate::types::{recipe_id, Difficulty, IngredientFact, Recipe};

/// Number of recipes every generation must return.
pub const RECIPES_PER_BATCH: usize = 3;

/// Response format from the AI. Every field is required.
#[derive(Debug, Deserialize)]
struct RecipeBatch {
    recipes: Vec<GeneratedRecipe>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedRecipe {
    name: String,
    description: String,
    used_ingredients: Vec<String>,
    missing_ingredients: Vec<String>,
    steps: Vec<String>,
    difficulty: Difficulty,
    prep_time: String,
    dietary_tags: Vec<String>,
    ingredient_facts: Vec<IngredientFact>,
}

/// Generate recipes for the given ingredients and filters.
pub async fn generate_recipes(
    ai_client: &dyn AiClient,
    ingredients: &[String],
    filters: &Filters,
) -> Result<Vec<Recipe>, AiError> {
    let request = GenerateRequest {
        parts: vec![Part::text(render_generate_prompt(ingredients, filters))],
        response_schema: Some(recipe_response_schema()),
        ..Default::default()
    };

    let response = ai_client.complete(GENERATE_PROMPT_NAME, request).await?;
    let recipes = parse_recipe_batch(&response.text)?;

    tracing::debug!(
        recipes = ?recipes.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        "Generated recipes"
    );
    Ok(recipes)
}

/// Validate a generation response and assign client-side ids.
///
/// Malformed JSON is a parse error; well-formed JSON that does not match the
/// schema (missing fields, unknown difficulty, blank name, wrong count) is an
/// invalid response.
pub fn parse_recipe_batch(text: &str) -> Result<Vec<Recipe>, AiError> {
    let batch: RecipeBatch = serde_json::from_str(text).map_err(|e| {
        if e.is_data() {
            AiError::InvalidResponse(e.to_string())
        } else {
            AiError::ParseError(format!("Failed to parse recipe response: {}", e))
        }
    })?;

    if batch.recipes.len() != RECIPES_PER_BATCH {
        return Err(AiError::InvalidResponse(format!(
            "expected {} recipes, got {}",
            RECIPES_PER_BATCH,
            batch.recipes.len()
        )));
    }

    let mut seen_ids = HashSet::new();
    batch
        .recipes
        .into_iter()
        .map(|generated| {
            if generated.name.trim().is_empty() {
                return Err(AiError::InvalidResponse(
                    "recipe name is empty".to_string(),
                ));
            }

            let mut id = recipe_id(&generated.name);
            while !seen_ids.insert(id.clone()) {
                id = recipe_id(&generated.name);
            }

            Ok(Recipe {
                id,
                name: generated.name,
                description: generated.description,
                used_ingredients: generated.used_ingredients,
                missing_ingredients: generated.missing_ingredients,
                steps: generated.steps,
                difficulty: generated.difficulty,
                prep_time: generated.prep_time,
                dietary_tags: generated.dietary_tags,
                ingredient_facts: generated.ingredient_facts,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;
    use crate::filters::MealType;
    use serde_json::{json, Value};

    fn recipe_json(name: &str) -> Value {
        json!({
            "name": name,
            "description": "Aprovecha lo que hay.",
            "usedIngredients": ["Huevos", "Patatas"],
            "missingIngredients": ["Aceite"],
            "steps": ["Pelar", "Freír", "Cuajar"],
            "difficulty": "Medium",
            "prepTime": "30 min",
            "dietaryTags": ["Vegetariano"],
            "ingredientFacts": [{"ingredient": "Huevos", "fact": "Ricos en proteína."}]
        })
    }

    fn batch(names: &[&str]) -> String {
        json!({"recipes": names.iter().map(|n| recipe_json(n)).collect::<Vec<_>>()}).to_string()
    }

    #[test]
    fn test_parse_assigns_distinct_ids() {
        let recipes = parse_recipe_batch(&batch(&["Tortilla", "Tortilla", "Revuelto"])).unwrap();
        assert_eq!(recipes.len(), 3);

        let ids: HashSet<&str> = recipes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(recipes[0].id.starts_with("tortilla-"));
        assert_eq!(recipes[2].difficulty, Difficulty::Medium);
        assert_eq!(recipes[0].ingredient_facts[0].ingredient, "Huevos");
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        let result = parse_recipe_batch(&batch(&["Uno", "Dos"]));
        assert!(matches!(result, Err(AiError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let mut incomplete = recipe_json("Sin pasos");
        incomplete.as_object_mut().unwrap().remove("steps");
        let text = json!({"recipes": [recipe_json("A"), recipe_json("B"), incomplete]}).to_string();

        let result = parse_recipe_batch(&text);
        assert!(matches!(result, Err(AiError::InvalidResponse(msg)) if msg.contains("steps")));
    }

    #[test]
    fn test_parse_rejects_unknown_difficulty() {
        let mut odd = recipe_json("Rara");
        odd["difficulty"] = json!("Imposible");
        let text = json!({"recipes": [recipe_json("A"), recipe_json("B"), odd]}).to_string();
        assert!(matches!(
            parse_recipe_batch(&text),
            Err(AiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_blank_name() {
        assert!(matches!(
            parse_recipe_batch(&batch(&["A", "  ", "C"])),
            Err(AiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_recipe_batch("{\"recipes\": ["),
            Err(AiError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_requests_json_schema() {
        let client = FakeAiClient::new().with_text(GENERATE_PROMPT_NAME, &batch(&["A", "B", "C"]));
        let filters = Filters {
            meal_type: MealType::Dessert,
            ..Default::default()
        };

        let recipes = generate_recipes(&client, &["Manzana".to_string()], &filters)
            .await
            .unwrap();
        assert_eq!(recipes.len(), 3);

        let request = client.last_request(GENERATE_PROMPT_NAME).unwrap();
        assert!(request.response_schema.is_some());
        match &request.parts[0] {
            Part::Text(prompt) => {
                assert!(prompt.contains("Manzana"));
                assert!(prompt.contains("Postre"));
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }
}
