//! Prompt templates and the structured response schema.
//!
//! Prompts ask for output in Spanish; ingredient names shown to the user come
//! straight from the model.

use serde_json::{json, Value};

use crate::filters::Filters;

pub const IDENTIFY_PROMPT_NAME: &str = "identify_ingredients";
pub const GENERATE_PROMPT_NAME: &str = "generate_recipes";

/// Language the model is asked to answer in.
pub const TARGET_LANGUAGE: &str = "español";

pub fn render_identify_prompt() -> String {
    format!(
        "Analiza esta imagen de una nevera, una despensa o ingredientes sueltos.\n\
         Tu única tarea es listar los ingredientes comestibles que veas.\n\
         - Responde SÓLO con los ingredientes en {lang}, separados por comas.\n\
         - No incluyas cantidades, descripciones, categorías ni frases introductorias.\n\
         - Ignora recipientes, marcas, texto y objetos no comestibles.\n\
         - Si no estás seguro de un ingrediente, no lo incluyas.\n\
         Respuesta correcta: 'tomates, cebolla, pimiento verde, huevos, leche'.\n\
         Respuesta incorrecta: 'He encontrado los siguientes ingredientes: Tomates, una cebolla...'.",
        lang = TARGET_LANGUAGE
    )
}

pub fn render_generate_prompt(ingredients: &[String], filters: &Filters) -> String {
    format!(
        "Eres un chef experto en crear recetas deliciosas y creativas con sobras.\n\
         Ingredientes disponibles: {ingredients}.\n\
         \n\
         Preferencias del usuario:\n\
         - Tipo de comida: {meal}. Si es 'Cualquiera', propón lo que mejor encaje.\n\
         - Restricciones dietéticas: {restrictions}.\n\
         - Tiempo máximo de preparación: {time}. Si es 'Cualquiera', no hay límite.\n\
         \n\
         Genera exactamente 3 recetas variadas que usen principalmente los ingredientes disponibles.\n\
         - Prioriza los ingredientes de la lista.\n\
         - Añade ingredientes faltantes sólo si son imprescindibles (aceite, sal, especias básicas o un componente clave).\n\
         - Las recetas deben cumplir TODAS las preferencias del usuario.\n\
         - En 'ingredientFacts', añade para cada ingrediente principal usado un dato curioso, nutricional o culinario breve.\n\
         - 'difficulty' debe ser 'Easy', 'Medium' o 'Hard'.\n\
         - Escribe todos los textos en {lang} y responde en JSON según el esquema.",
        ingredients = ingredients.join(", "),
        meal = filters.meal_type.label(),
        restrictions = filters.restrictions_label(),
        time = filters.cooking_time.label(),
        lang = TARGET_LANGUAGE,
    )
}

fn string_array(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": {"type": "STRING"},
        "description": description
    })
}

/// Schema for the recipe generation response: `{ "recipes": [3 x recipe] }`.
pub fn recipe_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "recipes": {
                "type": "ARRAY",
                "description": "Exactamente 3 recetas.",
                "minItems": 3,
                "maxItems": 3,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING", "description": "Nombre creativo y apetitoso."},
                        "description": {"type": "STRING", "description": "Una o dos frases atractivas."},
                        "usedIngredients": string_array("Ingredientes de la lista que usa la receta."),
                        "missingIngredients": string_array("Ingredientes esenciales que no estaban en la lista."),
                        "steps": string_array("Pasos de preparación en orden."),
                        "difficulty": {"type": "STRING", "enum": ["Easy", "Medium", "Hard"]},
                        "prepTime": {"type": "STRING", "description": "Tiempo total estimado, p. ej. '25 min'."},
                        "dietaryTags": string_array("Etiquetas dietéticas, p. ej. 'Vegano'."),
                        "ingredientFacts": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "ingredient": {"type": "STRING"},
                                    "fact": {"type": "STRING"}
                                },
                                "required": ["ingredient", "fact"]
                            }
                        }
                    },
                    "required": [
                        "name", "description", "usedIngredients", "missingIngredients", "steps",
                        "difficulty", "prepTime", "dietaryTags", "ingredientFacts"
                    ]
                }
            }
        },
        "required": ["recipes"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{CookingTime, DietaryRestriction, MealType};

    #[test]
    fn test_generate_prompt_embeds_ingredients_and_filters() {
        let mut filters = Filters {
            meal_type: MealType::Soup,
            cooking_time: CookingTime::Under30Min,
            ..Default::default()
        };
        filters.toggle_restriction(DietaryRestriction::Vegan);

        let prompt = render_generate_prompt(&["Tomate".to_string(), "Ajo".to_string()], &filters);
        assert!(prompt.contains("Ingredientes disponibles: Tomate, Ajo."));
        assert!(prompt.contains("Tipo de comida: Sopa."));
        assert!(prompt.contains("Restricciones dietéticas: Vegano."));
        assert!(prompt.contains("< 30 min"));
    }

    #[test]
    fn test_generate_prompt_defaults() {
        let prompt = render_generate_prompt(&["Arroz".to_string()], &Filters::default());
        assert!(prompt.contains("Tipo de comida: Cualquiera."));
        assert!(prompt.contains("Restricciones dietéticas: Ninguna."));
    }

    #[test]
    fn test_schema_requires_every_field() {
        let schema = recipe_response_schema();
        let required = schema["properties"]["recipes"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 9);
    }
}
