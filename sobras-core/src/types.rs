use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the random suffix appended to generated recipe ids.
pub const ID_SUFFIX_LEN: usize = 7;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// How hard a recipe is to prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "Fácil", alias = "easy")]
    Easy,
    #[serde(alias = "Media", alias = "medium")]
    Medium,
    #[serde(alias = "Difícil", alias = "hard")]
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Fácil",
            Difficulty::Medium => "Media",
            Difficulty::Hard => "Difícil",
        }
    }
}

/// A short fact about one of the ingredients a recipe uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientFact {
    pub ingredient: String,
    pub fact: String,
}

/// A generated recipe.
///
/// Field names match the JSON shape requested from the model, so a stored
/// favorite and a freshly generated recipe serialize the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: String,
    pub used_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub difficulty: Difficulty,
    pub prep_time: String,
    pub dietary_tags: Vec<String>,
    pub ingredient_facts: Vec<IngredientFact>,
}

/// Build a client-side recipe id: the name slug plus a random suffix.
///
/// e.g., "Tortilla de Patatas" -> "tortilla-de-patatas-k3j9x0a"
pub fn recipe_id(name: &str) -> String {
    recipe_id_with_rng(name, &mut rand::thread_rng())
}

pub fn recipe_id_with_rng<R: Rng>(name: &str, rng: &mut R) -> String {
    let slug = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("{}-{}", slug, suffix)
}
