//! Text rendering of the current screen.

use sobras_core::controller::{AdvisoryKind, AppController, AppStep};
use sobras_core::{CookingTime, DietaryRestriction, Filters, MealType, Recipe};

const TITLE: &str = "=== Sobras Mágicas IA ===";

pub fn render(app: &AppController) -> String {
    let mut lines = vec![TITLE.to_string()];

    if let Some(advisory) = app.advisory() {
        let marker = match advisory.kind {
            AdvisoryKind::Notice => "ℹ",
            AdvisoryKind::Error => "⚠",
        };
        lines.push(format!("{} {}", marker, advisory.message));
    }
    lines.push(String::new());

    match app.step() {
        AppStep::Welcome => welcome(app, &mut lines),
        AppStep::ConfirmIngredients => confirm_ingredients(app, &mut lines),
        AppStep::Generating => lines.push("Cocinando ideas...".to_string()),
        AppStep::Results => results(app, &mut lines),
        AppStep::Favorites => favorites(app, &mut lines),
    }

    lines.join("\n")
}

fn welcome(app: &AppController, lines: &mut Vec<String>) {
    lines.push("Convierte las sobras de tu nevera en recetas deliciosas.".to_string());
    if app.camera_active() {
        lines.push("Cámara activa: 'snap' para capturar, 'cancel' para cerrar.".to_string());
    } else {
        lines.push("  photo <ruta>  Analizar una foto".to_string());
        lines.push("  camera        Usar la cámara".to_string());
    }
    lines.push(format!(
        "  favorites     Mis favoritos ({})",
        app.favorites().len()
    ));
}

fn confirm_ingredients(app: &AppController, lines: &mut Vec<String>) {
    lines.push("Ingredientes:".to_string());
    if app.ingredients().is_empty() {
        lines.push("  (ninguno, usa 'add <nombre>')".to_string());
    }
    for (i, name) in app.ingredients().iter().enumerate() {
        lines.push(format!("  {}. {}", i + 1, name));
    }

    lines.push(String::new());
    filters(app.filters(), lines);
    lines.push(String::new());
    lines.push("'generate' para buscar recetas.".to_string());
}

fn filters(filters: &Filters, lines: &mut Vec<String>) {
    lines.push(format!("Tipo de comida: {}", filters.meal_type.label()));
    lines.push(format!(
        "  {}",
        numbered(MealType::ALL.iter().map(|m| m.label()))
    ));
    lines.push(format!("Tiempo de cocción: {}", filters.cooking_time.label()));
    lines.push(format!(
        "  {}",
        numbered(CookingTime::ALL.iter().map(|t| t.label()))
    ));
    lines.push(format!(
        "Restricciones: {}",
        filters.restrictions_label()
    ));
    lines.push(format!(
        "  {}",
        numbered(DietaryRestriction::ALL.iter().map(|r| r.label()))
    ));
}

fn numbered<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels
        .enumerate()
        .map(|(i, label)| format!("{}) {}", i + 1, label))
        .collect::<Vec<_>>()
        .join("  ")
}

fn results(app: &AppController, lines: &mut Vec<String>) {
    lines.push("Tus recetas:".to_string());
    for (i, recipe) in app.recipes().iter().enumerate() {
        lines.push(String::new());
        lines.push(recipe_card(i + 1, recipe, app.is_favorite(&recipe.id)));
    }
    lines.push(String::new());
    lines.push("'fav <n>' para guardar, 'back' para cambiar ingredientes.".to_string());
}

fn favorites(app: &AppController, lines: &mut Vec<String>) {
    lines.push("Mis favoritos:".to_string());
    if app.favorites().is_empty() {
        lines.push("Aún no tienes recetas favoritas. 'reset' para buscar recetas.".to_string());
        return;
    }
    for (i, recipe) in app.favorites().iter().enumerate() {
        lines.push(String::new());
        lines.push(recipe_card(i + 1, recipe, true));
    }
    lines.push(String::new());
    lines.push("'fav <n>' para quitar, 'reset' para empezar de nuevo.".to_string());
}

pub fn recipe_card(position: usize, recipe: &Recipe, favorite: bool) -> String {
    let star = if favorite { "★" } else { "☆" };
    let mut lines = vec![
        format!("{}. {} {}", position, recipe.name, star),
        format!("   {}", recipe.description),
        format!(
            "   Dificultad: {} | Tiempo: {}",
            recipe.difficulty.label(),
            recipe.prep_time
        ),
    ];
    if !recipe.dietary_tags.is_empty() {
        lines.push(format!("   Etiquetas: {}", recipe.dietary_tags.join(", ")));
    }
    lines.push(format!("   Usas: {}", recipe.used_ingredients.join(", ")));
    if !recipe.missing_ingredients.is_empty() {
        lines.push(format!(
            "   Te falta: {}",
            recipe.missing_ingredients.join(", ")
        ));
    }
    lines.push("   Preparación:".to_string());
    for (i, step) in recipe.steps.iter().enumerate() {
        lines.push(format!("     {}. {}", i + 1, step));
    }
    for fact in &recipe.ingredient_facts {
        lines.push(format!("   Sabías que... {}: {}", fact.ingredient, fact.fact));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobras_core::{Difficulty, Favorites, FavoritesStore, IngredientFact, MemoryStore};
    use std::sync::Arc;

    fn controller() -> AppController {
        AppController::new(Favorites::load(FavoritesStore::new(Arc::new(
            MemoryStore::new(),
        ))))
    }

    #[test]
    fn test_render_welcome() {
        let screen = render(&controller());
        assert!(screen.starts_with(TITLE));
        assert!(screen.contains("photo <ruta>"));
        assert!(screen.contains("Mis favoritos (0)"));
    }

    #[test]
    fn test_render_empty_favorites() {
        let mut app = controller();
        app.show_favorites().unwrap();
        assert!(render(&app).contains("Aún no tienes recetas favoritas"));
    }

    #[test]
    fn test_recipe_card() {
        let recipe = Recipe {
            id: "pisto-abc1234".to_string(),
            name: "Pisto".to_string(),
            description: "Verduras pochadas.".to_string(),
            used_ingredients: vec!["Tomate".to_string(), "Cebolla".to_string()],
            missing_ingredients: vec![],
            steps: vec!["Pochar".to_string(), "Añadir tomate".to_string()],
            difficulty: Difficulty::Easy,
            prep_time: "25 min".to_string(),
            dietary_tags: vec!["Vegano".to_string()],
            ingredient_facts: vec![IngredientFact {
                ingredient: "Tomate".to_string(),
                fact: "Es una fruta.".to_string(),
            }],
        };

        let card = recipe_card(2, &recipe, true);
        assert!(card.starts_with("2. Pisto ★"));
        assert!(card.contains("Dificultad: Fácil | Tiempo: 25 min"));
        assert!(card.contains("     2. Añadir tomate"));
        assert!(!card.contains("Te falta"));
        assert!(card.contains("Tomate: Es una fruta."));
    }
}
