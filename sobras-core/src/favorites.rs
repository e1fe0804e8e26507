//! Favorite recipes, persisted under a single well-known key.
//!
//! Persistence is best-effort in both directions: a missing or corrupt value
//! loads as an empty list, and a failed save is logged and otherwise ignored.
//! Every mutation rewrites the whole list.

use std::sync::Arc;

use crate::error::AppError;
use crate::storage::{KeyValueStore, StorageError};
use crate::types::Recipe;

/// Storage key holding the JSON array of favorite recipes.
pub const FAVORITES_KEY: &str = "sobrasMagicas-favorites";

/// Reads and writes the serialized favorites list.
#[derive(Clone)]
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn try_load(&self) -> Result<Vec<Recipe>, StorageError> {
        match self.store.get(FAVORITES_KEY)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Load favorites, falling back to an empty list on any error.
    pub fn load(&self) -> Vec<Recipe> {
        match self.try_load() {
            Ok(recipes) => {
                tracing::debug!(count = recipes.len(), "Loaded favorites");
                recipes
            }
            Err(e) => {
                tracing::warn!(error = %AppError::PersistenceFailed(e), "Could not load favorites");
                Vec::new()
            }
        }
    }

    pub fn try_save(&self, recipes: &[Recipe]) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(recipes).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.store.set(FAVORITES_KEY, &json)
    }

    /// Save favorites. Failures are logged, never returned.
    pub fn save(&self, recipes: &[Recipe]) {
        if let Err(e) = self.try_save(recipes) {
            tracing::warn!(error = %AppError::PersistenceFailed(e), "Could not save favorites");
        }
    }
}

/// The in-memory favorites set, written through to its store.
///
/// Membership is by recipe id.
pub struct Favorites {
    recipes: Vec<Recipe>,
    store: FavoritesStore,
}

impl Favorites {
    /// Load the persisted favorites.
    pub fn load(store: FavoritesStore) -> Self {
        let recipes = store.load();
        Self { recipes, store }
    }

    pub fn contains(&self, recipe_id: &str) -> bool {
        self.recipes.iter().any(|r| r.id == recipe_id)
    }

    /// Add the recipe if it is not a favorite, remove it otherwise, then
    /// persist the full list.
    ///
    /// Returns true if the recipe is a favorite afterwards.
    pub fn toggle(&mut self, recipe: &Recipe) -> bool {
        let now_favorite = if self.contains(&recipe.id) {
            self.recipes.retain(|r| r.id != recipe.id);
            false
        } else {
            self.recipes.push(recipe.clone());
            true
        };

        tracing::debug!(
            recipe_id = %recipe.id,
            favorite = now_favorite,
            count = self.recipes.len(),
            "Toggled favorite"
        );
        self.store.save(&self.recipes);
        now_favorite
    }

    pub fn get(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == recipe_id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn as_slice(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }
}
