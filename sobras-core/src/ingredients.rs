use serde::{Deserialize, Serialize};

/// The working set of ingredients, in display order and without duplicates.
///
/// Duplicates are detected by exact, case-sensitive string match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientList {
    items: Vec<String>,
}

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from a model response, dropping repeated names.
    pub fn from_identified(names: Vec<String>) -> Self {
        let mut list = Self::new();
        for name in names {
            list.add(&name);
        }
        list
    }

    /// Add an ingredient. Input is trimmed; blank or duplicate names are ignored.
    ///
    /// Returns true if the ingredient was inserted.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.items.push(name.to_string());
        true
    }

    /// Remove an ingredient by exact name. Returns true if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item != name);
        self.items.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }
}
