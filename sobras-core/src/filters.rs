//! Recipe filters chosen on the ingredient confirmation screen.
//!
//! Each choice has a stable id (used by front ends and tests) and a Spanish
//! label, which is what gets embedded in the generation prompt.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Label used in prompts when a single-choice filter is unset.
pub const ANY_LABEL: &str = "Cualquiera";

/// Label used in prompts when no dietary restriction is selected.
pub const NONE_LABEL: &str = "Ninguna";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    #[default]
    Any,
    Salad,
    Soup,
    MainCourse,
    Dessert,
    Appetizer,
    Oven,
    Pan,
}

impl MealType {
    pub const ALL: &'static [MealType] = &[
        MealType::Any,
        MealType::Salad,
        MealType::Soup,
        MealType::MainCourse,
        MealType::Dessert,
        MealType::Appetizer,
        MealType::Oven,
        MealType::Pan,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Any => ANY_LABEL,
            MealType::Salad => "Ensalada",
            MealType::Soup => "Sopa",
            MealType::MainCourse => "Plato principal",
            MealType::Dessert => "Postre",
            MealType::Appetizer => "Aperitivo",
            MealType::Oven => "Horno",
            MealType::Pan => "Sartén",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookingTime {
    #[default]
    Any,
    Under15Min,
    Under30Min,
    Under1Hour,
    Over1Hour,
}

impl CookingTime {
    pub const ALL: &'static [CookingTime] = &[
        CookingTime::Any,
        CookingTime::Under15Min,
        CookingTime::Under30Min,
        CookingTime::Under1Hour,
        CookingTime::Over1Hour,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CookingTime::Any => ANY_LABEL,
            CookingTime::Under15Min => "< 15 min",
            CookingTime::Under30Min => "< 30 min",
            CookingTime::Under1Hour => "< 1 hora",
            CookingTime::Over1Hour => "> 1 hora",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryRestriction {
    Vegan,
    Vegetarian,
    GlutenFree,
    LactoseFree,
    LowCarb,
}

impl DietaryRestriction {
    pub const ALL: &'static [DietaryRestriction] = &[
        DietaryRestriction::Vegan,
        DietaryRestriction::Vegetarian,
        DietaryRestriction::GlutenFree,
        DietaryRestriction::LactoseFree,
        DietaryRestriction::LowCarb,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DietaryRestriction::Vegan => "vegano",
            DietaryRestriction::Vegetarian => "vegetariano",
            DietaryRestriction::GlutenFree => "sin-gluten",
            DietaryRestriction::LactoseFree => "sin-lactosa",
            DietaryRestriction::LowCarb => "bajo-en-carbohidratos",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DietaryRestriction::Vegan => "Vegano",
            DietaryRestriction::Vegetarian => "Vegetariano",
            DietaryRestriction::GlutenFree => "Sin Gluten",
            DietaryRestriction::LactoseFree => "Sin Lactosa",
            DietaryRestriction::LowCarb => "Bajo en Carbohidratos",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.id() == id)
    }
}

/// The user's recipe preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub meal_type: MealType,
    pub restrictions: BTreeSet<DietaryRestriction>,
    pub cooking_time: CookingTime,
}

impl Filters {
    /// Select the restriction if absent, deselect it otherwise.
    ///
    /// Returns true if the restriction is selected afterwards.
    pub fn toggle_restriction(&mut self, restriction: DietaryRestriction) -> bool {
        if self.restrictions.remove(&restriction) {
            false
        } else {
            self.restrictions.insert(restriction);
            true
        }
    }

    /// Comma-separated restriction labels, or "Ninguna".
    pub fn restrictions_label(&self) -> String {
        if self.restrictions.is_empty() {
            return NONE_LABEL.to_string();
        }
        self.restrictions
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
