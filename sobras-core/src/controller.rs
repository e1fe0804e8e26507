//! The screen flow: Welcome → ConfirmIngredients → Results, with Generating
//! in between whenever a gateway call is outstanding, and Favorites reachable
//! from every settled screen.
//!
//! All state is owned by [`AppController`] and changes only through its
//! transition methods. Gateway calls are split in two phases:
//!
//! 1. `begin_*` validates the transition, moves to `Generating` and returns a
//!    call carrying a [`Ticket`] plus the inputs for the gateway;
//! 2. `complete_*` applies the gateway result, but only if the ticket still
//!    matches the outstanding call. A reset in between makes the ticket stale
//!    and its completion is discarded.
//!
//! Only one call can be outstanding: `begin_*` while `Generating` returns
//! [`AppError::Busy`].

use serde::{Deserialize, Serialize};

use crate::ai::{self, AiClient, AiError};
use crate::camera::{CameraDevice, CameraSession};
use crate::error::{AppError, EMPTY_INGREDIENTS_MESSAGE, NO_INGREDIENTS_FOUND_MESSAGE};
use crate::favorites::Favorites;
use crate::filters::{CookingTime, DietaryRestriction, Filters, MealType};
use crate::image::ImageData;
use crate::ingredients::IngredientList;
use crate::types::Recipe;

/// The screen being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppStep {
    Welcome,
    ConfirmIngredients,
    Generating,
    Results,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Identify,
    Generate,
}

/// Identifies one outstanding gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    kind: CallKind,
}

impl Ticket {
    pub fn kind(&self) -> CallKind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Welcome,
    ConfirmIngredients,
    /// A gateway call is outstanding.
    Generating(Ticket),
    Results,
    Favorites,
}

impl Screen {
    fn step(&self) -> AppStep {
        match self {
            Screen::Welcome => AppStep::Welcome,
            Screen::ConfirmIngredients => AppStep::ConfirmIngredients,
            Screen::Generating(_) => AppStep::Generating,
            Screen::Results => AppStep::Results,
            Screen::Favorites => AppStep::Favorites,
        }
    }
}

/// Inputs for an identify call.
#[derive(Debug, Clone)]
pub struct IdentifyCall {
    pub ticket: Ticket,
    pub image: ImageData,
}

/// Inputs for a generate call.
#[derive(Debug, Clone)]
pub struct GenerateCall {
    pub ticket: Ticket,
    pub ingredients: Vec<String>,
    pub filters: Filters,
}

/// What happened to a gateway result handed to `complete_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The call was superseded (e.g. by a reset); the result was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    Notice,
    Error,
}

/// A short message shown inline on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: AdvisoryKind::Notice,
            message: message.into(),
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            kind: AdvisoryKind::Error,
            message: err.advisory().to_string(),
        }
    }
}

pub struct AppController {
    screen: Screen,
    generation: u64,
    image: Option<ImageData>,
    ingredients: IngredientList,
    filters: Filters,
    recipes: Vec<Recipe>,
    favorites: Favorites,
    camera: Option<CameraSession>,
    advisory: Option<Advisory>,
}

impl AppController {
    pub fn new(favorites: Favorites) -> Self {
        Self {
            screen: Screen::Welcome,
            generation: 0,
            image: None,
            ingredients: IngredientList::new(),
            filters: Filters::default(),
            recipes: Vec::new(),
            favorites,
            camera: None,
            advisory: None,
        }
    }

    pub fn step(&self) -> AppStep {
        self.screen.step()
    }

    /// The outstanding call, if any.
    pub fn pending(&self) -> Option<Ticket> {
        match self.screen {
            Screen::Generating(ticket) => Some(ticket),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn ingredients(&self) -> &IngredientList {
        &self.ingredients
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    pub fn dismiss_advisory(&mut self) {
        self.advisory = None;
    }

    pub fn camera_active(&self) -> bool {
        self.camera.as_ref().is_some_and(|c| c.is_active())
    }

    fn ensure_idle(&self) -> Result<(), AppError> {
        if self.is_pending() {
            return Err(AppError::Busy);
        }
        Ok(())
    }

    fn ensure_step(&self, step: AppStep, action: &'static str) -> Result<(), AppError> {
        if self.step() != step {
            return Err(AppError::InvalidTransition {
                from: self.step(),
                action,
            });
        }
        Ok(())
    }

    fn start_call(&mut self, kind: CallKind) -> Ticket {
        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
            kind,
        };
        self.screen = Screen::Generating(ticket);
        tracing::debug!(generation = ticket.generation, kind = ?kind, "Gateway call started");
        ticket
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.screen == Screen::Generating(ticket)
    }

    // Identify

    /// Start identifying ingredients in a submitted image.
    pub fn begin_identify(&mut self, image: ImageData) -> Result<IdentifyCall, AppError> {
        self.ensure_idle()?;
        self.ensure_step(AppStep::Welcome, "submit an image")?;

        self.close_camera();
        self.advisory = None;
        self.image = Some(image.clone());
        let ticket = self.start_call(CallKind::Identify);

        tracing::info!(
            mime_type = %image.mime_type,
            size = image.bytes.len(),
            "Identifying ingredients"
        );
        Ok(IdentifyCall { ticket, image })
    }

    /// Apply an identify result.
    ///
    /// Success (even with zero ingredients) moves to ConfirmIngredients;
    /// failure rolls back to Welcome and is returned after being turned into
    /// an advisory.
    pub fn complete_identify(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<String>, AiError>,
    ) -> Result<Completion, AppError> {
        if ticket.kind != CallKind::Identify || !self.is_current(ticket) {
            tracing::debug!(generation = ticket.generation, "Discarding stale identify result");
            return Ok(Completion::Stale);
        }

        match result {
            Ok(names) => {
                self.ingredients = IngredientList::from_identified(names);
                self.advisory = if self.ingredients.is_empty() {
                    Some(Advisory::notice(NO_INGREDIENTS_FOUND_MESSAGE))
                } else {
                    None
                };
                self.screen = Screen::ConfirmIngredients;
                tracing::info!(count = self.ingredients.len(), "Ingredients identified");
                Ok(Completion::Applied)
            }
            Err(e) => {
                let err = AppError::IdentifyFailed(e);
                tracing::warn!(error = %err, "Ingredient identification failed");
                self.advisory = Some(Advisory::error(&err));
                self.image = None;
                self.screen = Screen::Welcome;
                Err(err)
            }
        }
    }

    /// Identify ingredients in an image, start to finish.
    pub async fn submit_image(
        &mut self,
        ai_client: &dyn AiClient,
        image: ImageData,
    ) -> Result<Completion, AppError> {
        let call = self.begin_identify(image)?;
        let result = ai::identify_ingredients(ai_client, &call.image).await;
        self.complete_identify(call.ticket, result)
    }

    // Camera

    /// Open the live camera preview. At most one stream is held; opening
    /// again while a preview is active does nothing.
    ///
    /// Failure leaves the screen unchanged and shows an advisory.
    pub fn open_camera(&mut self, device: &mut dyn CameraDevice) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.ensure_step(AppStep::Welcome, "open the camera")?;
        if self.camera_active() {
            return Ok(());
        }

        self.advisory = None;
        match CameraSession::open(device) {
            Ok(session) => {
                self.camera = Some(session);
                Ok(())
            }
            Err(e) => {
                let err = AppError::CameraUnavailable(e);
                tracing::warn!(error = %err, "Could not open camera");
                self.advisory = Some(Advisory::error(&err));
                Err(err)
            }
        }
    }

    /// Freeze the current camera frame and start identifying it.
    pub fn capture_photo(&mut self) -> Result<IdentifyCall, AppError> {
        self.ensure_idle()?;
        let session = self
            .camera
            .as_mut()
            .filter(|c| c.is_active())
            .ok_or(AppError::InvalidTransition {
                from: self.screen.step(),
                action: "capture a photo",
            })?;

        let image = match session.capture() {
            Ok(image) => image,
            Err(e) => {
                let err = AppError::CameraUnavailable(e);
                tracing::warn!(error = %err, "Camera capture failed");
                self.advisory = Some(Advisory::error(&err));
                return Err(err);
            }
        };
        self.camera = None;
        self.begin_identify(image)
    }

    /// Capture a photo and identify its ingredients, start to finish.
    pub async fn submit_capture(
        &mut self,
        ai_client: &dyn AiClient,
    ) -> Result<Completion, AppError> {
        let call = self.capture_photo()?;
        let result = ai::identify_ingredients(ai_client, &call.image).await;
        self.complete_identify(call.ticket, result)
    }

    /// Close the camera preview without capturing.
    pub fn close_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.cancel();
        }
    }

    // Ingredients and filters

    pub fn add_ingredient(&mut self, name: &str) -> Result<bool, AppError> {
        self.ensure_step(AppStep::ConfirmIngredients, "add an ingredient")?;
        Ok(self.ingredients.add(name))
    }

    pub fn remove_ingredient(&mut self, name: &str) -> Result<bool, AppError> {
        self.ensure_step(AppStep::ConfirmIngredients, "remove an ingredient")?;
        Ok(self.ingredients.remove(name))
    }

    pub fn set_meal_type(&mut self, meal_type: MealType) {
        self.filters.meal_type = meal_type;
    }

    pub fn set_cooking_time(&mut self, cooking_time: CookingTime) {
        self.filters.cooking_time = cooking_time;
    }

    /// Returns true if the restriction is selected afterwards.
    pub fn toggle_restriction(&mut self, restriction: DietaryRestriction) -> bool {
        self.filters.toggle_restriction(restriction)
    }

    // Generate

    /// Start generating recipes for the confirmed ingredients.
    ///
    /// With no ingredients nothing is sent: the screen stays on
    /// ConfirmIngredients with a validation advisory.
    pub fn begin_generate(&mut self) -> Result<GenerateCall, AppError> {
        self.ensure_idle()?;
        self.ensure_step(AppStep::ConfirmIngredients, "generate recipes")?;

        if self.ingredients.is_empty() {
            let err = AppError::ValidationFailed(EMPTY_INGREDIENTS_MESSAGE.to_string());
            self.advisory = Some(Advisory::error(&err));
            return Err(err);
        }

        self.advisory = None;
        self.recipes.clear();
        let ticket = self.start_call(CallKind::Generate);

        tracing::info!(
            ingredients = self.ingredients.len(),
            meal_type = ?self.filters.meal_type,
            cooking_time = ?self.filters.cooking_time,
            "Generating recipes"
        );
        Ok(GenerateCall {
            ticket,
            ingredients: self.ingredients.as_slice().to_vec(),
            filters: self.filters.clone(),
        })
    }

    /// Apply a generate result: Results on success, back to
    /// ConfirmIngredients on failure.
    pub fn complete_generate(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Recipe>, AiError>,
    ) -> Result<Completion, AppError> {
        if ticket.kind != CallKind::Generate || !self.is_current(ticket) {
            tracing::debug!(generation = ticket.generation, "Discarding stale generate result");
            return Ok(Completion::Stale);
        }

        match result {
            Ok(recipes) => {
                tracing::info!(count = recipes.len(), "Recipes generated");
                self.recipes = recipes;
                self.screen = Screen::Results;
                Ok(Completion::Applied)
            }
            Err(e) => {
                let err = AppError::GenerateFailed(e);
                tracing::warn!(error = %err, "Recipe generation failed");
                self.advisory = Some(Advisory::error(&err));
                self.screen = Screen::ConfirmIngredients;
                Err(err)
            }
        }
    }

    /// Generate recipes, start to finish.
    pub async fn generate_recipes(
        &mut self,
        ai_client: &dyn AiClient,
    ) -> Result<Completion, AppError> {
        let call = self.begin_generate()?;
        let result = ai::generate_recipes(ai_client, &call.ingredients, &call.filters).await;
        self.complete_generate(call.ticket, result)
    }

    // Navigation

    /// Leave Results for ConfirmIngredients, discarding the recipes.
    pub fn back_to_ingredients(&mut self) -> Result<(), AppError> {
        self.ensure_step(AppStep::Results, "go back to ingredients")?;
        self.recipes.clear();
        self.advisory = None;
        self.screen = Screen::ConfirmIngredients;
        Ok(())
    }

    /// Show the favorites list. Other state is kept.
    pub fn show_favorites(&mut self) -> Result<(), AppError> {
        self.ensure_idle()?;
        self.close_camera();
        self.screen = Screen::Favorites;
        Ok(())
    }

    /// Return to Welcome from anywhere, clearing the image, ingredients,
    /// recipes and advisory. Any outstanding call becomes stale and any open
    /// camera stream is released.
    pub fn reset(&mut self) {
        self.close_camera();
        self.generation += 1;
        self.image = None;
        self.ingredients.clear();
        self.recipes.clear();
        self.advisory = None;
        self.screen = Screen::Welcome;
        tracing::debug!(generation = self.generation, "Flow reset");
    }

    // Favorites

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites.contains(recipe_id)
    }

    /// Toggle a recipe from the current results or the favorites list.
    ///
    /// Returns whether it is a favorite afterwards, or None if no such
    /// recipe is shown.
    pub fn toggle_favorite(&mut self, recipe_id: &str) -> Option<bool> {
        let recipe = self
            .recipes
            .iter()
            .find(|r| r.id == recipe_id)
            .or_else(|| self.favorites.get(recipe_id))
            .cloned()?;
        Some(self.favorites.toggle(&recipe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FavoritesStore;
    use crate::storage::MemoryStore;
    use crate::types::Difficulty;
    use std::sync::Arc;

    fn controller() -> AppController {
        AppController::new(Favorites::load(FavoritesStore::new(Arc::new(
            MemoryStore::new(),
        ))))
    }

    fn image() -> ImageData {
        ImageData::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg")
    }

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            used_ingredients: vec![],
            missing_ingredients: vec![],
            steps: vec![],
            difficulty: Difficulty::Easy,
            prep_time: "5 min".to_string(),
            dietary_tags: vec![],
            ingredient_facts: vec![],
        }
    }

    fn at_confirm(names: &[&str]) -> AppController {
        let mut app = controller();
        let call = app.begin_identify(image()).unwrap();
        app.complete_identify(call.ticket, Ok(names.iter().map(|s| s.to_string()).collect()))
            .unwrap();
        app
    }

    #[test]
    fn test_initial_state() {
        let app = controller();
        assert_eq!(app.step(), AppStep::Welcome);
        assert!(!app.is_pending());
        assert!(app.advisory().is_none());
    }

    #[test]
    fn test_identify_success() {
        let mut app = controller();
        let call = app.begin_identify(image()).unwrap();
        assert_eq!(app.step(), AppStep::Generating);
        assert_eq!(app.pending(), Some(call.ticket));

        let completion = app
            .complete_identify(call.ticket, Ok(vec!["Ajo".to_string(), "Ajo".to_string()]))
            .unwrap();
        assert_eq!(completion, Completion::Applied);
        assert_eq!(app.step(), AppStep::ConfirmIngredients);
        assert_eq!(app.ingredients().as_slice(), &["Ajo"]);
        assert!(app.image().is_some());
    }

    #[test]
    fn test_identify_empty_is_notice_not_error() {
        let app = at_confirm(&[]);
        assert_eq!(app.step(), AppStep::ConfirmIngredients);
        assert!(app.ingredients().is_empty());
        let advisory = app.advisory().unwrap();
        assert_eq!(advisory.kind, AdvisoryKind::Notice);
        assert_eq!(advisory.message, NO_INGREDIENTS_FOUND_MESSAGE);
    }

    #[test]
    fn test_identify_failure_rolls_back_to_welcome() {
        let mut app = controller();
        let call = app.begin_identify(image()).unwrap();
        let result =
            app.complete_identify(call.ticket, Err(AiError::RequestFailed("offline".into())));

        assert!(matches!(result, Err(AppError::IdentifyFailed(_))));
        assert_eq!(app.step(), AppStep::Welcome);
        assert_eq!(app.advisory().unwrap().kind, AdvisoryKind::Error);
        assert!(app.image().is_none());
    }

    #[test]
    fn test_second_submission_while_pending_is_rejected() {
        let mut app = controller();
        let call = app.begin_identify(image()).unwrap();
        assert!(matches!(app.begin_identify(image()), Err(AppError::Busy)));
        assert!(matches!(app.show_favorites(), Err(AppError::Busy)));
        assert_eq!(app.pending(), Some(call.ticket));
    }

    #[test]
    fn test_generate_with_no_ingredients_is_validation_error() {
        let mut app = at_confirm(&[]);
        let result = app.begin_generate();
        assert!(matches!(result, Err(AppError::ValidationFailed(_))));
        assert_eq!(app.step(), AppStep::ConfirmIngredients);
        assert_eq!(app.advisory().unwrap().message, EMPTY_INGREDIENTS_MESSAGE);
    }

    #[test]
    fn test_generate_success_and_back() {
        let mut app = at_confirm(&["Arroz"]);
        app.set_meal_type(MealType::MainCourse);
        let call = app.begin_generate().unwrap();
        assert_eq!(call.ingredients, vec!["Arroz"]);
        assert_eq!(call.filters.meal_type, MealType::MainCourse);

        app.complete_generate(call.ticket, Ok(vec![recipe("a"), recipe("b"), recipe("c")]))
            .unwrap();
        assert_eq!(app.step(), AppStep::Results);
        assert_eq!(app.recipes().len(), 3);

        app.back_to_ingredients().unwrap();
        assert_eq!(app.step(), AppStep::ConfirmIngredients);
        assert!(app.recipes().is_empty());
        assert_eq!(app.ingredients().as_slice(), &["Arroz"]);
    }

    #[test]
    fn test_generate_failure_returns_to_confirm() {
        let mut app = at_confirm(&["Arroz"]);
        let call = app.begin_generate().unwrap();
        let result = app.complete_generate(call.ticket, Err(AiError::ParseError("x".into())));
        assert!(matches!(result, Err(AppError::GenerateFailed(_))));
        assert_eq!(app.step(), AppStep::ConfirmIngredients);
        assert_eq!(app.advisory().unwrap().kind, AdvisoryKind::Error);
    }

    #[test]
    fn test_completion_after_reset_is_discarded() {
        let mut app = controller();
        let call = app.begin_identify(image()).unwrap();
        app.reset();

        let completion = app
            .complete_identify(call.ticket, Ok(vec!["Queso".to_string()]))
            .unwrap();
        assert_eq!(completion, Completion::Stale);
        assert_eq!(app.step(), AppStep::Welcome);
        assert!(app.ingredients().is_empty());
    }

    #[test]
    fn test_ticket_from_earlier_call_is_stale() {
        let mut app = at_confirm(&["Arroz"]);
        let first = app.begin_generate().unwrap();
        app.reset();

        let call = app.begin_identify(image()).unwrap();
        assert_eq!(
            app.complete_generate(first.ticket, Ok(vec![])).unwrap(),
            Completion::Stale
        );
        assert_eq!(app.pending(), Some(call.ticket));
    }

    #[test]
    fn test_ingredient_edits_only_on_confirm_screen() {
        let mut app = controller();
        assert!(matches!(
            app.add_ingredient("Sal"),
            Err(AppError::InvalidTransition { .. })
        ));

        let mut app = at_confirm(&["Sal"]);
        assert!(app.add_ingredient("Pimienta").unwrap());
        assert!(!app.add_ingredient("Sal").unwrap());
        assert!(app.remove_ingredient("Sal").unwrap());
        assert_eq!(app.ingredients().as_slice(), &["Pimienta"]);
    }

    #[test]
    fn test_favorites_navigation_keeps_context() {
        let mut app = at_confirm(&["Arroz"]);
        app.show_favorites().unwrap();
        assert_eq!(app.step(), AppStep::Favorites);
        assert_eq!(app.ingredients().as_slice(), &["Arroz"]);

        app.reset();
        assert_eq!(app.step(), AppStep::Welcome);
        assert!(app.ingredients().is_empty());
    }

    #[test]
    fn test_toggle_favorite_from_results_and_favorites() {
        let mut app = at_confirm(&["Arroz"]);
        let call = app.begin_generate().unwrap();
        app.complete_generate(call.ticket, Ok(vec![recipe("a"), recipe("b"), recipe("c")]))
            .unwrap();

        assert_eq!(app.toggle_favorite("b"), Some(true));
        assert!(app.is_favorite("b"));

        app.reset();
        app.show_favorites().unwrap();
        assert_eq!(app.toggle_favorite("b"), Some(false));
        assert_eq!(app.toggle_favorite("b"), None);
        assert!(app.favorites().is_empty());
    }

    #[test]
    fn test_reset_keeps_filters() {
        let mut app = controller();
        app.toggle_restriction(DietaryRestriction::Vegan);
        app.reset();
        assert!(app
            .filters()
            .restrictions
            .contains(&DietaryRestriction::Vegan));
    }
}
