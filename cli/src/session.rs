//! Applies parsed commands to the controller.

use thiserror::Error;

use sobras_core::camera::CameraDevice;
use sobras_core::controller::AppStep;
use sobras_core::{
    load_image_file, AiClient, AppController, AppError, CookingTime, DietaryRestriction,
    ImageError, MealType, Recipe,
};

use crate::commands::{nth, Command};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("No se pudo leer la imagen: {0}")]
    Image(#[from] ImageError),

    #[error("No hay ningún elemento número {0}.")]
    NoSuchItem(usize),
}

impl SessionError {
    /// Message to print below the screen. Errors the controller already
    /// turned into an advisory return None.
    pub fn user_message(&self) -> Option<String> {
        match self {
            SessionError::App(
                AppError::IdentifyFailed(_)
                | AppError::GenerateFailed(_)
                | AppError::CameraUnavailable(_)
                | AppError::ValidationFailed(_),
            ) => None,
            SessionError::App(e) => Some(e.advisory().to_string()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ShowHelp,
    Quit,
}

pub struct Session {
    app: AppController,
    ai_client: Box<dyn AiClient>,
    camera: Box<dyn CameraDevice>,
}

impl Session {
    pub fn new(
        app: AppController,
        ai_client: Box<dyn AiClient>,
        camera: Box<dyn CameraDevice>,
    ) -> Self {
        Self {
            app,
            ai_client,
            camera,
        }
    }

    pub fn app(&self) -> &AppController {
        &self.app
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow, SessionError> {
        tracing::debug!(command = ?command, step = ?self.app.step(), "Executing command");

        match command {
            Command::Photo(path) => {
                let image = load_image_file(&path)?;
                self.app.submit_image(self.ai_client.as_ref(), image).await?;
            }
            Command::Camera => self.app.open_camera(self.camera.as_mut())?,
            Command::Snap => {
                self.app.submit_capture(self.ai_client.as_ref()).await?;
            }
            Command::Cancel => self.app.close_camera(),
            Command::Add(name) => {
                self.app.add_ingredient(&name)?;
            }
            Command::Remove(arg) => {
                let name = match arg.parse::<usize>() {
                    Ok(n) => nth(self.app.ingredients().as_slice(), n)
                        .cloned()
                        .ok_or(SessionError::NoSuchItem(n))?,
                    Err(_) => arg,
                };
                self.app.remove_ingredient(&name)?;
            }
            Command::Meal(n) => {
                let meal_type = nth(MealType::ALL, n).ok_or(SessionError::NoSuchItem(n))?;
                self.app.set_meal_type(*meal_type);
            }
            Command::Time(n) => {
                let time = nth(CookingTime::ALL, n).ok_or(SessionError::NoSuchItem(n))?;
                self.app.set_cooking_time(*time);
            }
            Command::Diet(n) => {
                let restriction =
                    nth(DietaryRestriction::ALL, n).ok_or(SessionError::NoSuchItem(n))?;
                self.app.toggle_restriction(*restriction);
            }
            Command::Generate => {
                self.app.generate_recipes(self.ai_client.as_ref()).await?;
            }
            Command::Fav(n) => {
                let shown: &[Recipe] = match self.app.step() {
                    AppStep::Results => self.app.recipes(),
                    AppStep::Favorites => self.app.favorites().as_slice(),
                    _ => &[],
                };
                let id = nth(shown, n)
                    .map(|r| r.id.clone())
                    .ok_or(SessionError::NoSuchItem(n))?;
                self.app.toggle_favorite(&id);
            }
            Command::Favorites => self.app.show_favorites()?,
            Command::Back => self.app.back_to_ingredients()?,
            Command::Reset => self.app.reset(),
            Command::Help => return Ok(Flow::ShowHelp),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobras_core::ai::prompts::{GENERATE_PROMPT_NAME, IDENTIFY_PROMPT_NAME};
    use sobras_core::{FakeAiClient, Favorites, FavoritesStore, MemoryStore, NoCamera};
    use std::io::Cursor;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(client: FakeAiClient) -> Session {
        let favorites = Favorites::load(FavoritesStore::new(Arc::new(MemoryStore::new())));
        Session::new(
            AppController::new(favorites),
            Box::new(client),
            Box::new(NoCamera),
        )
    }

    fn png_file(dir: &TempDir) -> std::path::PathBuf {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([255, 200, 0]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let path = dir.path().join("nevera.png");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_photo_to_favorite() {
        let dir = TempDir::new().unwrap();
        let mut session = session(FakeAiClient::with_demo_responses());

        session
            .execute(Command::Photo(png_file(&dir)))
            .await
            .unwrap();
        assert_eq!(session.app().step(), AppStep::ConfirmIngredients);

        session.execute(Command::Remove("1".to_string())).await.unwrap();
        assert!(!session.app().ingredients().contains("Tomates"));
        session.execute(Command::Meal(4)).await.unwrap();
        assert_eq!(session.app().filters().meal_type, MealType::MainCourse);
        session.execute(Command::Diet(1)).await.unwrap();

        session.execute(Command::Generate).await.unwrap();
        assert_eq!(session.app().step(), AppStep::Results);

        session.execute(Command::Fav(3)).await.unwrap();
        assert_eq!(session.app().favorites().len(), 1);
        assert!(matches!(
            session.execute(Command::Fav(4)).await,
            Err(SessionError::NoSuchItem(4))
        ));

        session.execute(Command::Favorites).await.unwrap();
        session.execute(Command::Fav(1)).await.unwrap();
        assert!(session.app().favorites().is_empty());
    }

    #[tokio::test]
    async fn test_camera_without_backend() {
        let mut session = session(FakeAiClient::new());
        let err = session.execute(Command::Camera).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::App(AppError::CameraUnavailable(_))
        ));
        assert_eq!(err.user_message(), None);
        assert!(session.app().advisory().is_some());
    }

    #[tokio::test]
    async fn test_invalid_image_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "no es una imagen").unwrap();

        let client = FakeAiClient::new().with_text(IDENTIFY_PROMPT_NAME, "pan");
        let mut session = session(client);
        let err = session.execute(Command::Photo(path)).await.unwrap_err();

        assert!(matches!(err, SessionError::Image(_)));
        assert!(err.user_message().is_some());
        assert_eq!(session.app().step(), AppStep::Welcome);
    }

    #[tokio::test]
    async fn test_wrong_screen_is_reported() {
        let mut session = session(FakeAiClient::new().with_text(GENERATE_PROMPT_NAME, ""));
        let err = session.execute(Command::Back).await.unwrap_err();
        assert!(err.user_message().is_some());

        assert_eq!(
            session.execute(Command::Help).await.unwrap(),
            Flow::ShowHelp
        );
        assert_eq!(session.execute(Command::Quit).await.unwrap(), Flow::Quit);
    }
}
