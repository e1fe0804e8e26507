use thiserror::Error;

use crate::ai::AiError;
use crate::camera::CameraError;
use crate::controller::AppStep;
use crate::storage::StorageError;

/// Errors surfaced by the application flow.
///
/// Every variant is recovered close to the user: it becomes a short advisory
/// on the current screen (see [`AppError::advisory`]), except
/// `PersistenceFailed`, which is only logged.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ingredient identification failed: {0}")]
    IdentifyFailed(#[source] AiError),

    #[error("Recipe generation failed: {0}")]
    GenerateFailed(#[source] AiError),

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(#[source] CameraError),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Favorites persistence failed: {0}")]
    PersistenceFailed(#[source] StorageError),

    #[error("A request is already in progress")]
    Busy,

    #[error("Cannot {action} from {from:?}")]
    InvalidTransition { from: AppStep, action: &'static str },
}

pub const IDENTIFY_FAILED_MESSAGE: &str =
    "No se pudieron identificar los ingredientes. Inténtalo con otra imagen.";
pub const GENERATE_FAILED_MESSAGE: &str =
    "No se pudieron generar las recetas. Intenta ajustar los ingredientes o filtros.";
pub const CAMERA_UNAVAILABLE_MESSAGE: &str =
    "No se pudo acceder a la cámara. Asegúrate de haber dado permiso y que tu dispositivo sea compatible.";
pub const EMPTY_INGREDIENTS_MESSAGE: &str =
    "Añade al menos un ingrediente para generar recetas.";
pub const NO_INGREDIENTS_FOUND_MESSAGE: &str =
    "No se reconocieron ingredientes. Prueba con una foto más clara o añádelos manualmente.";
const PERSISTENCE_FAILED_MESSAGE: &str = "No se pudieron guardar los favoritos.";
const BUSY_MESSAGE: &str = "Espera a que termine la operación en curso.";
const INVALID_TRANSITION_MESSAGE: &str = "Esa acción no está disponible en esta pantalla.";

impl AppError {
    /// Short user-facing message for this error.
    pub fn advisory(&self) -> &str {
        match self {
            AppError::IdentifyFailed(_) => IDENTIFY_FAILED_MESSAGE,
            AppError::GenerateFailed(_) => GENERATE_FAILED_MESSAGE,
            AppError::CameraUnavailable(_) => CAMERA_UNAVAILABLE_MESSAGE,
            AppError::ValidationFailed(message) => message,
            AppError::PersistenceFailed(_) => PERSISTENCE_FAILED_MESSAGE,
            AppError::Busy => BUSY_MESSAGE,
            AppError::InvalidTransition { .. } => INVALID_TRANSITION_MESSAGE,
        }
    }
}
