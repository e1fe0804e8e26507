pub mod ai;
pub mod asset_cache;
pub mod camera;
pub mod controller;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod image;
pub mod ingredients;
pub mod install;
pub mod storage;
pub mod types;

pub use ai::{create_client, create_client_from_env, AiClient, AiConfig, AiError, FakeAiClient};
pub use asset_cache::{AssetCacheWorker, AssetRequest, AssetResponse, FetchOutcome};
pub use camera::{CameraDevice, CameraError, CameraSession, NoCamera, VideoStream};
pub use controller::{
    Advisory, AdvisoryKind, AppController, AppStep, Completion, GenerateCall, IdentifyCall, Ticket,
};
pub use error::AppError;
pub use favorites::{Favorites, FavoritesStore, FAVORITES_KEY};
pub use filters::{CookingTime, DietaryRestriction, Filters, MealType};
pub use image::{load_image_file, validate_image, ImageData, ImageError, MAX_FILE_SIZE};
pub use ingredients::IngredientList;
pub use install::{DeferredInstallPrompt, InstallOutcome, InstallPrompt};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use types::{Difficulty, IngredientFact, Recipe};
