pub mod config;
pub mod debug;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod preprocess;
pub mod service;
pub mod storage;

pub use config::{BackendConfig, Config, PreprocessConfig};
pub use debug::{DebugEvent, DebugLog, DebugStream};
pub use error::{parse_api_error, Result, StudioError, Thrown};
pub use models::{
    GenerationRequest, GenerationRequestBuilder, GenerationResult, GenerationType, ImageSubType,
    MediaFile, ResultGallery, SurpriseTheme, ThemeTab, VideoSubType,
};
pub use orchestrator::{fan_out, Studio};
pub use preprocess::preprocess_image;
pub use service::{GenerationService, HttpGenerationService, ImageClient, PromptClient, VideoClient};
pub use storage::{InspirationStore, KeyValueStorage};
