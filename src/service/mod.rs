pub mod http;
pub mod image_client;
pub mod prompt_client;
pub mod traits;
pub mod video_client;

pub use http::HttpGenerationService;
pub use image_client::ImageClient;
pub use prompt_client::PromptClient;
pub use traits::{BackendResponse, Endpoint, FilePart, GenerationService, Submission};
pub use video_client::VideoClient;

use crate::{
    debug::DebugLog,
    error::{Result, StudioError},
    models::GenerationType,
};

/// Resolves a backend answer into a data URL: forwards `debugInfo`, maps
/// `error` to a failure and downloads media behind plain URLs.
pub(crate) async fn settle_response(
    service: &dyn GenerationService,
    response: BackendResponse,
    kind: GenerationType,
    debug: &DebugLog,
) -> Result<String> {
    if let Some(info) = response.debug_info.clone() {
        debug.forward(info);
    }

    if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
        log::error!("Backend reported a {} generation error: {}", kind, error);
        return Err(StudioError::RemoteError(error.to_string()));
    }

    match response.media_url(kind) {
        Some(url) if url.starts_with("data:") => Ok(url.to_string()),
        Some(url) => service.fetch_media(url, kind).await,
        None => Err(StudioError::ResponseError(format!(
            "Backend did not return {} {} URL.",
            if kind == GenerationType::Image { "an" } else { "a" },
            kind
        ))),
    }
}
