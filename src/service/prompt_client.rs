use std::sync::Arc;

use serde_json::json;

use crate::{
    debug::DebugLog,
    error::{Result, StudioError},
    service::traits::{Endpoint, GenerationService, Submission},
};

/// Turns a short idea into a detailed generation prompt.
#[derive(Clone)]
pub struct PromptClient {
    service: Arc<dyn GenerationService>,
}

impl PromptClient {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    pub async fn enhance(&self, prompt: &str, debug: &DebugLog) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::MissingInput(
                "Enter a prompt before enhancing it.".into(),
            ));
        }

        let params = json!({ "prompt": prompt });
        debug.emit(
            "Request to Backend",
            json!({
                "url": self.service.describe(Endpoint::PromptEnhancement),
                "params": params,
            }),
        );

        let response = self
            .service
            .submit(Submission::new(Endpoint::PromptEnhancement, params))
            .await?;

        if let Some(info) = response.debug_info {
            debug.forward(info);
        }
        if let Some(error) = response.error {
            return Err(StudioError::RemoteError(error));
        }

        let enhanced = response
            .enhanced_prompt
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        if enhanced.is_empty() {
            return Err(StudioError::ResponseError(
                "The AI could not enhance the prompt. Please try again.".into(),
            ));
        }

        Ok(enhanced)
    }
}
