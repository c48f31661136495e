use std::sync::Arc;

use serde_json::json;

use crate::{
    debug::DebugLog,
    error::{Result, StudioError},
    models::{GenerationResult, GenerationType, ImageGenerationParams},
    service::{
        settle_response,
        traits::{Endpoint, GenerationService, Submission},
    },
};

#[derive(Clone)]
pub struct ImageClient {
    service: Arc<dyn GenerationService>,
}

impl ImageClient {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    pub fn build_submission(params: &ImageGenerationParams) -> Result<Submission> {
        let payload = serde_json::to_value(params.payload())?;
        let mut submission = Submission::new(Endpoint::ImageDesign, payload);

        if let Some(map_file) = &params.map_file {
            submission = submission.with_file("mapFile", map_file.clone());
        }
        for (i, image) in params.inspiration_images.iter().enumerate() {
            submission = submission.with_file(format!("inspirationImage_{}", i), image.clone());
        }

        Ok(submission)
    }

    pub async fn generate(
        &self,
        params: &ImageGenerationParams,
        debug: &DebugLog,
    ) -> Result<GenerationResult> {
        if !params.is_fun_mode && params.map_file.is_none() {
            return Err(StudioError::MissingInput(
                "A map file is required for House Facade generation.".into(),
            ));
        }

        let submission = Self::build_submission(params)?;
        debug.emit(
            "Request to Backend",
            json!({
                "url": self.service.describe(Endpoint::ImageDesign),
                "modelToUse": params.model_id(),
                "params": submission.params,
                "hasMapFile": params.map_file.is_some(),
                "inspirationImageCount": params.inspiration_images.len(),
            }),
        );

        log::info!("Generating image with model: {}", params.model_id());
        let response = self.service.submit(submission).await?;
        let data_url = settle_response(
            self.service.as_ref(),
            response,
            GenerationType::Image,
            debug,
        )
        .await?;

        Ok(GenerationResult::new(GenerationType::Image, data_url))
    }
}
