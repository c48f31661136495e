use std::sync::Arc;

use serde_json::json;

use crate::{
    debug::DebugLog,
    error::{Result, StudioError},
    models::{GenerationResult, GenerationType, VideoGenerationParams},
    service::{
        settle_response,
        traits::{Endpoint, GenerationService, Submission},
    },
};

#[derive(Clone)]
pub struct VideoClient {
    service: Arc<dyn GenerationService>,
}

impl VideoClient {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    pub fn build_submission(params: &VideoGenerationParams) -> Result<Submission> {
        let payload = serde_json::to_value(params.payload())?;
        let mut submission = Submission::new(Endpoint::Video, payload);

        if let Some(start) = &params.start_scene {
            submission = submission.with_file("startSceneFile", start.clone());
        }
        if let Some(end) = params.end_scene_for_upload() {
            submission = submission.with_file("endSceneFile", end.clone());
        }
        for (i, image) in params.inspiration_images.iter().enumerate() {
            submission = submission.with_file(format!("inspirationImage_{}", i), image.clone());
        }

        Ok(submission)
    }

    pub async fn generate(
        &self,
        params: &VideoGenerationParams,
        debug: &DebugLog,
    ) -> Result<GenerationResult> {
        if params.start_scene.is_none() {
            return Err(StudioError::MissingInput(
                "A start scene is required for video generation.".into(),
            ));
        }

        let submission = Self::build_submission(params)?;
        debug.emit(
            "Request to Backend",
            json!({
                "url": self.service.describe(Endpoint::Video),
                "modelToUse": params.model_id(),
                "params": {
                    "videoSubType": params.sub_type.as_str(),
                    "videoDuration": params.duration_secs,
                    "prompt": params.prompt,
                    "hasStartScene": params.start_scene.is_some(),
                    "hasEndScene": params.end_scene.is_some(),
                    "inspirationImageCount": params.inspiration_images.len(),
                },
            }),
        );

        log::info!(
            "Generating {}s video with model: {}",
            params.duration_secs,
            params.model_id()
        );
        let response = self.service.submit(submission).await?;
        let data_url = settle_response(
            self.service.as_ref(),
            response,
            GenerationType::Video,
            debug,
        )
        .await?;

        Ok(GenerationResult::new(GenerationType::Video, data_url))
    }
}
