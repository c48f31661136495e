use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;

use crate::{
    config::{Config, PreprocessConfig},
    debug::DebugLog,
    error::{Result, StudioError},
    logger::Timer,
    models::{
        theme_prompt, Canvas, GenerationRequest, GenerationResult, ImageGenerationParams,
        ImageSubType, MediaFile, VideoGenerationParams, VideoSubType,
    },
    preprocess::preprocess_with,
    service::{GenerationService, HttpGenerationService, ImageClient, PromptClient, VideoClient},
};

/// Runs `count` independent calls concurrently and waits for all of them.
///
/// One failure never cancels its siblings. Successes come back in slot
/// order; if there are none, the first failure (by slot) is returned.
/// Failures next to at least one success are logged and published on
/// `debug`, not returned.
pub async fn fan_out<T, F, Fut>(count: usize, debug: &DebugLog, mut make: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let settled = join_all((0..count).map(|slot| make(slot))).await;

    let mut successes = Vec::with_capacity(count);
    let mut failures = Vec::new();
    for (slot, outcome) in settled.into_iter().enumerate() {
        match outcome {
            Ok(value) => successes.push(value),
            Err(e) => failures.push((slot, e)),
        }
    }

    if successes.is_empty() {
        log::error!("All {} generation request(s) failed", count);
        return Err(failures
            .into_iter()
            .next()
            .map(|(_, e)| e)
            .unwrap_or(StudioError::AllFailed));
    }

    for (slot, e) in &failures {
        log::warn!("Generation slot {} of {} failed: {}", slot + 1, count, e);
        debug.emit(
            "Partial Failure",
            json!({ "slot": slot, "of": count, "error": e.user_message() }),
        );
    }

    Ok(successes)
}

/// Entry point for a whole submission: validation, preprocessing and the
/// fan-out to the image or video backend.
#[derive(Clone)]
pub struct Studio {
    image_client: ImageClient,
    video_client: VideoClient,
    prompt_client: PromptClient,
    preprocess: Option<PreprocessConfig>,
}

impl Studio {
    pub fn new(config: &Config) -> Result<Self> {
        let service = HttpGenerationService::new(config.backend.clone())?;
        Ok(Self::with_service(Arc::new(service), config.preprocess))
    }

    pub fn with_service(
        service: Arc<dyn GenerationService>,
        preprocess: Option<PreprocessConfig>,
    ) -> Self {
        Self {
            image_client: ImageClient::new(service.clone()),
            video_client: VideoClient::new(service.clone()),
            prompt_client: PromptClient::new(service),
            preprocess,
        }
    }

    pub async fn enhance_prompt(&self, prompt: &str, debug: &DebugLog) -> Result<String> {
        self.prompt_client.enhance(prompt, debug).await
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        debug: &DebugLog,
    ) -> Result<Vec<GenerationResult>> {
        request.validate()?;

        let _timer = Timer::new(&format!(
            "{} generation x{}",
            request.generation_type(),
            request.output_count
        ));
        let count = request.output_count as usize;
        let inspiration_images = self.collect_inspiration(request)?;
        let prompt = theme_prompt(&request.theme);

        match &request.canvas {
            Canvas::Image { sub_type, map_file } => {
                let params = ImageGenerationParams {
                    map_file: self.prepare(map_file.as_ref())?,
                    is_fun_mode: *sub_type == ImageSubType::Fun,
                    prompt,
                    inspiration_images,
                };
                let params = &params;
                fan_out(count, debug, |_| self.image_client.generate(params, debug)).await
            }
            Canvas::Video {
                sub_type,
                start_scene,
                end_scene,
                duration_secs,
            } => {
                let params = VideoGenerationParams {
                    start_scene: self.prepare(start_scene.as_ref())?,
                    end_scene: match sub_type {
                        VideoSubType::Transition => self.prepare(end_scene.as_ref())?,
                        VideoSubType::Life => None,
                    },
                    sub_type: *sub_type,
                    duration_secs: *duration_secs,
                    prompt,
                    inspiration_images,
                };
                let params = &params;
                fan_out(count, debug, |_| self.video_client.generate(params, debug)).await
            }
        }
    }

    /// Fresh uploads first, then the picked saved inspiration decoded back
    /// into files.
    fn collect_inspiration(&self, request: &GenerationRequest) -> Result<Vec<MediaFile>> {
        let mut files = request.theme.inspiration_images.clone();
        for (i, data_url) in request.theme.selected_inspiration.iter().enumerate() {
            files.push(MediaFile::from_data_url(
                data_url,
                format!("saved-inspiration-{}.png", i),
            )?);
        }
        Ok(files)
    }

    fn prepare(&self, file: Option<&MediaFile>) -> Result<Option<MediaFile>> {
        match (file, &self.preprocess) {
            (Some(file), Some(config)) => preprocess_with(file, config).map(Some),
            (file, _) => Ok(file.cloned()),
        }
    }
}
