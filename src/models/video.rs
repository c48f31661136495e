use serde::{Deserialize, Serialize};

use crate::models::common::MediaFile;
use crate::models::request::VideoSubType;

#[derive(Debug, Clone)]
pub struct VideoGenerationParams {
    pub start_scene: Option<MediaFile>,
    pub end_scene: Option<MediaFile>,
    pub sub_type: VideoSubType,
    pub duration_secs: u32,
    pub prompt: String,
    pub inspiration_images: Vec<MediaFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoParamsPayload {
    pub video_sub_type: VideoSubType,
    pub video_duration: u32,
    pub prompt: String,
}

impl VideoGenerationParams {
    pub fn payload(&self) -> VideoParamsPayload {
        VideoParamsPayload {
            video_sub_type: self.sub_type,
            video_duration: self.duration_secs,
            prompt: self.prompt.clone(),
        }
    }

    pub fn model_id(&self) -> &'static str {
        match self.sub_type {
            VideoSubType::Transition => "gen3a_turbo",
            VideoSubType::Life => "gen4_turbo",
        }
    }

    /// The end scene only travels with transition videos.
    pub fn end_scene_for_upload(&self) -> Option<&MediaFile> {
        match self.sub_type {
            VideoSubType::Transition => self.end_scene.as_ref(),
            VideoSubType::Life => None,
        }
    }
}
