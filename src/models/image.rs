use serde::{Deserialize, Serialize};

use crate::models::common::MediaFile;

#[derive(Debug, Clone)]
pub struct ImageGenerationParams {
    pub map_file: Option<MediaFile>,
    pub is_fun_mode: bool,
    pub prompt: String,
    pub inspiration_images: Vec<MediaFile>,
}

/// JSON sent in the `params` multipart field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageParamsPayload {
    pub is_fun_mode: bool,
    pub prompt: String,
}

impl ImageGenerationParams {
    pub fn payload(&self) -> ImageParamsPayload {
        ImageParamsPayload {
            is_fun_mode: self.is_fun_mode,
            prompt: self.prompt.clone(),
        }
    }

    pub fn model_id(&self) -> &'static str {
        if self.is_fun_mode {
            "imagen-4.0-generate-001"
        } else {
            "gemini-2.5-flash-image-preview"
        }
    }
}
