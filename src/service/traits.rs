use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::Result,
    models::{GenerationType, MediaFile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ImageDesign,
    Video,
    PromptEnhancement,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file: MediaFile,
}

/// A multipart submission: binary file parts plus one JSON `params` part.
#[derive(Debug, Clone)]
pub struct Submission {
    pub endpoint: Endpoint,
    pub files: Vec<FilePart>,
    pub params: Value,
}

impl Submission {
    pub fn new(endpoint: Endpoint, params: Value) -> Self {
        Self {
            endpoint,
            files: Vec::new(),
            params,
        }
    }

    pub fn with_file(mut self, field: impl Into<String>, file: MediaFile) -> Self {
        self.files.push(FilePart {
            field: field.into(),
            file,
        });
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.files.iter().map(|part| part.field.as_str()).collect()
    }
}

/// JSON body returned by every backend function.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<Value>,
}

impl BackendResponse {
    pub fn media_url(&self, kind: GenerationType) -> Option<&str> {
        match kind {
            GenerationType::Image => self.image_url.as_deref(),
            GenerationType::Video => self.video_url.as_deref(),
        }
        .filter(|url| !url.is_empty())
    }
}

/// The remote generation boundary.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn submit(&self, submission: Submission) -> Result<BackendResponse>;

    /// Downloads media behind a non-data URL and returns it as a data URL.
    async fn fetch_media(&self, url: &str, kind: GenerationType) -> Result<String>;

    /// Where `endpoint` lives, for debug output.
    fn describe(&self, endpoint: Endpoint) -> String;
}
