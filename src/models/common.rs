use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationType {
    Image,
    Video,
}

impl GenerationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationType::Image => "image",
            GenerationType::Video => "video",
        }
    }

    /// File extension used when a result of this kind is written to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            GenerationType::Image => "png",
            GenerationType::Video => "mp4",
        }
    }

    pub fn default_output_count(&self) -> u8 {
        match self {
            GenerationType::Image => 2,
            GenerationType::Video => 1,
        }
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationType {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(GenerationType::Image),
            "video" => Ok(GenerationType::Video),
            other => Err(StudioError::ConfigError(format!(
                "Unknown generation type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub category: GenerationType,
    pub description: String,
}

/// Models the backend routes to, keyed by the mode that selects them.
pub fn supported_models() -> Vec<ModelInfo> {
    let model = |id: &str, name: &str, provider: &str, category, description: &str| ModelInfo {
        id: id.to_string(),
        name: name.to_string(),
        provider: provider.to_string(),
        category,
        description: description.to_string(),
    };

    vec![
        model(
            "gemini-2.5-flash-image-preview",
            "Gemini 2.5 Flash Image",
            "Google",
            GenerationType::Image,
            "House facade: decorates the uploaded map photo",
        ),
        model(
            "imagen-4.0-generate-001",
            "Imagen 4",
            "Google",
            GenerationType::Image,
            "Have fun: text-to-image at 16:9",
        ),
        model(
            "gen4_turbo",
            "Gen-4 Turbo",
            "Runway",
            GenerationType::Video,
            "Bring to life: animates a single start scene",
        ),
        model(
            "gen3a_turbo",
            "Gen-3 Alpha Turbo",
            "Runway",
            GenerationType::Video,
            "Transition: morphs a start scene into an end scene",
        ),
        model(
            "gemini-2.5-flash",
            "Gemini 2.5 Flash",
            "Google",
            GenerationType::Image,
            "Prompt enhancement",
        ),
    ]
}

/// An uploaded file held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            StudioError::MissingInput(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            mime_type: mime_for_path(path).to_string(),
            name,
            bytes,
        })
    }

    pub fn from_data_url(data_url: &str, name: impl Into<String>) -> Result<Self> {
        let (mime_type, bytes) = decode_data_url(data_url)?;
        Ok(Self {
            name: name.into(),
            mime_type,
            bytes,
        })
    }

    pub fn to_data_url(&self) -> String {
        encode_data_url(&self.mime_type, &self.bytes)
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "image/png",
    }
}

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Splits a `data:<mime>;base64,<payload>` URL into its MIME type and bytes.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| StudioError::ResponseError("Not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StudioError::ResponseError("Malformed data URL".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| StudioError::ResponseError("Only base64 data URLs are supported".into()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| StudioError::ResponseError(format!("Invalid base64 payload: {}", e)))?;

    let mime_type = if mime_type.is_empty() {
        "application/octet-stream".to_string()
    } else {
        mime_type.to_string()
    };

    Ok((mime_type, bytes))
}
