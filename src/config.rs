use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StudioError};

pub const DEFAULT_IMAGE_ENDPOINT: &str = "/generateGeminiDesign";
pub const DEFAULT_VIDEO_ENDPOINT: &str = "/generateRunwayVideo";
pub const DEFAULT_ENHANCE_ENDPOINT: &str = "/enhanceTextPrompt";
pub const DEFAULT_INSPIRATION_PATH: &str = "saved_inspiration.json";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub image_endpoint: String,
    pub video_endpoint: String,
    pub enhance_endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessConfig {
    pub max_width: u32,
    pub max_height: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub preprocess: Option<PreprocessConfig>,
    pub inspiration_path: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: None,
            image_endpoint: DEFAULT_IMAGE_ENDPOINT.to_string(),
            video_endpoint: DEFAULT_VIDEO_ENDPOINT.to_string(),
            enhance_endpoint: DEFAULT_ENHANCE_ENDPOINT.to_string(),
            timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("FACADEGEN_BACKEND_URL").ok();
        let image_endpoint =
            env::var("FACADEGEN_IMAGE_ENDPOINT").unwrap_or(defaults.image_endpoint);
        let video_endpoint =
            env::var("FACADEGEN_VIDEO_ENDPOINT").unwrap_or(defaults.video_endpoint);
        let enhance_endpoint =
            env::var("FACADEGEN_ENHANCE_ENDPOINT").unwrap_or(defaults.enhance_endpoint);
        let timeout_secs = env::var("FACADEGEN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        BackendConfig {
            base_url,
            image_endpoint,
            video_endpoint,
            enhance_endpoint,
            timeout_secs,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_endpoints(
        mut self,
        image: impl Into<String>,
        video: impl Into<String>,
        enhance: impl Into<String>,
    ) -> Self {
        self.image_endpoint = image.into();
        self.video_endpoint = video.into();
        self.enhance_endpoint = enhance.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins the base URL and an endpoint path without doubling slashes.
    pub fn url_for(&self, endpoint: &str) -> Result<String> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| StudioError::ConfigError("Backend base URL is required".into()))?;

        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(endpoint.to_string());
        }

        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        ))
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        PreprocessConfig {
            max_width: 1280,
            max_height: 720,
        }
    }
}

impl PreprocessConfig {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        PreprocessConfig {
            max_width,
            max_height,
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_width = env::var("FACADEGEN_PREPROCESS_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_width);
        let max_height = env::var("FACADEGEN_PREPROCESS_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_height);

        PreprocessConfig {
            max_width,
            max_height,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendConfig::default(),
            preprocess: Some(PreprocessConfig::default()),
            inspiration_path: PathBuf::from(DEFAULT_INSPIRATION_PATH),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let preprocess = match env::var("FACADEGEN_PREPROCESS").ok().as_deref() {
            Some("false") | Some("0") | Some("off") => None,
            _ => Some(PreprocessConfig::from_env()),
        };
        let inspiration_path = env::var("FACADEGEN_INSPIRATION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_INSPIRATION_PATH));

        Config {
            backend: BackendConfig::from_env(),
            preprocess,
            inspiration_path,
        }
    }

    pub fn with_backend(mut self, config: BackendConfig) -> Self {
        self.backend = config;
        self
    }

    pub fn with_preprocess(mut self, config: PreprocessConfig) -> Self {
        self.preprocess = Some(config);
        self
    }

    pub fn without_preprocess(mut self) -> Self {
        self.preprocess = None;
        self
    }

    pub fn with_inspiration_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inspiration_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_paths() {
        let config = BackendConfig::new().with_base_url("https://example.test/api/");
        assert_eq!(
            config.url_for(DEFAULT_IMAGE_ENDPOINT).unwrap(),
            "https://example.test/api/generateGeminiDesign"
        );
        assert_eq!(
            config.url_for("https://other.test/x").unwrap(),
            "https://other.test/x"
        );
    }

    #[test]
    fn test_url_for_requires_base() {
        let err = BackendConfig::new().url_for(DEFAULT_VIDEO_ENDPOINT).unwrap_err();
        assert!(matches!(err, StudioError::ConfigError(_)));
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_backend(BackendConfig::new().with_timeout(30))
            .with_preprocess(PreprocessConfig::new(640, 480))
            .with_inspiration_path("/tmp/inspo.json");
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));
        assert_eq!(config.preprocess, Some(PreprocessConfig::new(640, 480)));
        assert_eq!(config.inspiration_path, PathBuf::from("/tmp/inspo.json"));
        assert!(config.without_preprocess().preprocess.is_none());
    }
}
