use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::models::common::{GenerationType, MediaFile};

pub const ALLOWED_OUTPUT_COUNTS: [u8; 3] = [1, 2, 4];
pub const MIN_VIDEO_DURATION_SECS: u32 = 5;
pub const MAX_VIDEO_DURATION_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSubType {
    /// Decorate the uploaded house map.
    Facade,
    /// Free text-to-image, no map involved.
    Fun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSubType {
    Life,
    Transition,
}

impl VideoSubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSubType::Life => "life",
            VideoSubType::Transition => "transition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThemeTab {
    Text,
    Image,
    Surprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurpriseTheme {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "christmas")]
    Christmas,
    #[serde(rename = "halloween")]
    Halloween,
    #[serde(rename = "cinematic")]
    Cinematic,
    #[serde(rename = "dreamy")]
    Dreamy,
    #[serde(rename = "vintage")]
    Vintage,
    #[serde(rename = "neon punk")]
    NeonPunk,
    #[serde(rename = "truly_random")]
    TrulyRandom,
}

impl SurpriseTheme {
    pub const ALL: [SurpriseTheme; 8] = [
        SurpriseTheme::None,
        SurpriseTheme::Christmas,
        SurpriseTheme::Halloween,
        SurpriseTheme::Cinematic,
        SurpriseTheme::Dreamy,
        SurpriseTheme::Vintage,
        SurpriseTheme::NeonPunk,
        SurpriseTheme::TrulyRandom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurpriseTheme::None => "none",
            SurpriseTheme::Christmas => "christmas",
            SurpriseTheme::Halloween => "halloween",
            SurpriseTheme::Cinematic => "cinematic",
            SurpriseTheme::Dreamy => "dreamy",
            SurpriseTheme::Vintage => "vintage",
            SurpriseTheme::NeonPunk => "neon punk",
            SurpriseTheme::TrulyRandom => "truly_random",
        }
    }

    pub fn is_selected(theme: Option<SurpriseTheme>) -> bool {
        matches!(theme, Some(t) if t != SurpriseTheme::None)
    }
}

impl fmt::Display for SurpriseTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_keyword<T: Copy>(s: &str, table: &[(&str, T)], what: &str) -> Result<T> {
    let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
    table
        .iter()
        .find(|(name, _)| name.replace('_', " ") == wanted)
        .map(|(_, value)| *value)
        .ok_or_else(|| StudioError::ConfigError(format!("Unknown {}: {}", what, s)))
}

impl FromStr for ImageSubType {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        parse_keyword(
            s,
            &[("facade", ImageSubType::Facade), ("fun", ImageSubType::Fun)],
            "image mode",
        )
    }
}

impl FromStr for VideoSubType {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        parse_keyword(
            s,
            &[
                ("life", VideoSubType::Life),
                ("transition", VideoSubType::Transition),
            ],
            "video mode",
        )
    }
}

impl FromStr for ThemeTab {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        parse_keyword(
            s,
            &[
                ("text", ThemeTab::Text),
                ("image", ThemeTab::Image),
                ("surprise", ThemeTab::Surprise),
            ],
            "theme tab",
        )
    }
}

impl FromStr for SurpriseTheme {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let table: Vec<(&str, SurpriseTheme)> =
            SurpriseTheme::ALL.iter().map(|t| (t.as_str(), *t)).collect();
        parse_keyword(s, &table, "surprise theme")
    }
}

/// What is being generated, with the source assets that mode needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Canvas {
    Image {
        sub_type: ImageSubType,
        map_file: Option<MediaFile>,
    },
    Video {
        sub_type: VideoSubType,
        start_scene: Option<MediaFile>,
        end_scene: Option<MediaFile>,
        duration_secs: u32,
    },
}

impl Canvas {
    pub fn generation_type(&self) -> GenerationType {
        match self {
            Canvas::Image { .. } => GenerationType::Image,
            Canvas::Video { .. } => GenerationType::Video,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub active_tab: ThemeTab,
    pub text_prompt: String,
    /// Freshly uploaded inspiration images.
    pub inspiration_images: Vec<MediaFile>,
    /// Data URLs picked from the saved inspiration library.
    pub selected_inspiration: Vec<String>,
    pub surprise_theme: Option<SurpriseTheme>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            active_tab: ThemeTab::Text,
            text_prompt: String::new(),
            inspiration_images: Vec::new(),
            selected_inspiration: Vec::new(),
            surprise_theme: None,
        }
    }
}

impl Theme {
    pub fn inspiration_count(&self) -> usize {
        self.inspiration_images.len() + self.selected_inspiration.len()
    }

    pub fn has_input(&self) -> bool {
        !self.text_prompt.trim().is_empty()
            || self.inspiration_count() > 0
            || SurpriseTheme::is_selected(self.surprise_theme)
    }

    /// Any inspiration image switches generation to the image-inspired theme.
    pub fn effective_tab(&self) -> ThemeTab {
        if self.inspiration_count() > 0 {
            ThemeTab::Image
        } else {
            self.active_tab
        }
    }
}

/// One submission. Built once, never mutated; see [`GenerationRequestBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub canvas: Canvas,
    pub theme: Theme,
    pub output_count: u8,
}

impl GenerationRequest {
    pub fn builder(generation_type: GenerationType) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(generation_type)
    }

    pub fn generation_type(&self) -> GenerationType {
        self.canvas.generation_type()
    }

    /// Checks that everything the selected mode needs is present.
    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_OUTPUT_COUNTS.contains(&self.output_count) {
            return Err(StudioError::MissingInput(format!(
                "Number of outputs must be one of {:?}, got {}",
                ALLOWED_OUTPUT_COUNTS, self.output_count
            )));
        }

        match &self.canvas {
            Canvas::Image { sub_type, map_file } => {
                if *sub_type == ImageSubType::Facade && map_file.is_none() {
                    return Err(StudioError::MissingInput(
                        "A map file is required for House Facade generation.".into(),
                    ));
                }
                if !self.theme.has_input() {
                    return Err(StudioError::MissingInput(
                        "Describe a theme, add inspiration images or pick a surprise theme."
                            .into(),
                    ));
                }
            }
            Canvas::Video {
                sub_type,
                start_scene,
                end_scene,
                duration_secs,
            } => {
                if start_scene.is_none() {
                    return Err(StudioError::MissingInput(
                        "A start scene is required for video generation.".into(),
                    ));
                }
                if *sub_type == VideoSubType::Transition && end_scene.is_none() {
                    return Err(StudioError::MissingInput(
                        "An end scene is required for transition videos.".into(),
                    ));
                }
                if !(MIN_VIDEO_DURATION_SECS..=MAX_VIDEO_DURATION_SECS).contains(duration_secs) {
                    return Err(StudioError::MissingInput(format!(
                        "Video duration must be between {} and {} seconds, got {}",
                        MIN_VIDEO_DURATION_SECS, MAX_VIDEO_DURATION_SECS, duration_secs
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn is_submittable(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Collects form input and produces an immutable [`GenerationRequest`].
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    generation_type: GenerationType,
    image_sub_type: ImageSubType,
    video_sub_type: VideoSubType,
    map_file: Option<MediaFile>,
    start_scene: Option<MediaFile>,
    end_scene: Option<MediaFile>,
    theme: Theme,
    output_count: Option<u8>,
    duration_secs: u32,
}

impl GenerationRequestBuilder {
    pub fn new(generation_type: GenerationType) -> Self {
        Self {
            generation_type,
            image_sub_type: ImageSubType::Facade,
            video_sub_type: VideoSubType::Life,
            map_file: None,
            start_scene: None,
            end_scene: None,
            theme: Theme::default(),
            output_count: None,
            duration_secs: MIN_VIDEO_DURATION_SECS,
        }
    }

    pub fn image_sub_type(mut self, sub_type: ImageSubType) -> Self {
        self.image_sub_type = sub_type;
        self
    }

    pub fn video_sub_type(mut self, sub_type: VideoSubType) -> Self {
        self.video_sub_type = sub_type;
        self
    }

    pub fn map_file(mut self, file: MediaFile) -> Self {
        self.map_file = Some(file);
        self
    }

    pub fn start_scene(mut self, file: MediaFile) -> Self {
        self.start_scene = Some(file);
        self
    }

    pub fn end_scene(mut self, file: MediaFile) -> Self {
        self.end_scene = Some(file);
        self
    }

    pub fn active_tab(mut self, tab: ThemeTab) -> Self {
        self.theme.active_tab = tab;
        self
    }

    pub fn text_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.theme.text_prompt = prompt.into();
        self
    }

    pub fn inspiration_image(mut self, file: MediaFile) -> Self {
        self.theme.inspiration_images.push(file);
        self
    }

    pub fn selected_inspiration(mut self, data_url: impl Into<String>) -> Self {
        self.theme.selected_inspiration.push(data_url.into());
        self
    }

    pub fn surprise_theme(mut self, theme: SurpriseTheme) -> Self {
        self.theme.surprise_theme = Some(theme);
        self
    }

    pub fn output_count(mut self, count: u8) -> Self {
        self.output_count = Some(count);
        self
    }

    pub fn duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Builds the request without checking it; [`GenerationRequest::validate`]
    /// reports what is missing.
    pub fn build_unchecked(self) -> GenerationRequest {
        let canvas = match self.generation_type {
            GenerationType::Image => Canvas::Image {
                sub_type: self.image_sub_type,
                map_file: self.map_file,
            },
            GenerationType::Video => Canvas::Video {
                sub_type: self.video_sub_type,
                start_scene: self.start_scene,
                end_scene: self.end_scene,
                duration_secs: self.duration_secs,
            },
        };

        GenerationRequest {
            canvas,
            theme: self.theme,
            output_count: self
                .output_count
                .unwrap_or_else(|| self.generation_type.default_output_count()),
        }
    }

    pub fn build(self) -> Result<GenerationRequest> {
        let request = self.build_unchecked();
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> MediaFile {
        MediaFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_facade_requires_map_and_theme() {
        let err = GenerationRequest::builder(GenerationType::Image)
            .text_prompt("spooky")
            .build()
            .unwrap_err();
        assert!(matches!(err, StudioError::MissingInput(_)));

        let err = GenerationRequest::builder(GenerationType::Image)
            .map_file(png("house.png"))
            .text_prompt("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, StudioError::MissingInput(_)));

        let request = GenerationRequest::builder(GenerationType::Image)
            .map_file(png("house.png"))
            .text_prompt("spooky")
            .build()
            .unwrap();
        assert_eq!(request.output_count, 2);
    }

    #[test]
    fn test_fun_mode_needs_only_theme() {
        let request = GenerationRequest::builder(GenerationType::Image)
            .image_sub_type(ImageSubType::Fun)
            .surprise_theme(SurpriseTheme::Halloween)
            .build();
        assert!(request.is_ok());

        let none_theme = GenerationRequest::builder(GenerationType::Image)
            .image_sub_type(ImageSubType::Fun)
            .surprise_theme(SurpriseTheme::None)
            .build_unchecked();
        assert!(!none_theme.is_submittable());
    }

    #[test]
    fn test_video_rules() {
        let life = GenerationRequest::builder(GenerationType::Video)
            .start_scene(png("start.png"))
            .build()
            .unwrap();
        assert_eq!(life.output_count, 1);

        let missing_end = GenerationRequest::builder(GenerationType::Video)
            .video_sub_type(VideoSubType::Transition)
            .start_scene(png("start.png"))
            .build_unchecked();
        assert!(!missing_end.is_submittable());

        let too_long = GenerationRequest::builder(GenerationType::Video)
            .start_scene(png("start.png"))
            .duration_secs(11)
            .build_unchecked();
        assert!(!too_long.is_submittable());
    }

    #[test]
    fn test_output_count_restricted() {
        let request = GenerationRequest::builder(GenerationType::Image)
            .image_sub_type(ImageSubType::Fun)
            .text_prompt("aurora")
            .output_count(3)
            .build_unchecked();
        assert!(!request.is_submittable());
    }

    #[test]
    fn test_effective_tab_follows_inspiration() {
        let request = GenerationRequest::builder(GenerationType::Image)
            .active_tab(ThemeTab::Surprise)
            .selected_inspiration("data:image/png;base64,AA==")
            .build_unchecked();
        assert_eq!(request.theme.effective_tab(), ThemeTab::Image);
        assert_eq!(Theme::default().effective_tab(), ThemeTab::Text);
    }

    #[test]
    fn test_keyword_parsing() {
        assert_eq!("neon-punk".parse::<SurpriseTheme>().unwrap(), SurpriseTheme::NeonPunk);
        assert_eq!("truly_random".parse::<SurpriseTheme>().unwrap(), SurpriseTheme::TrulyRandom);
        assert_eq!("SURPRISE".parse::<ThemeTab>().unwrap(), ThemeTab::Surprise);
        assert!("spooky".parse::<ImageSubType>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&SurpriseTheme::NeonPunk).unwrap(), "\"neon punk\"");
        assert_eq!(serde_json::to_string(&ThemeTab::Text).unwrap(), "\"TEXT\"");
        assert_eq!(serde_json::to_string(&VideoSubType::Transition).unwrap(), "\"transition\"");
    }
}
