use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::models::common::{decode_data_url, GenerationType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub kind: GenerationType,
    pub data_url: String,
}

impl GenerationResult {
    pub fn new(kind: GenerationType, data_url: impl Into<String>) -> Self {
        Self {
            kind,
            data_url: data_url.into(),
        }
    }

    pub fn decode(&self) -> Result<(String, Vec<u8>)> {
        decode_data_url(&self.data_url)
    }

    /// Writes the decoded media into `dir` as `design-<index>.<ext>`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>, index: usize) -> Result<PathBuf> {
        let (_, bytes) = self.decode()?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .map_err(|e| StudioError::StorageError(format!("{}: {}", dir.display(), e)))?;

        let path = dir.join(format!("design-{}.{}", index + 1, self.kind.extension()));
        std::fs::write(&path, bytes)
            .map_err(|e| StudioError::StorageError(format!("{}: {}", path.display(), e)))?;

        Ok(path)
    }
}

/// Results of the last generation plus the preview cursor.
#[derive(Debug, Clone, Default)]
pub struct ResultGallery {
    results: Vec<GenerationResult>,
    preview: Option<usize>,
}

impl ResultGallery {
    pub fn new(results: Vec<GenerationResult>) -> Self {
        Self {
            results,
            preview: None,
        }
    }

    pub fn results(&self) -> &[GenerationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_navigation(&self) -> bool {
        self.results.len() > 1
    }

    pub fn open(&mut self, index: usize) -> Option<&GenerationResult> {
        if index < self.results.len() {
            self.preview = Some(index);
        }
        self.current()
    }

    pub fn close(&mut self) {
        self.preview = None;
    }

    pub fn preview_index(&self) -> Option<usize> {
        self.preview
    }

    pub fn current(&self) -> Option<&GenerationResult> {
        self.preview.and_then(|i| self.results.get(i))
    }

    pub fn next(&mut self) -> Option<&GenerationResult> {
        let len = self.results.len();
        if let Some(i) = self.preview {
            self.preview = Some((i + 1) % len);
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<&GenerationResult> {
        let len = self.results.len();
        if let Some(i) = self.preview {
            self.preview = Some((i + len - 1) % len);
        }
        self.current()
    }
}
