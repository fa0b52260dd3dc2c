//! Acceptance rules for user uploads, checked before the pipeline sees the bytes.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::DetectError;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Lowercase, with the leading dot.
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()],
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    pub fn with_max_bytes(mut self, n: u64) -> Self {
        self.max_bytes = n;
        self
    }

    pub fn with_allowed_extensions(mut self, extensions: &[&str]) -> Self {
        self.allowed_extensions = extensions
            .iter()
            .map(|ext| format!(".{}", ext.trim_start_matches('.').to_ascii_lowercase()))
            .collect();
        self
    }

    pub fn is_allowed_name(&self, file_name: &str) -> bool {
        match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => {
                let ext = format!(".{}", ext.to_ascii_lowercase());
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }

    /// Rejects files with a foreign extension or over the size limit.
    pub fn check(&self, file_name: &str, size: u64) -> Result<(), DetectError> {
        if !self.is_allowed_name(file_name) {
            return Err(DetectError::UnsupportedUpload(format!(
                "Unsupported file format. Please upload a {} file.",
                self.allowed_extensions.join(", ")
            )));
        }
        if size > self.max_bytes {
            return Err(DetectError::UnsupportedUpload(format!(
                "The image file is too large. Please upload an image smaller than {}MB.",
                self.max_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }
}
