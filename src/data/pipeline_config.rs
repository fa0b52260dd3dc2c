use serde::{Deserialize, Serialize};
use crate::common::CONFIDENCE_THRESHOLD;
use crate::result_cache::CacheConfig;

/// Core-side settings of the decision pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Re-checked on every detection regardless of what the detector already filtered.
    pub conf_threshold: f32,
    /// Longer side of the encoded result image, in pixels.
    pub max_result_dim: u32,
    pub jpeg_quality: u8,
    pub cache: CacheConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            conf_threshold: CONFIDENCE_THRESHOLD,
            max_result_dim: 1024,
            jpeg_quality: 85,
            cache: CacheConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_conf_threshold(mut self, x: f32) -> Self {
        self.conf_threshold = x;
        self
    }

    pub fn with_max_result_dim(mut self, n: u32) -> Self {
        self.max_result_dim = n;
        self
    }

    pub fn with_jpeg_quality(mut self, q: u8) -> Self {
        self.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}
