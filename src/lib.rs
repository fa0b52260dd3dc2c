//! Post-detection decision pipeline for mangosteen leaf disease.
//!
//! A YOLO-style detector proposes `Healthy`, `Infected Leaf` and `Disease Part` boxes.
//! The pipeline keeps only the ones that are mutually consistent (every disease part
//! sits inside an infected leaf), tallies them per class, draws them onto the image
//! and memoizes the whole result by content hash.

mod utils;
pub mod annotation;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod detectors;
pub mod error;
pub mod pipeline;
pub mod result_cache;
pub mod upload;

pub use annotation::Annotator;
pub use common::{LeafBox, LeafClass, LeafDetection, ModelConfig, RawDetection};
pub use data::{status_of, PipelineConfig, PredictionSummary, ResultSet, Status};
pub use detectors::{Detector, LeafDetector, PredictParams};
pub use error::DetectError;
pub use pipeline::{LeafPipeline, ProcessOutput};
pub use result_cache::{CacheConfig, CacheKey, InMemoryResultCache, ResultCache};
pub use upload::UploadPolicy;

pub type Result<T, E = DetectError> = std::result::Result<T, E>;

/// Builds the ONNX leaf detector and loads the model right away.
///
/// Use [`LeafDetector::new`] directly to defer loading to the first request.
pub fn init_detector(config: &ModelConfig) -> Result<LeafDetector> {
    let detector = LeafDetector::new(config.clone());
    detector
        .ensure_loaded()
        .map_err(|e| DetectError::ModelUnavailable(e.to_string()))?;
    Ok(detector)
}

/// Detector, in-memory cache and the default annotator.
pub fn default_pipeline(
    model: &ModelConfig,
    config: PipelineConfig,
) -> LeafPipeline<LeafDetector, InMemoryResultCache> {
    let params = PredictParams::from(model);
    let cache = InMemoryResultCache::new(config.cache.clone());
    LeafPipeline::new(LeafDetector::new(model.clone()), cache, Annotator::default(), config)
        .with_params(params)
}
