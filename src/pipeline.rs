//! Entry point tying detection, containment, annotation and caching together.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use crate::annotation::Annotator;
use crate::data::{status_of, PipelineConfig, PredictionSummary, ResultSet, Status};
use crate::detection_processing::process_detections;
use crate::detectors::{Detector, PredictParams};
use crate::error::DetectError;
use crate::result_cache::{CacheEntry, CacheKey, ResultCache};
use crate::utils;

/// What one image produces: the annotated JPEG, per-class results and overall status.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub cache_key: CacheKey,
    pub annotated_image: Arc<[u8]>,
    pub result_set: ResultSet,
    pub status: Status,
}

impl ProcessOutput {
    fn from_entry(cache_key: CacheKey, entry: CacheEntry) -> Self {
        let status = status_of(&entry.result_set);
        Self {
            cache_key,
            annotated_image: entry.annotated_image,
            result_set: entry.result_set,
            status,
        }
    }

    /// Session-style record, stamped with the current local time.
    pub fn summary(&self) -> PredictionSummary {
        PredictionSummary::new(self.cache_key.as_str(), &self.result_set, self.status, Local::now())
    }
}

pub struct LeafPipeline<D: Detector, C: ResultCache> {
    detector: D,
    cache: C,
    annotator: Annotator,
    config: PipelineConfig,
    params: PredictParams,
}

impl<D: Detector, C: ResultCache> LeafPipeline<D, C> {
    pub fn new(detector: D, cache: C, annotator: Annotator, config: PipelineConfig) -> Self {
        let params = PredictParams::default();
        Self { detector, cache, annotator, config, params }
    }

    /// Thresholds passed to the detector; the containment pass keeps using `config.conf_threshold`.
    pub fn with_params(mut self, params: PredictParams) -> Self {
        self.params = params;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Runs the full pipeline on raw image bytes.
    ///
    /// Identical bytes within the cache lifetime return the stored result without
    /// touching the detector.
    pub fn process(&self, bytes: &[u8]) -> Result<ProcessOutput, DetectError> {
        let start = Instant::now();
        let key = CacheKey::from_bytes(bytes);
        if let Some(entry) = self.cache.get(&key) {
            log::debug!("Cache hit for {}", key);
            return Ok(ProcessOutput::from_entry(key, entry));
        }

        let image = image::load_from_memory(bytes)?;
        let checkpoint = utils::trace("pipeline", "decode", start, Default::default());

        self.detector
            .ensure_loaded()
            .map_err(|e| DetectError::ModelUnavailable(e.to_string()))?;
        let raw = self
            .detector
            .predict(&image, &self.params)
            .map_err(|e| DetectError::ModelUnavailable(e.to_string()))?;
        let checkpoint = utils::trace("pipeline", "predict", start, checkpoint);

        let detections = process_detections(&raw, self.config.conf_threshold);
        let result_set = ResultSet::from_detections(&detections);
        log::debug!("{} raw detections, {} kept", raw.len(), detections.len());

        let annotated = self.annotator.annotate(&image.to_rgb8(), &detections);
        let encoded = self.encode_result_image(annotated)?;
        utils::trace("pipeline", "annotate+encode", start, checkpoint);

        let entry = CacheEntry {
            annotated_image: Arc::from(encoded),
            result_set,
        };
        self.cache.set(key.clone(), entry.clone());
        Ok(ProcessOutput::from_entry(key, entry))
    }

    /// Downscales to `max_result_dim` on the longer side and encodes as JPEG.
    pub fn encode_result_image(&self, image: RgbImage) -> Result<Vec<u8>, DetectError> {
        let (w, h) = image.dimensions();
        let max_dim = self.config.max_result_dim;
        let image = if max_dim > 0 && w.max(h) > max_dim {
            let scale = max_dim as f32 / w.max(h) as f32;
            let new_w = ((w as f32 * scale).round() as u32).max(1);
            let new_h = ((h as f32 * scale).round() as u32).max(1);
            imageops::resize(&image, new_w, new_h, FilterType::Lanczos3)
        } else {
            image
        };

        let mut buf = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality.clamp(1, 100));
        DynamicImage::ImageRgb8(image)
            .write_with_encoder(encoder)
            .map_err(|e| DetectError::Encode(e.to_string()))?;
        Ok(buf.into_inner())
    }
}
