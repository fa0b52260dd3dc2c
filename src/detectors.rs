use std::sync::Arc;
use image::DynamicImage;
use parking_lot::Mutex;
use crate::common::{ModelConfig, RawDetection};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYolo;

/// Thresholds handed to a detector for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictParams {
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub agnostic_nms: bool,
}

impl Default for PredictParams {
    fn default() -> Self {
        PredictParams::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for PredictParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            conf_threshold: config.conf_threshold,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
            agnostic_nms: config.agnostic_nms,
        }
    }
}

/// Black-box object detector: image in, ordered detections out.
///
/// Any implementation honouring the thresholds in [`PredictParams`] can back the pipeline.
pub trait Detector: Send + Sync {
    fn predict(&self, image: &DynamicImage, params: &PredictParams) -> anyhow::Result<Vec<RawDetection>>;

    /// Makes sure the model is ready; detectors without a load step succeed immediately.
    fn ensure_loaded(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<D: Detector + ?Sized> Detector for Arc<D> {
    fn predict(&self, image: &DynamicImage, params: &PredictParams) -> anyhow::Result<Vec<RawDetection>> {
        (**self).predict(image, params)
    }

    fn ensure_loaded(&self) -> anyhow::Result<()> {
        (**self).ensure_loaded()
    }
}

/// ONNX leaf model behind a lock.
///
/// The session is built on the first `ensure_loaded` or `predict`; callers arriving
/// during the load wait for it. Inference calls are serialized on the same lock.
pub struct LeafDetector {
    config: ModelConfig,
    model: Mutex<Option<OrtYolo>>,
}

impl std::fmt::Debug for LeafDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafDetector")
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl LeafDetector {
    pub fn new(config: ModelConfig) -> Self {
        log::info!("Leaf detector configured:\n{}", config.to_string());
        Self {
            config,
            model: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn params(&self) -> PredictParams {
        PredictParams::from(&self.config)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.lock().is_some()
    }

    fn load(&self, slot: &mut Option<OrtYolo>) -> anyhow::Result<()> {
        if slot.is_none() {
            log::info!("Loading leaf model from {}", self.config.weights_path);
            *slot = Some(OrtYolo::new(&self.config)?);
        }
        Ok(())
    }
}

impl Detector for LeafDetector {
    fn predict(&self, image: &DynamicImage, params: &PredictParams) -> anyhow::Result<Vec<RawDetection>> {
        let mut slot = self.model.lock();
        self.load(&mut slot)?;
        match slot.as_mut() {
            Some(model) => {
                let detections = model.run(image, params)?;
                let timings = &model.infer_time;
                log::debug!(
                    "Inference #{} | avg {:.2?} (pre {:.2?} | run {:.2?} | post {:.2?})",
                    timings.runs(),
                    timings.avg(),
                    timings.avg_i(0),
                    timings.avg_i(1),
                    timings.avg_i(2)
                );
                Ok(detections)
            }
            None => anyhow::bail!("Leaf model is not loaded"),
        }
    }

    fn ensure_loaded(&self) -> anyhow::Result<()> {
        let mut slot = self.model.lock();
        self.load(&mut slot)
    }
}
