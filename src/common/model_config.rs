use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::common::inference_device::InferenceDevice;

pub const CONFIDENCE_THRESHOLD: f32 = 0.6;
pub const IOU_THRESHOLD: f32 = 0.5;
pub const MAX_DETECTIONS: usize = 50;

/// Detector-side settings: where the weights live and how inference is thresholded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weights_path: String,
    /// Path to a dynamically loaded onnxruntime library; `None` uses the system lookup.
    pub ort_lib_path: Option<String>,
    /// Optional class-name file, one label per line, in model class-id order.
    pub labels_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    /// Suppress overlapping boxes regardless of class.
    pub agnostic_nms: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: "model_weights/best.onnx".to_string(),
            ort_lib_path: None,
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            conf_threshold: CONFIDENCE_THRESHOLD,
            iou_threshold: IOU_THRESHOLD,
            max_detections: MAX_DETECTIONS,
            agnostic_nms: true,
            width: 640,
            height: 640,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: &str) -> Self {
        Self {
            weights_path: weights_path.to_string(),
            ..Default::default()
        }
    }

    /// Reads a JSON document; missing fields fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ModelConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = Some(ort_lib_path.to_string());
        self
    }

    pub fn with_labels_path(mut self, labels_path: &str) -> Self {
        self.labels_path = Some(labels_path.to_string());
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.inference_device = device;
        self
    }

    pub fn with_conf_threshold(mut self, x: f32) -> Self {
        self.conf_threshold = x;
        self
    }

    pub fn with_iou_threshold(mut self, x: f32) -> Self {
        self.iou_threshold = x;
        self
    }

    pub fn with_max_detections(mut self, n: usize) -> Self {
        self.max_detections = n;
        self
    }

    pub fn with_agnostic_nms(mut self, x: bool) -> Self {
        self.agnostic_nms = x;
        self
    }

    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn to_string(&self) -> String {
        format!("Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {} | IoU: {} | Max Detections: {} | Agnostic NMS: {}",
                self.weights_path,
                self.labels_path.as_deref().unwrap_or("<model metadata>"),
                self.ort_lib_path.as_deref().unwrap_or("<system>"),
                self.inference_device,
                self.width, self.height,
                self.conf_threshold, self.iou_threshold, self.max_detections, self.agnostic_nms)
    }
}
