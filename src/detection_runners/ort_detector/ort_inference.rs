use anyhow::Result;
use image::DynamicImage;
use ndarray::{s, Array2, ArrayView2, Axis};
use ort::{session::Session, value::TensorRef};
use rayon::prelude::*;
use regex::Regex;

use crate::common::{LeafBox, LeafClass, ModelConfig, RawDetection};
use crate::data::TimeCalc;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::ort_detector::image_ops::{letterbox, Letterboxed};
use crate::detection_runners::ort_detector::nms::{nms, Candidate};
use crate::detection_runners::ort_detector::ort_engine::{build_session, fetch_names_metadata, OrtTensorNames};
use crate::detectors::PredictParams;
use crate::utils;

/// YOLOv8-style detector running on ONNX Runtime.
///
/// Expects a single output of shape `[1, 4 + nc, anchors]` (or its transpose) holding
/// `cx, cy, w, h` followed by per-class scores.
pub struct OrtYolo {
    session: Session,
    tensor_names: OrtTensorNames,
    names: Vec<String>,
    width: u32,
    height: u32,
    pub infer_time: TimeCalc,
}

impl InferenceProcess for OrtYolo {
    type Input = DynamicImage;
    type Prepared = Letterboxed;
    type Raw = Array2<f32>;
    type Output = Vec<RawDetection>;

    fn new(config: &ModelConfig) -> Result<Self> {
        let (session, tensor_names) = build_session(config)?;

        // Class names: labels file, then ONNX metadata, then the fixed leaf classes.
        let names = match &config.labels_path {
            Some(path) => utils::file_to_vec(path)?,
            None => fetch_names_metadata(&session)
                .map(|meta| Self::parse_names(&meta))
                .filter(|names| !names.is_empty())
                .unwrap_or_else(LeafClass::all_labels),
        };
        log::info!("Model classes: {:?}", names);

        Ok(Self {
            session,
            tensor_names,
            names,
            width: config.width,
            height: config.height,
            infer_time: TimeCalc::default(),
        })
    }

    fn preprocess(&self, x: &DynamicImage) -> Result<Letterboxed> {
        letterbox(x, self.height, self.width)
    }

    fn inference(&mut self, x: &Letterboxed) -> Result<Array2<f32>> {
        let input = x.tensor.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input)?;
        let outputs = self
            .session
            .run(ort::inputs![self.tensor_names.input.as_str() => input_tensor])?;

        let output = outputs
            .get(self.tensor_names.output.as_str())
            .ok_or_else(|| anyhow::anyhow!("Output '{}' not found", self.tensor_names.output))?;
        let (shape, data) = output.try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        Self::to_anchor_rows(&dims, data)
    }

    fn timings_mut(&mut self) -> &mut TimeCalc {
        &mut self.infer_time
    }

    fn postprocess(&self, preds: Array2<f32>, x: &Letterboxed, params: &PredictParams) -> Result<Vec<RawDetection>> {
        let nc = preds.ncols().saturating_sub(4);
        if nc == 0 {
            anyhow::bail!("Model output has no class scores ({} columns)", preds.ncols());
        }

        let mut candidates: Vec<Candidate> = preds
            .axis_iter(Axis(0))
            .into_par_iter()
            .filter_map(|row| {
                let (class_id, &confidence) = row
                    .slice(s![4..])
                    .into_iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))?;

                if confidence < params.conf_threshold {
                    return None;
                }

                let (x1, y1, x2, y2) = x.unmap_cxcywh(row[0], row[1], row[2], row[3]);
                let bbox = LeafBox::new(x1, y1, x2, y2);
                if !bbox.is_well_formed() {
                    return None;
                }

                Some(Candidate { class_id, confidence, bbox })
            })
            .collect();

        nms(&mut candidates, params.iou_threshold, params.agnostic_nms, params.max_detections);

        Ok(candidates
            .into_iter()
            .map(|c| RawDetection::new(&self.label_of(c.class_id), c.confidence, c.bbox))
            .collect())
    }
}

impl OrtYolo {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn label_of(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("# {}", class_id))
    }

    /// Reshapes the raw output into one row per anchor: `[cx, cy, w, h, scores...]`.
    fn to_anchor_rows(dims: &[usize], data: &[f32]) -> Result<Array2<f32>> {
        let (rows, cols) = match dims {
            [1, a, b] => (*a, *b),
            [a, b] => (*a, *b),
            _ => anyhow::bail!("Unexpected output shape {:?}", dims),
        };
        let view = ArrayView2::from_shape((rows, cols), data)?;
        // YOLOv8 exports attributes-first ([4 + nc, anchors]); there are always more anchors.
        let preds = if rows < cols { view.t().to_owned() } else { view.to_owned() };
        Ok(preds)
    }

    /// Parses ONNX metadata such as `{0: 'Healthy', 1: 'Infected Leaf', 2: 'Disease Part'}`.
    pub fn parse_names(names: &str) -> Vec<String> {
        let re = match Regex::new(r#"(['"])([-()\w '"]+?)(['"])"#) {
            Ok(re) => re,
            Err(_) => return Vec::new(),
        };
        re.captures_iter(names)
            .map(|caps| {
                let (_, [_, name, _]) = caps.extract();
                name.to_string()
            })
            .collect()
    }
}
