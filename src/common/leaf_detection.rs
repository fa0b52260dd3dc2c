use serde::{Deserialize, Serialize};
use crate::common::{LeafBox, LeafClass};
use crate::error::DetectError;

/// One detector output, exactly as the detector produced it.
///
/// Nothing about it is trusted yet: the label may be outside the leaf classes and
/// the box may be inverted. See [`LeafDetection::try_from_raw`].
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,
    pub confidence: f32,
    pub bbox: LeafBox,
}

impl RawDetection {
    pub fn new(label: &str, confidence: f32, bbox: LeafBox) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            bbox,
        }
    }

    /// Sets the bounding box's coordinates using `(x1, y1, x2, y2)`.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = LeafBox::new(x1, y1, x2, y2);
        self
    }

    /// Sets the confidence score of the detection.
    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    /// Sets the class label of the detection.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }
}

/// A screened detection: known class, well-formed box, and a stable id.
///
/// `id` is the detection's index in the raw detector output. Every pass of the
/// containment validator refers to detections by this id, never by coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafDetection {
    pub id: usize,
    pub class: LeafClass,
    pub confidence: f32,
    pub bbox: LeafBox,
}

impl LeafDetection {
    pub fn new(id: usize, class: LeafClass, confidence: f32, bbox: LeafBox) -> Self {
        Self {
            id,
            class,
            confidence,
            bbox,
        }
    }

    /// Screens a raw detection.
    ///
    /// # Arguments
    ///
    /// * `id` - Position of the detection in the detector output.
    /// * `raw` - The detection to screen.
    ///
    /// # Returns
    ///
    /// The typed detection, or `DetectError::MalformedDetection` when the label is
    /// unknown, the box is inverted or empty, or a value is not finite.
    pub fn try_from_raw(id: usize, raw: &RawDetection) -> Result<Self, DetectError> {
        let class = LeafClass::from_label(&raw.label).ok_or_else(|| {
            DetectError::MalformedDetection(format!("#{id}: unknown class label '{}'", raw.label))
        })?;

        if !raw.bbox.is_well_formed() {
            return Err(DetectError::MalformedDetection(format!(
                "#{id}: invalid box ({}, {}, {}, {})",
                raw.bbox.x1, raw.bbox.y1, raw.bbox.x2, raw.bbox.y2
            )));
        }

        if !raw.confidence.is_finite() {
            return Err(DetectError::MalformedDetection(format!(
                "#{id}: confidence is not a number"
            )));
        }

        Ok(Self::new(id, class, raw.confidence, raw.bbox))
    }

    /// Label drawn on the annotated image, e.g. `Disease Part 91.25%`.
    pub fn caption(&self) -> String {
        format!("{} {:.2}%", self.class.label(), self.confidence * 100.)
    }
}
