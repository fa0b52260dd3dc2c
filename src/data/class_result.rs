use serde::{Deserialize, Serialize};
use crate::common::{LeafClass, LeafDetection};

/// Aggregate for one class over the validated detections of an image.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassResult {
    pub count: usize,
    pub confidences: Vec<f32>,
    pub avg_confidence: f32,
}

impl ClassResult {
    pub fn push(&mut self, confidence: f32) {
        self.count += 1;
        self.confidences.push(confidence);
    }

    /// Recomputes `avg_confidence`; an empty class averages to exactly 0.0.
    pub fn finalize(&mut self) {
        self.avg_confidence = if self.confidences.is_empty() {
            0.0
        } else {
            self.confidences.iter().sum::<f32>() / self.confidences.len() as f32
        };
    }

    /// Average confidence as a percentage, 0 when nothing was counted.
    pub fn avg_confidence_percent(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.avg_confidence * 100.
    }
}

/// The three per-class aggregates of one processed image.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub healthy: ClassResult,
    pub infected_leaf: ClassResult,
    pub disease_part: ClassResult,
}

impl ResultSet {
    /// Counts and averages the validated detections, in the order given.
    pub fn from_detections(detections: &[LeafDetection]) -> Self {
        let mut results = ResultSet::default();
        for detection in detections {
            results.get_mut(detection.class).push(detection.confidence);
        }
        for class in LeafClass::ALL {
            results.get_mut(class).finalize();
        }
        results
    }

    pub fn get(&self, class: LeafClass) -> &ClassResult {
        match class {
            LeafClass::Healthy => &self.healthy,
            LeafClass::InfectedLeaf => &self.infected_leaf,
            LeafClass::DiseasePart => &self.disease_part,
        }
    }

    pub fn get_mut(&mut self, class: LeafClass) -> &mut ClassResult {
        match class {
            LeafClass::Healthy => &mut self.healthy,
            LeafClass::InfectedLeaf => &mut self.infected_leaf,
            LeafClass::DiseasePart => &mut self.disease_part,
        }
    }

    pub fn count(&self, class: LeafClass) -> usize {
        self.get(class).count
    }

    pub fn total_count(&self) -> usize {
        LeafClass::ALL.iter().map(|class| self.count(*class)).sum()
    }
}
