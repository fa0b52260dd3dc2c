//! Post-detection decision core: screening, class partitioning and the
//! infected-leaf / disease-part containment rule.
//!
//! A "Disease Part" only counts inside a leaf already flagged as infected, and a
//! leaf is only "Infected" if it visibly contains disease tissue. Detections are
//! identified by their position in the detector output throughout.

use std::collections::HashSet;
use crate::common::{LeafClass, LeafDetection, RawDetection};

/// Detections of one inference call, split by class in their original order.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ClassifiedBoxes {
    pub healthy: Vec<LeafDetection>,
    pub infected_leaf: Vec<LeafDetection>,
    pub disease_part: Vec<LeafDetection>,
}

impl ClassifiedBoxes {
    pub fn get(&self, class: LeafClass) -> &[LeafDetection] {
        match class {
            LeafClass::Healthy => &self.healthy,
            LeafClass::InfectedLeaf => &self.infected_leaf,
            LeafClass::DiseasePart => &self.disease_part,
        }
    }

    pub fn len(&self) -> usize {
        self.healthy.len() + self.infected_leaf.len() + self.disease_part.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Types the raw detector output, skipping malformed detections.
///
/// Each kept detection gets its index in `raw` as id. A detection with an unknown
/// label or an invalid box is logged and dropped; one bad box never fails the image.
///
/// # Returns
///
/// The screened detections in their original order and the number skipped.
pub fn screen_detections(raw: &[RawDetection]) -> (Vec<LeafDetection>, usize) {
    let mut skipped = 0;
    let detections = raw
        .iter()
        .enumerate()
        .filter_map(|(id, det)| match LeafDetection::try_from_raw(id, det) {
            Ok(detection) => Some(detection),
            Err(err) => {
                log::warn!("Skipping detection: {}", err);
                skipped += 1;
                None
            }
        })
        .collect();
    (detections, skipped)
}

/// Partitions detections by class, preserving order. Nothing is discarded.
pub fn classify_boxes(detections: &[LeafDetection]) -> ClassifiedBoxes {
    let mut classified = ClassifiedBoxes::default();
    for detection in detections {
        match detection.class {
            LeafClass::Healthy => classified.healthy.push(*detection),
            LeafClass::InfectedLeaf => classified.infected_leaf.push(*detection),
            LeafClass::DiseasePart => classified.disease_part.push(*detection),
        }
    }
    classified
}

/// Ids of the infected-leaf detections that hold at least one disease part.
///
/// Every disease part counts here, including ones that will not be emitted later.
/// Leaves below `conf_threshold` are never promoted.
pub fn promote_infected_leaves(classified: &ClassifiedBoxes, conf_threshold: f32) -> HashSet<usize> {
    classified
        .infected_leaf
        .iter()
        .filter(|leaf| leaf.confidence >= conf_threshold)
        .filter(|leaf| {
            classified
                .disease_part
                .iter()
                .any(|part| leaf.bbox.contains_center_of(&part.bbox))
        })
        .map(|leaf| leaf.id)
        .collect()
}

/// Applies the containment rule and returns the detections to report, in
/// detector order.
///
/// * Anything below `conf_threshold` is dropped.
/// * An infected leaf is kept only if it was promoted.
/// * A disease part is kept only if its own center lies in a promoted leaf.
/// * A healthy leaf is always kept.
pub fn validate_containment(detections: &[LeafDetection], conf_threshold: f32) -> Vec<LeafDetection> {
    let classified = classify_boxes(detections);
    let promoted = promote_infected_leaves(&classified, conf_threshold);
    let valid_leaves: Vec<&LeafDetection> = classified
        .infected_leaf
        .iter()
        .filter(|leaf| promoted.contains(&leaf.id))
        .collect();

    let valid: Vec<LeafDetection> = detections
        .iter()
        .filter(|det| det.confidence >= conf_threshold)
        .filter(|det| match det.class {
            LeafClass::Healthy => true,
            LeafClass::InfectedLeaf => promoted.contains(&det.id),
            LeafClass::DiseasePart => valid_leaves
                .iter()
                .any(|leaf| leaf.bbox.contains_center_of(&det.bbox)),
        })
        .copied()
        .collect();

    log::debug!(
        "Containment: {} in, {} promoted leaves, {} kept",
        detections.len(),
        promoted.len(),
        valid.len()
    );
    valid
}

/// Screens raw detector output and validates it in one go.
pub fn process_detections(raw: &[RawDetection], conf_threshold: f32) -> Vec<LeafDetection> {
    let (detections, skipped) = screen_detections(raw);
    if skipped > 0 {
        log::warn!("{} of {} detections were malformed", skipped, raw.len());
    }
    validate_containment(&detections, conf_threshold)
}
