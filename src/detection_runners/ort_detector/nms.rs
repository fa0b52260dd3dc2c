use crate::common::LeafBox;

pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    fn class_id(&self) -> usize;
}

/// A decoded model candidate before class names are attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: LeafBox,
}

impl Nms for Candidate {
    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    /// Returns the confidence score of the bounding box.
    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn class_id(&self) -> usize {
        self.class_id
    }
}

/// Greedy non-max suppression, highest confidence first.
///
/// With `agnostic` set, boxes of different classes suppress each other too.
/// The survivors stay sorted by confidence and are cut to `max_detections`.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32, agnostic: bool, max_detections: usize) {
    boxes.sort_by(|b1, b2| b2.confidence().total_cmp(&b1.confidence()));
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let same_group = agnostic || boxes[prev_index].class_id() == boxes[index].class_id();
            if same_group && boxes[prev_index].iou(&boxes[index]) > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index.min(max_detections));
}
