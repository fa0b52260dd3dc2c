extern crate leaf_detect;

use std::time::Duration;
use image::DynamicImage;
use leaf_detect::common::{LeafBox, LeafClass, ModelConfig};
use leaf_detect::data::TimeCalc;
use leaf_detect::detection_runners::inference_process::InferenceProcess;
use leaf_detect::PredictParams;
use leaf_detect::detection_runners::ort_detector::image_ops::letterbox;
use leaf_detect::detection_runners::ort_detector::nms::{nms, Candidate};
use leaf_detect::detection_runners::OrtYolo;

use fixtures::leaf_image;

fn candidate(class_id: usize, confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Candidate {
    Candidate { class_id, confidence, bbox: LeafBox::new(x1, y1, x2, y2) }
}

#[test]
fn nms_keeps_the_strongest_of_overlapping_boxes() {
    let mut boxes = vec![
        candidate(0, 0.7, 0., 0., 100., 100.),
        candidate(0, 0.9, 2., 2., 102., 102.),
        candidate(0, 0.8, 300., 300., 400., 400.),
    ];
    nms(&mut boxes, 0.5, false, 50);
    let confs: Vec<f32> = boxes.iter().map(|b| b.confidence).collect();
    assert_eq!(confs, vec![0.9, 0.8]);
}

#[test]
fn class_aware_nms_keeps_overlapping_classes() {
    let make = || vec![
        candidate(1, 0.9, 0., 0., 100., 100.),
        candidate(0, 0.8, 1., 1., 101., 101.),
    ];

    let mut aware = make();
    nms(&mut aware, 0.5, false, 50);
    assert_eq!(aware.len(), 2);

    let mut agnostic = make();
    nms(&mut agnostic, 0.5, true, 50);
    assert_eq!(agnostic.len(), 1);
    assert_eq!(agnostic[0].class_id, 1);
}

#[test]
fn nms_caps_the_detection_count() {
    let mut boxes: Vec<Candidate> = (0..10)
        .map(|i| {
            let x = i as f32 * 50.;
            candidate(0, 0.5 + i as f32 * 0.01, x, 0., x + 40., 40.)
        })
        .collect();
    nms(&mut boxes, 0.5, true, 3);
    assert_eq!(boxes.len(), 3);
    assert!(boxes[0].confidence > boxes[1].confidence);
}

#[test]
fn parse_names_from_metadata() {
    let names = OrtYolo::parse_names("{0: 'Healthy', 1: 'Infected Leaf', 2: 'Disease Part'}");
    assert_eq!(names, LeafClass::all_labels());
    assert!(OrtYolo::parse_names("").is_empty());
}

#[test]
fn labels_resolve_to_classes() {
    assert_eq!(LeafClass::from_label("Infected Leaf"), Some(LeafClass::InfectedLeaf));
    assert_eq!(LeafClass::from_label("disease_part"), Some(LeafClass::DiseasePart));
    assert_eq!(LeafClass::from_label(" HEALTHY "), Some(LeafClass::Healthy));
    assert_eq!(LeafClass::from_label("# 7"), None);
    assert_eq!(LeafClass::from_id(1), Some(LeafClass::InfectedLeaf));
    assert_eq!(LeafClass::from_id(3), None);
    for class in LeafClass::ALL {
        assert_eq!(LeafClass::from_id(class.id()), Some(class));
    }
}

#[test]
fn letterbox_pads_and_maps_back() {
    let image = DynamicImage::ImageRgb8(leaf_image(200, 100));
    let boxed = letterbox(&image, 64, 64).unwrap();

    assert_eq!(boxed.tensor.shape(), &[1, 3, 64, 64]);
    assert_eq!(boxed.pad_x, 0.);
    assert_eq!(boxed.pad_y, 16.);
    // Padding rows carry the fill value, the resized band carries the image.
    assert!((boxed.tensor[[0, 0, 0, 0]] - 114. / 255.).abs() < 1e-6);
    assert!((boxed.tensor[[0, 1, 32, 32]] - 120. / 255.).abs() < 1e-2);

    let (x1, y1, x2, y2) = boxed.unmap_cxcywh(32., 32., 64., 32.);
    assert!(x1.abs() < 1e-3 && y1.abs() < 1e-3);
    assert!((x2 - 200.).abs() < 1e-3 && (y2 - 100.).abs() < 1e-3);

    // Boxes reaching into the padding are clamped to the source image.
    let (_, y1, _, y2) = boxed.unmap_cxcywh(32., 32., 10., 64.);
    assert_eq!(y1, 0.);
    assert_eq!(y2, 100.);
}

#[test]
fn letterbox_rejects_empty_images() {
    let image = DynamicImage::new_rgb8(0, 0);
    assert!(letterbox(&image, 64, 64).is_err());
}

struct Doubler {
    timings: TimeCalc,
}

impl InferenceProcess for Doubler {
    type Input = Vec<f32>;
    type Prepared = Vec<f32>;
    type Raw = Vec<f32>;
    type Output = f32;

    fn new(_config: &ModelConfig) -> anyhow::Result<Self> {
        Ok(Self { timings: TimeCalc::default() })
    }

    fn preprocess(&self, x: &Vec<f32>) -> anyhow::Result<Vec<f32>> {
        Ok(x.clone())
    }

    fn inference(&mut self, x: &Vec<f32>) -> anyhow::Result<Vec<f32>> {
        std::thread::sleep(Duration::from_millis(5));
        Ok(x.iter().map(|v| v * 2.).collect())
    }

    fn postprocess(&self, ys: Vec<f32>, _x: &Vec<f32>, _params: &PredictParams) -> anyhow::Result<f32> {
        Ok(ys.iter().sum())
    }

    fn timings_mut(&mut self) -> &mut TimeCalc {
        &mut self.timings
    }
}

#[test]
fn run_records_every_stage() {
    let mut model = Doubler::new(&ModelConfig::default()).unwrap();
    let params = PredictParams::default();
    assert_eq!(model.run(&vec![1., 2.], &params).unwrap(), 6.);
    assert_eq!(model.run(&vec![3.], &params).unwrap(), 6.);

    let timings = &model.timings;
    assert_eq!(timings.runs(), 2);
    assert!(timings.avg_i(1) >= Duration::from_millis(5));
    assert!(timings.avg_i(2) <= timings.avg());
    assert!(timings.total() >= Duration::from_millis(10));
    assert_eq!(timings.avg_i(3), Duration::ZERO);
}
