extern crate leaf_detect;

use chrono::{Local, TimeZone};
use leaf_detect::common::{LeafBox, LeafClass, LeafDetection};
use leaf_detect::data::{status_of, ClassResult, PredictionSummary, ResultSet, Status};

fn det(id: usize, class: LeafClass, confidence: f32) -> LeafDetection {
    LeafDetection::new(id, class, confidence, LeafBox::new(0., 0., 10., 10.))
}

#[test]
fn empty_class_averages_to_zero() {
    let results = ResultSet::from_detections(&[det(0, LeafClass::Healthy, 0.8)]);
    assert_eq!(results.infected_leaf.count, 0);
    assert_eq!(results.infected_leaf.avg_confidence, 0.0);
    assert_eq!(results.disease_part.avg_confidence, 0.0);
    assert_eq!(results.disease_part.avg_confidence_percent(), 0.0);

    let mut empty = ClassResult::default();
    empty.finalize();
    assert_eq!(empty.avg_confidence, 0.0);
}

#[test]
fn averages_and_sequences_follow_detection_order() {
    let results = ResultSet::from_detections(&[
        det(0, LeafClass::DiseasePart, 0.9),
        det(1, LeafClass::InfectedLeaf, 0.8),
        det(2, LeafClass::DiseasePart, 0.7),
    ]);
    assert_eq!(results.disease_part.count, 2);
    assert_eq!(results.disease_part.confidences, vec![0.9, 0.7]);
    assert!((results.disease_part.avg_confidence - 0.8).abs() < 1e-6);
    assert_eq!(results.count(LeafClass::InfectedLeaf), 1);
    assert_eq!(results.total_count(), 3);
}

#[test]
fn single_healthy_detection() {
    let results = ResultSet::from_detections(&[det(0, LeafClass::Healthy, 0.7)]);
    assert_eq!(results.healthy.count, 1);
    assert!((results.healthy.avg_confidence - 0.7).abs() < 1e-6);
    assert_eq!(status_of(&results), Status::Healthy);
}

#[test]
fn status_law() {
    assert_eq!(status_of(&ResultSet::default()), Status::NoLeafDetected);

    let infected = ResultSet::from_detections(&[
        det(0, LeafClass::Healthy, 0.9),
        det(1, LeafClass::InfectedLeaf, 0.9),
    ]);
    assert_eq!(status_of(&infected), Status::Infected);

    let parts_only = ResultSet::from_detections(&[det(0, LeafClass::DiseasePart, 0.9)]);
    assert_eq!(Status::from(&parts_only), Status::Infected);

    let healthy = ResultSet::from_detections(&[det(0, LeafClass::Healthy, 0.9), det(1, LeafClass::Healthy, 0.6)]);
    assert_eq!(status_of(&healthy), Status::Healthy);
}

#[test]
fn status_labels() {
    assert_eq!(Status::NoLeafDetected.label(), "No Detected Leaf");
    assert_eq!(Status::Healthy.to_string(), "Healthy");
    assert_eq!(Status::Infected.to_string(), "Infected");
}

#[test]
fn summary_reports_percentages_and_timestamp() {
    let results = ResultSet::from_detections(&[
        det(0, LeafClass::InfectedLeaf, 0.9),
        det(1, LeafClass::DiseasePart, 0.75),
    ]);
    let at = Local.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap();
    let summary = PredictionSummary::new("abc", &results, status_of(&results), at);

    assert_eq!(summary.id, "abc");
    assert_eq!(summary.timestamp, "2024-05-17 09:30:05");
    assert_eq!(summary.status, "Infected");
    assert_eq!(summary.healthy_count, 0);
    assert_eq!(summary.infected_leaf_count, 1);
    assert_eq!(summary.disease_part_count, 1);
    assert_eq!(summary.healthy_confidence, 0.0);
    assert!((summary.infected_leaf_confidence - 90.0).abs() < 1e-3);
    assert!((summary.disease_part_confidence - 75.0).abs() < 1e-3);

    let json = summary.to_json().unwrap();
    let back: PredictionSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}

#[test]
fn time_calc_averages_runs() {
    use std::time::Duration;
    use leaf_detect::data::TimeCalc;

    let mut timings = TimeCalc::default();
    assert_eq!(timings.avg(), Duration::ZERO);

    timings.add_or_push(1, Duration::from_millis(30));
    timings.finish_run();
    timings.add_or_push(1, Duration::from_millis(10));
    timings.finish_run();

    assert_eq!(timings.runs(), 2);
    assert_eq!(timings.avg(), Duration::from_millis(20));
    assert_eq!(timings.avg_i(0), Duration::ZERO);
    assert_eq!(timings.avg_i(1), Duration::from_millis(20));
    assert_eq!(timings.total(), Duration::from_millis(40));
}
