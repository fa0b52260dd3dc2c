extern crate leaf_detect;

use leaf_detect::common::{LeafBox, LeafClass, LeafDetection, CONFIDENCE_THRESHOLD};
use leaf_detect::detection_processing::{
    classify_boxes, process_detections, promote_infected_leaves, screen_detections, validate_containment,
};

use fixtures::raw;

fn classes(detections: &[LeafDetection]) -> Vec<LeafClass> {
    detections.iter().map(|d| d.class).collect()
}

#[test]
fn disease_part_inside_infected_leaf_keeps_both() {
    let raw = vec![
        raw("Infected Leaf", 0.9, 0., 0., 100., 100.),
        raw("Disease Part", 0.9, 40., 40., 60., 60.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(classes(&kept), vec![LeafClass::InfectedLeaf, LeafClass::DiseasePart]);
    assert_eq!(kept[0].id, 0);
    assert_eq!(kept[1].id, 1);
}

#[test]
fn orphan_disease_part_is_dropped() {
    let raw = vec![
        raw("Healthy", 0.8, 0., 0., 100., 100.),
        raw("Disease Part", 0.9, 200., 200., 220., 220.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(classes(&kept), vec![LeafClass::Healthy]);
}

#[test]
fn infected_leaf_without_disease_is_dropped() {
    let raw = vec![raw("Infected Leaf", 0.95, 0., 0., 100., 100.)];
    assert!(process_detections(&raw, CONFIDENCE_THRESHOLD).is_empty());
}

#[test]
fn no_detections_yields_nothing() {
    assert!(process_detections(&[], CONFIDENCE_THRESHOLD).is_empty());
}

#[test]
fn healthy_is_kept_unconditionally() {
    let raw = vec![raw("Healthy", 0.7, 10., 10., 50., 50.)];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].confidence, 0.7);
}

#[test]
fn center_on_leaf_edge_counts_as_contained() {
    // Disease center is (100, 50), exactly on the right edge of the leaf.
    let raw = vec![
        raw("Infected Leaf", 0.9, 0., 0., 100., 100.),
        raw("Disease Part", 0.9, 90., 40., 110., 60.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(kept.len(), 2);

    let leaf = LeafBox::new(0., 0., 100., 100.);
    assert!(leaf.contains_point((100., 100.)));
    assert!(leaf.contains_point((0., 0.)));
    assert!(!leaf.contains_point((100.01, 50.)));
}

#[test]
fn low_confidence_disease_still_promotes_its_leaf() {
    // The weak disease part is not reported, but it is evidence for the leaf.
    let raw = vec![
        raw("Infected Leaf", 0.9, 0., 0., 100., 100.),
        raw("Disease Part", 0.3, 40., 40., 60., 60.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(classes(&kept), vec![LeafClass::InfectedLeaf]);
}

#[test]
fn disease_part_needs_an_emitted_leaf() {
    // Leaf A is promoted by the disease part in it. The second disease part
    // sits inside leaf B, which is below threshold and never emitted.
    let raw = vec![
        raw("Infected Leaf", 0.9, 0., 0., 100., 100.),
        raw("Disease Part", 0.9, 40., 40., 60., 60.),
        raw("Infected Leaf", 0.4, 300., 300., 400., 400.),
        raw("Disease Part", 0.9, 340., 340., 360., 360.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    let ids: Vec<usize> = kept.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn one_disease_part_is_enough_for_several_leaves() {
    // Overlapping leaves both contain the same disease center.
    let raw = vec![
        raw("Infected Leaf", 0.9, 0., 0., 100., 100.),
        raw("Infected Leaf", 0.8, 20., 20., 120., 120.),
        raw("Disease Part", 0.7, 45., 45., 65., 65.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(kept.len(), 3);
}

#[test]
fn every_emitted_disease_part_lies_in_an_emitted_leaf() {
    let raw = vec![
        raw("Disease Part", 0.9, 5., 5., 15., 15.),
        raw("Infected Leaf", 0.9, 0., 0., 50., 50.),
        raw("Infected Leaf", 0.9, 100., 100., 150., 150.),
        raw("Disease Part", 0.9, 160., 160., 170., 170.),
        raw("Healthy", 0.9, 200., 0., 260., 60.),
        raw("Disease Part", 0.65, 30., 30., 40., 40.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    let leaves: Vec<&LeafDetection> = kept.iter().filter(|d| d.class == LeafClass::InfectedLeaf).collect();
    for part in kept.iter().filter(|d| d.class == LeafClass::DiseasePart) {
        assert!(leaves.iter().any(|leaf| leaf.bbox.contains_center_of(&part.bbox)));
    }
    for leaf in &leaves {
        assert!(raw
            .iter()
            .filter(|r| r.label == "Disease Part")
            .any(|r| leaf.bbox.contains_center_of(&r.bbox)));
    }
    let ids: Vec<usize> = kept.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![0, 1, 4, 5]);
}

#[test]
fn leaves_with_identical_boxes_are_told_apart_by_id() {
    let raw = vec![
        raw("Infected Leaf", 0.9, 0., 0., 100., 100.),
        raw("Infected Leaf", 0.5, 0., 0., 100., 100.),
        raw("Disease Part", 0.9, 40., 40., 60., 60.),
    ];
    let (screened, _) = screen_detections(&raw);
    let promoted = promote_infected_leaves(&classify_boxes(&screened), CONFIDENCE_THRESHOLD);
    assert!(promoted.contains(&0));
    assert!(!promoted.contains(&1));

    let kept = validate_containment(&screened, CONFIDENCE_THRESHOLD);
    let ids: Vec<usize> = kept.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![0, 2]);
}

#[test]
fn malformed_detections_are_skipped() {
    let raw = vec![
        raw("Healthy", 0.9, 50., 50., 10., 10.),
        raw("Mango", 0.9, 0., 0., 10., 10.),
        raw("Healthy", f32::NAN, 0., 0., 10., 10.),
        raw("healthy", 0.9, 0., 0., 10., 10.),
    ];
    let (screened, skipped) = screen_detections(&raw);
    assert_eq!(skipped, 3);
    assert_eq!(screened.len(), 1);
    assert_eq!(screened[0].id, 3);
    assert_eq!(screened[0].class, LeafClass::Healthy);

    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(kept.len(), 1);
}

#[test]
fn classify_preserves_order_and_drops_nothing() {
    let raw = vec![
        raw("Disease Part", 0.1, 0., 0., 1., 1.),
        raw("Healthy", 0.9, 0., 0., 1., 1.),
        raw("Disease Part", 0.9, 2., 2., 3., 3.),
        raw("Infected Leaf", 0.2, 0., 0., 5., 5.),
    ];
    let (screened, _) = screen_detections(&raw);
    let classified = classify_boxes(&screened);
    assert_eq!(classified.len(), 4);
    let part_ids: Vec<usize> = classified.get(LeafClass::DiseasePart).iter().map(|d| d.id).collect();
    assert_eq!(part_ids, vec![0, 2]);
    assert_eq!(classified.healthy.len(), 1);
    assert_eq!(classified.infected_leaf.len(), 1);
}

#[test]
fn threshold_is_rechecked() {
    let raw = vec![
        raw("Healthy", 0.59, 0., 0., 10., 10.),
        raw("Healthy", 0.6, 20., 20., 30., 30.),
    ];
    let kept = process_detections(&raw, CONFIDENCE_THRESHOLD);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, 1);
}
