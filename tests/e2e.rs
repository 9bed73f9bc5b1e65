mod common;

use common::synthetic_image::{gray_to_rgba, rects_mask, rects_u8, Rect};
use fracture_detector::features::{analyze_components, FeatureAlgorithm};
use fracture_detector::heuristic::{analyze_fracture, FractureOptions, Severity};
use fracture_detector::morphology::{MorphologyOp, MorphologyOptions};
use fracture_detector::pipeline::{run_plan, FeatureRequest, MorphologyRequest};
use fracture_detector::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Segment → closing (no pre-dilation) → components → report.
fn mask_preserving_plan() -> Vec<StageRequest> {
    vec![
        StageRequest::Segment(SegmentationAlgorithm::Otsu),
        StageRequest::Morphology(MorphologyRequest {
            operation: MorphologyOp::Closing,
            options: MorphologyOptions {
                pre_dilate_sparse: false,
                ..MorphologyOptions::default()
            },
        }),
        StageRequest::Features(FeatureRequest::new(FeatureAlgorithm::Components)),
        StageRequest::Heuristic(HeuristicRequest::new(HeuristicAlgorithm::Report)),
    ]
}

#[test]
fn two_separated_squares_are_a_fracture() {
    init_logger();
    let squares = [Rect::square(20, 20, 10), Rect::square(150, 150, 8)];

    let mask = rects_mask(200, 200, &squares);
    let analysis = analyze_components(&mask);
    let direct = analyze_fracture(&analysis.components, 200, 200, &FractureOptions::default());
    assert!(direct.fracture);
    assert_eq!(direct.details.n_significant, 2);
    assert!(
        (direct.details.second_ratio - 0.64).abs() < 1e-9,
        "secondRatio={}",
        direct.details.second_ratio
    );
    assert!(direct.confidence >= 60, "confidence={}", direct.confidence);

    let gray = rects_u8(200, 200, 0, &squares, 255);
    let mut pipeline = PipelineController::new(PipelineOptions::default());
    pipeline.initialize(InputImage::gray(200, 200, &gray)).unwrap();
    let last = run_plan(&mut pipeline, &mask_preserving_plan())
        .unwrap()
        .expect("plan produced results");
    let fracture = last.fracture().expect("report carries the fracture state");
    assert_eq!(fracture, &direct);
    let report = last.report().expect("report state");
    assert!(report.summary.has_fracture);
    assert_eq!(report.components.len(), 2);
    assert_eq!(last.severity().map(|s| s.severity), Some(Severity::Simple));
}

#[test]
fn single_square_is_not_a_fracture() {
    init_logger();
    let mask = rects_mask(200, 200, &[Rect::square(95, 95, 10)]);
    let analysis = analyze_components(&mask);
    assert_eq!(analysis.n_components, 1);
    let c = &analysis.components[0];
    assert_eq!(c.area, 100);
    assert_eq!(c.aspect_ratio, 1.0);

    let a = analyze_fracture(&analysis.components, 200, 200, &FractureOptions::default());
    assert!(!a.fracture);
    assert_eq!(a.details.n_significant, 1);
}

#[test]
fn empty_image_is_a_confident_negative() {
    init_logger();
    let gray = vec![0u8; 200 * 200];
    let mut pipeline = PipelineController::default();
    pipeline.initialize(InputImage::gray(200, 200, &gray)).unwrap();
    let result = pipeline
        .heuristic(HeuristicRequest::new(HeuristicAlgorithm::Report))
        .unwrap();
    let fracture = result.fracture().unwrap();
    assert!(!fracture.fracture);
    assert_eq!(fracture.confidence, 95);
    assert_eq!(fracture.details.n_components, 0);
    assert_eq!(result.severity().map(|s| s.severity), Some(Severity::None));

    let features = pipeline
        .results()
        .iter()
        .find_map(|r| r.features())
        .expect("feature stage ran");
    assert_eq!(features.analysis.n_components, 0);
}

fn two_bars_rgba() -> Vec<u8> {
    let gray = rects_u8(
        160,
        120,
        15,
        &[
            Rect {
                x0: 20,
                y0: 50,
                x1: 75,
                y1: 70,
            },
            Rect {
                x0: 85,
                y0: 52,
                x1: 140,
                y1: 72,
            },
        ],
        210,
    );
    gray_to_rgba(&gray)
}

#[test]
fn rgba_input_runs_the_default_plan() {
    init_logger();
    let rgba = two_bars_rgba();
    let mut pipeline = PipelineController::default();
    pipeline.initialize(InputImage::rgba(160, 120, &rgba)).unwrap();
    let plan = StageRequest::default_plan();
    let last = run_plan(&mut pipeline, &plan)
        .unwrap()
        .cloned()
        .expect("plan produced results");

    assert_eq!(pipeline.results().len(), 1 + plan.len());
    assert!(last.report().is_some());
    let features = pipeline
        .results()
        .iter()
        .find_map(|r| r.features())
        .expect("feature stage ran");
    assert!(features.classification.is_some());

    let json = serde_json::to_value(last.summary()).unwrap();
    assert_eq!(json["stage"], "heuristic");
    assert_eq!(json["algorithm"], "report");
    assert!(json["report"]["summary"]["hasFracture"].is_boolean());
}

#[test]
fn displaced_bars_are_reported_as_fracture() {
    init_logger();
    let rgba = two_bars_rgba();
    let mut pipeline = PipelineController::default();
    pipeline.initialize(InputImage::rgba(160, 120, &rgba)).unwrap();
    let plan = [
        StageRequest::Segment(SegmentationAlgorithm::Otsu),
        StageRequest::Morphology(MorphologyRequest::new(MorphologyOp::Opening)),
        StageRequest::Features(FeatureRequest::new(FeatureAlgorithm::Classifier)),
        StageRequest::Heuristic(HeuristicRequest::new(HeuristicAlgorithm::Report)),
    ];
    let last = run_plan(&mut pipeline, &plan)
        .unwrap()
        .cloned()
        .expect("plan produced results");

    let features = pipeline
        .results()
        .iter()
        .find_map(|r| r.features())
        .expect("feature stage ran");
    assert_eq!(features.components.len(), 2);
    assert!(features.components.iter().all(|c| c.area == 55 * 20));
    let classification = features.classification.as_ref().unwrap();
    assert_eq!(classification.total_components, 2);

    let fracture = last.fracture().expect("report carries the fracture state");
    assert!(fracture.fracture, "reason={}", fracture.reason);
    assert_eq!(fracture.details.n_significant, 2);
    assert_eq!(fracture.details.second_ratio, 1.0);
    assert_eq!(fracture.confidence, 95);
}
