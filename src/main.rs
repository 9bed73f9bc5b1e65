use fracture_detector::pipeline::{run_plan, AnalysisOutcome};
use fracture_detector::prelude::*;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    // Demo: a synthetic "bone" shaft broken into two displaced fragments.
    let (w, h) = (320usize, 240usize);
    let mut gray = vec![30u8; w * h];
    paint_rect(&mut gray, w, (40, 100), (150, 130), 210);
    paint_rect(&mut gray, w, (170, 108), (280, 140), 205);

    let mut pipeline = PipelineController::new(PipelineOptions::default());
    pipeline
        .initialize(InputImage::gray(w, h, &gray))
        .map_err(|e| e.to_string())?;
    run_plan(&mut pipeline, &StageRequest::default_plan()).map_err(|e| e.to_string())?;

    for result in pipeline.results() {
        println!(
            "step={} stage={} algorithm={} elapsed_ms={:.3}",
            result.step,
            result.stage,
            result.algorithm.as_deref().unwrap_or("-"),
            result.elapsed_ms
        );
    }
    let outcome = AnalysisOutcome::from_controller(&pipeline);
    let json = serde_json::to_string_pretty(&outcome.report)
        .map_err(|e| format!("Failed to serialize report: {e}"))?;
    println!("{json}");
    Ok(())
}

fn paint_rect(
    data: &mut [u8],
    w: usize,
    (x0, y0): (usize, usize),
    (x1, y1): (usize, usize),
    v: u8,
) {
    for y in y0..y1 {
        data[y * w + x0..y * w + x1].fill(v);
    }
}
