use fracture_detector::config::analyze;
use fracture_detector::morphology::distance_transform;
use fracture_detector::pipeline::{run_plan, AnalysisOutcome, PipelineController, Stage};
use fracture_detector::raster::io::{load_rgba_image, save_f32_png, save_gray_png, write_json_file};
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = analyze::load_config(Path::new(&config_path))?;

    let image = load_rgba_image(&config.input)?;
    let mut pipeline = PipelineController::new(config.pipeline.clone());
    pipeline
        .initialize(image.as_input())
        .map_err(|e| format!("Failed to initialize pipeline: {e}"))?;
    run_plan(&mut pipeline, &config.steps).map_err(|e| format!("Pipeline failed: {e}"))?;

    if let Some(dir) = &config.output.dir {
        let mut saved = 0usize;
        for (idx, result) in pipeline.results().iter().enumerate() {
            let Some(preview) = result.preview() else {
                continue;
            };
            let name = match &result.algorithm {
                Some(algorithm) => format!("{idx:02}_{}_{algorithm}.png", result.stage),
                None => format!("{idx:02}_{}.png", result.stage),
            };
            save_gray_png(&preview, &dir.join(name))?;
            saved += 1;
        }
        println!("Saved {saved} stage previews to {}", dir.display());

        let cleaned = pipeline
            .results()
            .iter()
            .rev()
            .find(|r| r.stage == Stage::Morphology)
            .and_then(|r| r.mask());
        if let Some(mask) = cleaned {
            let path = dir.join("distance.png");
            save_f32_png(&distance_transform(mask), &path)?;
            println!("Saved distance map to {}", path.display());
        }
    }

    let outcome = AnalysisOutcome::from_controller(&pipeline);
    write_json_file(&config.output.report_json, &outcome)?;

    match &outcome.fracture {
        Some(assessment) => println!(
            "fracture={} confidence={} reason={}",
            assessment.fracture, assessment.confidence, assessment.reason
        ),
        None => println!("No heuristic result (plan ended at step {})", pipeline.current_step()),
    }
    println!(
        "Saved analysis of {} steps ({:.2} ms) to {}",
        outcome.steps.len(),
        outcome.timings.total_ms,
        config.output.report_json.display()
    );

    Ok(())
}

fn usage() -> String {
    "Usage: analyze_radiograph <config.json>".to_string()
}
