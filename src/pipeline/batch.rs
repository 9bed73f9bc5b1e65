//! Running request plans, for one image or many independent images.
use super::controller::PipelineController;
use super::params::{PipelineOptions, StageRequest};
use super::stage::{StageResult, StageSummary};
use crate::diagnostics::TimingBreakdown;
use crate::error::PipelineResult;
use crate::heuristic::{FractureAssessment, Report};
use crate::raster::InputImage;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

/// Run `plan` in order on an initialized controller, stopping at the first
/// error. Returns the newest history entry.
pub fn run_plan<'c>(
    controller: &'c mut PipelineController,
    plan: &[StageRequest],
) -> PipelineResult<Option<&'c StageResult>> {
    for request in plan {
        log::debug!(
            "run_plan stage={} algorithm={}",
            request.stage(),
            request.algorithm_name()
        );
        controller.process(request)?;
    }
    Ok(controller.last_result())
}

/// Everything one analysis produced, without raster payloads.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub steps: Vec<StageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fracture: Option<FractureAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    pub timings: TimingBreakdown,
}

impl AnalysisOutcome {
    /// Collect the outcome of the controller's current history.
    pub fn from_controller(controller: &PipelineController) -> Self {
        let last = controller.last_result();
        Self {
            steps: controller.results().iter().map(StageResult::summary).collect(),
            fracture: last.and_then(|r| r.fracture()).cloned(),
            report: last.and_then(|r| r.report()).cloned(),
            timings: controller.timings(),
        }
    }
}

/// Analyze one image with a fresh controller.
pub fn analyze(
    input: InputImage<'_>,
    plan: &[StageRequest],
    options: &PipelineOptions,
) -> PipelineResult<AnalysisOutcome> {
    let mut controller = PipelineController::new(options.clone());
    controller.initialize(input)?;
    run_plan(&mut controller, plan)?;
    Ok(AnalysisOutcome::from_controller(&controller))
}

/// Analyze independent images, one controller per image.
///
/// With the `parallel` feature the images are processed on the rayon pool.
/// Outcomes are returned in input order.
pub fn analyze_batch(
    inputs: &[InputImage<'_>],
    plan: &[StageRequest],
    options: &PipelineOptions,
) -> Vec<PipelineResult<AnalysisOutcome>> {
    log::debug!(
        "analyze_batch images={} steps={} parallel={}",
        inputs.len(),
        plan.len(),
        cfg!(feature = "parallel")
    );
    #[cfg(feature = "parallel")]
    {
        inputs
            .par_iter()
            .map(|input| analyze(*input, plan, options))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        inputs
            .iter()
            .map(|input| analyze(*input, plan, options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn square_image(w: usize, h: usize, x0: usize, side: usize) -> Vec<u8> {
        let mut data = vec![10u8; w * h];
        for y in x0..x0 + side {
            for x in x0..x0 + side {
                data[y * w + x] = 200;
            }
        }
        data
    }

    #[test]
    fn default_plan_produces_report() {
        let data = square_image(80, 80, 20, 20);
        let outcome = analyze(
            InputImage::gray(80, 80, &data),
            &StageRequest::default_plan(),
            &PipelineOptions::default(),
        )
        .unwrap();
        assert!(outcome.report.is_some());
        assert!(outcome.fracture.is_some());
        assert_eq!(outcome.steps.first().map(|s| s.step), Some(0));
        assert_eq!(outcome.timings.stages.len(), outcome.steps.len());
    }

    #[test]
    fn batch_keeps_input_order_and_errors() {
        let a = square_image(64, 64, 10, 16);
        let b = vec![0u8; 5];
        let inputs = [InputImage::gray(64, 64, &a), InputImage::gray(4, 4, &b)];
        let plan = [StageRequest::Segment(Default::default())];
        let outcomes = analyze_batch(&inputs, &plan, &PipelineOptions::default());
        assert_eq!(outcomes.len(), 2);
        let first = outcomes[0].as_ref().unwrap();
        assert_eq!(first.steps.len(), 2);
        assert!(first.fracture.is_none());
        assert!(matches!(outcomes[1], Err(PipelineError::Input(_))));
    }
}
