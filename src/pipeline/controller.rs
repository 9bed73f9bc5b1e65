//! Stateful controller driving one analysis through the pipeline.
//!
//! The [`PipelineController`] owns the original raster and an append-only
//! history of [`StageResult`]s. Every stage request reads its input from the
//! newest usable history entry: results of downstream stages are skipped,
//! and hitting an entry of an upstream stage first means the input is
//! missing. A missing input is either produced by running the configured
//! default request for the prerequisite stage (the default policy) or
//! reported as [`PipelineError::MissingPrerequisite`].
//!
//! ```no_run
//! use fracture_detector::prelude::*;
//!
//! # fn example(w: usize, h: usize, gray: Vec<u8>) -> PipelineResult<()> {
//! let mut pipeline = PipelineController::new(PipelineOptions::default());
//! pipeline.initialize(InputImage::gray(w, h, &gray))?;
//! pipeline.segment(SegmentationAlgorithm::Otsu)?;
//! let result = pipeline.heuristic(HeuristicRequest::new(HeuristicAlgorithm::Fracture))?;
//! if let Some(assessment) = result.fracture() {
//!     println!("fracture={} confidence={}", assessment.fracture, assessment.confidence);
//! }
//! # Ok(())
//! # }
//! ```
use super::params::{FeatureRequest, MorphologyRequest, PipelineOptions, StageRequest};
use super::stage::{HeuristicState, Stage, StageData, StageResult};
use crate::diagnostics::{elapsed_ms, TimingBreakdown};
use crate::error::{PipelineError, PipelineResult};
use crate::features::extract_features;
use crate::heuristic::{
    analyze_fracture, classify_severity, generate_report, FractureOptions, HeuristicAlgorithm,
    HeuristicRequest,
};
use crate::morphology::apply_morphology;
use crate::preprocess::PreprocessAlgorithm;
use crate::raster::{GrayImage, InputImage};
use crate::segmentation::SegmentationAlgorithm;
use log::debug;
use std::ops::RangeInclusive;
use std::time::Instant;

/// Steps whose gray raster feeds preprocessing and segmentation.
const GRAY_INPUT: RangeInclusive<u8> = 0..=1;
/// Steps whose mask feeds morphology.
const MASK_INPUT: RangeInclusive<u8> = 2..=3;
/// Step whose mask feeds feature analysis.
const CLEAN_MASK_INPUT: RangeInclusive<u8> = 3..=3;
/// Step whose components feed the heuristics.
const FEATURE_INPUT: RangeInclusive<u8> = 4..=4;

/// Owns one in-flight analysis: the original raster and the stage history.
pub struct PipelineController {
    options: PipelineOptions,
    original: Option<GrayImage>,
    results: Vec<StageResult>,
}

impl Default for PipelineController {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl PipelineController {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            original: None,
            results: Vec::new(),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Validate `input`, convert it to grayscale and start a new history.
    ///
    /// Any previous history is discarded, even when validation fails.
    pub fn initialize(&mut self, input: InputImage<'_>) -> PipelineResult<&StageResult> {
        self.reset();
        let start = Instant::now();
        let gray = input.to_gray()?;
        debug!(
            "PipelineController::initialize w={} h={} format={:?}",
            gray.w, gray.h, input.format
        );
        self.original = Some(gray.clone());
        Ok(self.push(StageResult {
            step: Stage::Original.step(),
            stage: Stage::Original,
            algorithm: None,
            data: StageData::Gray(gray),
            elapsed_ms: elapsed_ms(start),
        }))
    }

    /// Run one stage request.
    pub fn process(&mut self, request: &StageRequest) -> PipelineResult<&StageResult> {
        match request {
            StageRequest::Preprocess(algorithm) => self.preprocess(algorithm.clone()),
            StageRequest::Segment(algorithm) => self.segment(algorithm.clone()),
            StageRequest::Morphology(req) => self.morphology(req.clone()),
            StageRequest::Features(req) => self.features(req.clone()),
            StageRequest::Heuristic(req) => self.heuristic(req.clone()),
        }
    }

    /// Enhance the newest gray raster (original or a previous preprocessing).
    pub fn preprocess(&mut self, algorithm: PreprocessAlgorithm) -> PipelineResult<&StageResult> {
        self.ensure_initialized()?;
        let start = Instant::now();
        let output = algorithm.apply(self.gray_input()?);
        debug!(
            "PipelineController::preprocess algorithm={} w={} h={}",
            algorithm.name(),
            output.w,
            output.h
        );
        Ok(self.push(StageResult {
            step: Stage::Preprocessing.step(),
            stage: Stage::Preprocessing,
            algorithm: Some(algorithm.name().to_string()),
            data: StageData::Gray(output),
            elapsed_ms: elapsed_ms(start),
        }))
    }

    /// Binarize the newest gray raster.
    pub fn segment(&mut self, algorithm: SegmentationAlgorithm) -> PipelineResult<&StageResult> {
        self.ensure_initialized()?;
        let start = Instant::now();
        let output = algorithm.apply(self.gray_input()?);
        debug!(
            "PipelineController::segment algorithm={} threshold={:?} fg={:.4}",
            algorithm.name(),
            output.threshold,
            output.mask.foreground_fraction()
        );
        Ok(self.push(StageResult {
            step: Stage::Segmentation.step(),
            stage: Stage::Segmentation,
            algorithm: Some(algorithm.name().to_string()),
            data: StageData::Binary {
                mask: output.mask,
                threshold: output.threshold,
                pre_dilated: false,
            },
            elapsed_ms: elapsed_ms(start),
        }))
    }

    /// Clean the newest mask (segmentation or a previous morphology run).
    pub fn morphology(&mut self, request: MorphologyRequest) -> PipelineResult<&StageResult> {
        self.ensure_initialized()?;
        if self.find_input(MASK_INPUT).is_none() {
            self.resolve(Stage::Morphology, Stage::Segmentation)?;
        }
        let start = Instant::now();
        let input = self.mask_input(MASK_INPUT, Stage::Morphology, Stage::Segmentation)?;
        let output = apply_morphology(input, request.operation, &request.options);
        debug!(
            "PipelineController::morphology op={} kernel={} iterations={} pre_dilated={}",
            request.operation.name(),
            request.options.kernel_size,
            request.options.iterations,
            output.pre_dilated
        );
        Ok(self.push(StageResult {
            step: Stage::Morphology.step(),
            stage: Stage::Morphology,
            algorithm: Some(request.operation.name().to_string()),
            data: StageData::Binary {
                mask: output.mask,
                threshold: None,
                pre_dilated: output.pre_dilated,
            },
            elapsed_ms: elapsed_ms(start),
        }))
    }

    /// Label and describe the components of the newest morphology mask.
    pub fn features(&mut self, request: FeatureRequest) -> PipelineResult<&StageResult> {
        self.ensure_initialized()?;
        if self.find_input(CLEAN_MASK_INPUT).is_none() {
            self.resolve(Stage::FeatureAnalysis, Stage::Morphology)?;
        }
        let start = Instant::now();
        let mask = self
            .mask_input(CLEAN_MASK_INPUT, Stage::FeatureAnalysis, Stage::Morphology)?
            .clone();
        let output = extract_features(&mask, request.algorithm, &request.options);
        Ok(self.push(StageResult {
            step: Stage::FeatureAnalysis.step(),
            stage: Stage::FeatureAnalysis,
            algorithm: Some(request.algorithm.name().to_string()),
            data: StageData::Features {
                mask,
                output: Box::new(output),
            },
            elapsed_ms: elapsed_ms(start),
        }))
    }

    /// Advance the heuristic state machine (Fracture → Severity → Report).
    ///
    /// Missing earlier states are produced first with the request's fracture
    /// options, or the controller's when the request carries none.
    pub fn heuristic(&mut self, request: HeuristicRequest) -> PipelineResult<&StageResult> {
        self.ensure_initialized()?;
        if self.find_input(FEATURE_INPUT).is_none() {
            self.resolve(Stage::Heuristic, Stage::FeatureAnalysis)?;
        }
        let options = request
            .options
            .clone()
            .unwrap_or_else(|| self.options.fracture.clone());

        let requested = request.algorithm;
        if requested >= HeuristicAlgorithm::Severity && !self.has_state(|s| s.fracture.is_some())
        {
            self.resolve_heuristic(requested, HeuristicAlgorithm::Fracture, &options)?;
        }
        if requested == HeuristicAlgorithm::Report && !self.has_state(|s| s.severity.is_some()) {
            self.resolve_heuristic(requested, HeuristicAlgorithm::Severity, &options)?;
        }

        let start = Instant::now();
        let state = self.next_heuristic_state(requested, &options)?;
        Ok(self.push(StageResult {
            step: Stage::Heuristic.step(),
            stage: Stage::Heuristic,
            algorithm: Some(requested.name().to_string()),
            data: StageData::Heuristic(Box::new(state)),
            elapsed_ms: elapsed_ms(start),
        }))
    }

    /// Newest history entry.
    pub fn last_result(&self) -> Option<&StageResult> {
        self.results.last()
    }

    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    /// Step number of the newest entry; 0 when uninitialized.
    pub fn current_step(&self) -> u8 {
        self.results.last().map_or(0, |r| r.step)
    }

    pub fn original(&self) -> Option<&GrayImage> {
        self.original.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.original.is_some()
    }

    /// Per-entry timings of the current history.
    pub fn timings(&self) -> TimingBreakdown {
        let mut timings = TimingBreakdown::default();
        for r in &self.results {
            let label = match &r.algorithm {
                Some(algorithm) => format!("{}/{}", r.stage, algorithm),
                None => r.stage.to_string(),
            };
            timings.push(label, r.elapsed_ms);
        }
        timings
    }

    /// Discard the original raster and the whole history.
    pub fn reset(&mut self) {
        if !self.results.is_empty() {
            debug!(
                "PipelineController::reset discarding {} results",
                self.results.len()
            );
        }
        self.original = None;
        self.results.clear();
    }

    fn push(&mut self, result: StageResult) -> &StageResult {
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    fn ensure_initialized(&self) -> PipelineResult<()> {
        if self.original.is_none() {
            return Err(PipelineError::NotInitialized);
        }
        Ok(())
    }

    /// Index of the newest entry whose step lies in `accepted`, stopping at
    /// the first upstream entry.
    fn find_input(&self, accepted: RangeInclusive<u8>) -> Option<usize> {
        for (idx, r) in self.results.iter().enumerate().rev() {
            if accepted.contains(&r.step) {
                return Some(idx);
            }
            if r.step < *accepted.start() {
                return None;
            }
        }
        None
    }

    fn gray_input(&self) -> PipelineResult<&GrayImage> {
        self.find_input(GRAY_INPUT)
            .and_then(|idx| self.results[idx].gray())
            .ok_or(PipelineError::NotInitialized)
    }

    fn mask_input(
        &self,
        accepted: RangeInclusive<u8>,
        stage: Stage,
        prerequisite: Stage,
    ) -> PipelineResult<&GrayImage> {
        self.find_input(accepted)
            .and_then(|idx| self.results[idx].mask())
            .ok_or(PipelineError::MissingPrerequisite {
                stage,
                prerequisite,
            })
    }

    /// Run the configured default request for `prerequisite`.
    fn resolve(&mut self, stage: Stage, prerequisite: Stage) -> PipelineResult<()> {
        if !self.options.auto_resolve_prerequisites {
            return Err(PipelineError::MissingPrerequisite {
                stage,
                prerequisite,
            });
        }
        debug!("PipelineController::process stage={stage} auto-running {prerequisite}");
        let defaults = self.options.defaults.clone();
        match prerequisite {
            Stage::Segmentation => self.segment(defaults.segmentation).map(|_| ()),
            Stage::Morphology => self.morphology(defaults.morphology).map(|_| ()),
            Stage::FeatureAnalysis => self.features(defaults.features).map(|_| ()),
            Stage::Original | Stage::Preprocessing | Stage::Heuristic => {
                Err(PipelineError::MissingPrerequisite {
                    stage,
                    prerequisite,
                })
            }
        }
    }

    fn resolve_heuristic(
        &mut self,
        requested: HeuristicAlgorithm,
        prerequisite: HeuristicAlgorithm,
        options: &FractureOptions,
    ) -> PipelineResult<()> {
        if !self.options.auto_resolve_prerequisites {
            return Err(PipelineError::MissingHeuristicState {
                requested,
                prerequisite,
            });
        }
        debug!("PipelineController::heuristic algorithm={requested} auto-running {prerequisite}");
        self.heuristic(HeuristicRequest::new(prerequisite).with_options(options.clone()))
            .map(|_| ())
    }

    /// Newest heuristic state recorded after the current feature result.
    fn heuristic_state(&self) -> Option<&HeuristicState> {
        let last = self.results.last()?;
        if last.stage == Stage::Heuristic {
            last.heuristic()
        } else {
            None
        }
    }

    fn has_state(&self, check: impl Fn(&HeuristicState) -> bool) -> bool {
        self.heuristic_state().is_some_and(check)
    }

    fn next_heuristic_state(
        &self,
        algorithm: HeuristicAlgorithm,
        options: &FractureOptions,
    ) -> PipelineResult<HeuristicState> {
        let missing = |prerequisite| PipelineError::MissingHeuristicState {
            requested: algorithm,
            prerequisite,
        };
        match algorithm {
            HeuristicAlgorithm::Fracture => {
                let features = self
                    .find_input(FEATURE_INPUT)
                    .map(|idx| &self.results[idx])
                    .ok_or(PipelineError::MissingPrerequisite {
                        stage: Stage::Heuristic,
                        prerequisite: Stage::FeatureAnalysis,
                    })?;
                let (width, height) = features.mask().map_or((0, 0), |m| (m.w, m.h));
                let components = features
                    .features()
                    .map(|f| f.components.clone())
                    .unwrap_or_default();
                let fracture = analyze_fracture(&components, width, height, options);
                debug!(
                    "PipelineController::heuristic fracture={} confidence={} reason={}",
                    fracture.fracture, fracture.confidence, fracture.reason
                );
                Ok(HeuristicState {
                    width,
                    height,
                    components,
                    fracture: Some(fracture),
                    severity: None,
                    report: None,
                })
            }
            HeuristicAlgorithm::Severity => {
                let mut state = self
                    .heuristic_state()
                    .cloned()
                    .ok_or_else(|| missing(HeuristicAlgorithm::Fracture))?;
                let fracture = state
                    .fracture
                    .as_ref()
                    .ok_or_else(|| missing(HeuristicAlgorithm::Fracture))?;
                let severity = classify_severity(fracture);
                debug!(
                    "PipelineController::heuristic severity={:?} level={}",
                    severity.severity,
                    severity.level
                );
                state.severity = Some(severity);
                Ok(state)
            }
            HeuristicAlgorithm::Report => {
                let mut state = self
                    .heuristic_state()
                    .cloned()
                    .ok_or_else(|| missing(HeuristicAlgorithm::Fracture))?;
                let fracture = state
                    .fracture
                    .as_ref()
                    .ok_or_else(|| missing(HeuristicAlgorithm::Fracture))?;
                let severity = state
                    .severity
                    .as_ref()
                    .ok_or_else(|| missing(HeuristicAlgorithm::Severity))?;
                let report = generate_report(fracture, &state.components, severity);
                state.report = Some(report);
                Ok(state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::MorphologyOp;
    use crate::raster::FOREGROUND;

    fn two_blocks() -> Vec<u8> {
        let (w, h) = (64, 64);
        let mut data = vec![20u8; w * h];
        for y in 0..h {
            for x in 0..w {
                let a = (8..24).contains(&x) && (8..24).contains(&y);
                let b = (40..52).contains(&x) && (40..52).contains(&y);
                if a || b {
                    data[y * w + x] = 220;
                }
            }
        }
        data
    }

    fn controller(auto: bool) -> PipelineController {
        let mut c = PipelineController::new(PipelineOptions {
            auto_resolve_prerequisites: auto,
            ..PipelineOptions::default()
        });
        let data = two_blocks();
        c.initialize(InputImage::gray(64, 64, &data)).unwrap();
        c
    }

    #[test]
    fn stage_before_initialize_fails() {
        let mut c = PipelineController::default();
        let err = c.segment(SegmentationAlgorithm::Otsu).unwrap_err();
        assert!(matches!(err, PipelineError::NotInitialized));
        assert_eq!(c.current_step(), 0);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut c = PipelineController::default();
        let err = c.initialize(InputImage::gray(4, 4, &[0u8; 3])).unwrap_err();
        assert!(matches!(err, PipelineError::Input(_)));
        assert!(!c.is_initialized());
    }

    #[test]
    fn heuristic_auto_runs_missing_stages() {
        let mut c = controller(true);
        let stages: Vec<Stage> = {
            let r = c
                .heuristic(HeuristicRequest::new(HeuristicAlgorithm::Report))
                .unwrap();
            assert!(r.report().is_some());
            assert!(r.fracture().is_some());
            c.results().iter().map(|r| r.stage).collect()
        };
        assert_eq!(
            stages,
            vec![
                Stage::Original,
                Stage::Segmentation,
                Stage::Morphology,
                Stage::FeatureAnalysis,
                Stage::Heuristic,
                Stage::Heuristic,
                Stage::Heuristic,
            ]
        );
        assert_eq!(c.current_step(), 5);
    }

    #[test]
    fn disabled_auto_resolution_reports_prerequisite() {
        let mut c = controller(false);
        let err = c
            .morphology(MorphologyRequest::new(MorphologyOp::Opening))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingPrerequisite {
                stage: Stage::Morphology,
                prerequisite: Stage::Segmentation,
            }
        ));

        c.segment(SegmentationAlgorithm::Otsu).unwrap();
        c.morphology(MorphologyRequest::new(MorphologyOp::Opening))
            .unwrap();
        c.features(FeatureRequest::default()).unwrap();
        let err = c
            .heuristic(HeuristicRequest::new(HeuristicAlgorithm::Severity))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingHeuristicState {
                requested: HeuristicAlgorithm::Severity,
                prerequisite: HeuristicAlgorithm::Fracture,
            }
        ));
    }

    #[test]
    fn upstream_rerun_invalidates_downstream_inputs() {
        let mut c = controller(false);
        c.segment(SegmentationAlgorithm::Otsu).unwrap();
        c.morphology(MorphologyRequest::new(MorphologyOp::Opening))
            .unwrap();
        c.segment(SegmentationAlgorithm::Otsu).unwrap();
        let err = c.features(FeatureRequest::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingPrerequisite {
                stage: Stage::FeatureAnalysis,
                prerequisite: Stage::Morphology,
            }
        ));
    }

    #[test]
    fn segmentation_reads_latest_preprocessing() {
        let mut c = controller(true);
        c.preprocess(PreprocessAlgorithm::Histogram).unwrap();
        let r = c.segment(SegmentationAlgorithm::Otsu).unwrap();
        let mask = r.mask().unwrap();
        assert!(mask.data.iter().all(|&v| v == 0 || v == FOREGROUND));
        assert_eq!(mask.foreground_count(), 16 * 16 + 12 * 12);
    }

    #[test]
    fn fracture_rerun_starts_fresh_state() {
        let mut c = controller(true);
        c.heuristic(HeuristicRequest::new(HeuristicAlgorithm::Report))
            .unwrap();
        let r = c
            .heuristic(HeuristicRequest::new(HeuristicAlgorithm::Fracture))
            .unwrap();
        assert!(r.fracture().is_some());
        assert!(r.severity().is_none());
        assert!(r.report().is_none());
    }

    #[test]
    fn reset_clears_history_and_timings() {
        let mut c = controller(true);
        c.segment(SegmentationAlgorithm::Otsu).unwrap();
        let timings = c.timings();
        assert_eq!(timings.stages.len(), 2);
        assert_eq!(timings.stages[1].label, "segmentation/otsu");
        c.reset();
        assert!(c.results().is_empty());
        assert!(c.original().is_none());
        assert!(c.timings().stages.is_empty());
    }
}
