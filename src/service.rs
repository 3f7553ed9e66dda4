//! Analysis orchestration.
//!
//! Runs the full pipeline for one load case: Validate, BuildModel,
//! ApplyLoads, RunAnalysis, ExtractResults, EnrichDiagrams. Each step
//! reports to an optional progress callback before executing, and every
//! failure after validation short-circuits into a failed
//! [`AnalysisResults`] with a descriptive message. `analyze` never
//! returns an error to the caller.

use tracing::{info, warn};

use crate::catalog::{MaterialMap, SectionMap};
use crate::diagrams::{enrich_frame_results, DEFAULT_NUM_POINTS};
use crate::engine::{AnalysisEngine, OpenSeesAdapter, ProgressFn};
use crate::loads::{DistributedLoad, LoadCase, NodalLoad, PointLoadOnFrame};
use crate::model::StructuralModel;
use crate::results::AnalysisResults;
use crate::validation::{validate_model, ValidationResult};

const TOTAL_STEPS: usize = 6;

fn report(progress: Option<&ProgressFn>, step: usize, message: &str) {
    if let Some(cb) = progress {
        cb(step, TOTAL_STEPS, message);
    }
}

/// Service running structural analyses through a pluggable engine.
pub struct AnalysisService {
    engine: Box<dyn AnalysisEngine>,
    /// Skip the validation gate; intended for tests that exercise the
    /// engine with deliberately incomplete models
    pub skip_validation: bool,
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new(Box::new(OpenSeesAdapter::new()))
    }
}

impl AnalysisService {
    pub fn new(engine: Box<dyn AnalysisEngine>) -> Self {
        Self {
            engine,
            skip_validation: false,
        }
    }

    pub fn validate(
        &self,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
    ) -> ValidationResult {
        validate_model(model, materials, sections)
    }

    /// Run the whole pipeline for one load case.
    ///
    /// Always returns a result: on any failure the result carries
    /// `success = false` and a prefixed error message naming the step
    /// that failed.
    #[allow(clippy::too_many_arguments)]
    pub fn analyze(
        &mut self,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
        load_case: &LoadCase,
        nodal_loads: &[NodalLoad],
        distributed_loads: &[DistributedLoad],
        point_loads: &[PointLoadOnFrame],
        progress: Option<&ProgressFn>,
    ) -> AnalysisResults {
        report(progress, 1, "Validating model...");
        if !self.skip_validation {
            let validation = self.validate(model, materials, sections);
            for warning in &validation.warnings {
                warn!(load_case = %load_case.name, "{warning}");
            }
            if !validation.is_valid() {
                return AnalysisResults::failed(
                    load_case.id,
                    format!("Validation failed: {}", validation.errors.join("; ")),
                );
            }
        }

        report(progress, 2, "Building analysis model...");
        self.engine.clear();
        if let Err(e) = self.engine.build_model(model, materials, sections) {
            return AnalysisResults::failed(load_case.id, format!("Failed to build model: {e}"));
        }

        report(progress, 3, "Applying loads...");
        if let Err(e) =
            self.engine
                .apply_loads(load_case, nodal_loads, distributed_loads, point_loads)
        {
            return AnalysisResults::failed(load_case.id, format!("Failed to apply loads: {e}"));
        }

        report(progress, 4, "Running analysis...");
        let converged = self.engine.run_analysis(None);

        report(progress, 5, "Extracting results...");
        let mut results = self.engine.get_results(load_case);
        results.success = converged && results.success;
        if !results.success && results.error_message.is_empty() {
            results.error_message = "Analysis did not converge".to_string();
        }

        report(progress, 6, "Reconstructing force diagrams...");
        if results.success {
            enrich_frame_results(&mut results, model, DEFAULT_NUM_POINTS);
        }

        info!(
            load_case = %load_case.name,
            success = results.success,
            elapsed = results.analysis_time_seconds,
            "analysis finished"
        );
        results
    }

    /// Analyze several load cases sequentially, filtering the load pools
    /// by case id. One failed case does not abort the batch; results come
    /// back in input order.
    #[allow(clippy::too_many_arguments)]
    pub fn analyze_multiple_cases(
        &mut self,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
        load_cases: &[LoadCase],
        nodal_loads: &[NodalLoad],
        distributed_loads: &[DistributedLoad],
        point_loads: &[PointLoadOnFrame],
        progress: Option<&ProgressFn>,
    ) -> Vec<AnalysisResults> {
        let total = load_cases.len();
        let mut all = Vec::with_capacity(total);
        for (i, case) in load_cases.iter().enumerate() {
            if let Some(cb) = progress {
                cb(i + 1, total, &format!("Analyzing {}...", case.name));
            }
            let nodal: Vec<NodalLoad> = nodal_loads
                .iter()
                .filter(|l| l.load_case_id == case.id)
                .cloned()
                .collect();
            let distributed: Vec<DistributedLoad> = distributed_loads
                .iter()
                .filter(|l| l.load_case_id == case.id)
                .cloned()
                .collect();
            let point: Vec<PointLoadOnFrame> = point_loads
                .iter()
                .filter(|l| l.load_case_id == case.id)
                .cloned()
                .collect();
            all.push(self.analyze(
                model, materials, sections, case, &nodal, &distributed, &point, None,
            ));
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use uuid::Uuid;

    use super::*;
    use crate::catalog::{default_materials, default_sections};
    use crate::error::EngineError;
    use crate::loads::LoadCaseType;
    use crate::model::Restraint;
    use crate::results::{FrameForces, FrameResult};

    /// Scripted engine standing in for the external solver
    struct FakeEngine {
        converge: bool,
        fail_apply: bool,
        build_calls: Rc<RefCell<usize>>,
    }

    impl FakeEngine {
        fn new(converge: bool) -> Self {
            Self {
                converge,
                fail_apply: false,
                build_calls: Rc::new(RefCell::new(0)),
            }
        }
    }

    impl AnalysisEngine for FakeEngine {
        fn build_model(
            &mut self,
            _model: &StructuralModel,
            _materials: &MaterialMap,
            _sections: &SectionMap,
        ) -> Result<(), EngineError> {
            *self.build_calls.borrow_mut() += 1;
            Ok(())
        }

        fn apply_loads(
            &mut self,
            _load_case: &LoadCase,
            _nodal_loads: &[NodalLoad],
            _distributed_loads: &[DistributedLoad],
            _point_loads: &[PointLoadOnFrame],
        ) -> Result<(), EngineError> {
            if self.fail_apply {
                return Err(EngineError::Script("bad load".to_string()));
            }
            Ok(())
        }

        fn run_analysis(&mut self, _progress: Option<&ProgressFn>) -> bool {
            self.converge
        }

        fn get_results(&mut self, load_case: &LoadCase) -> AnalysisResults {
            let mut results = AnalysisResults::new(load_case.id);
            results.success = self.converge;
            if self.converge {
                results.frame_results.insert(
                    1,
                    FrameResult {
                        frame_id: 1,
                        forces: vec![
                            FrameForces {
                                location: 0.0,
                                v2: 10.0,
                                m3: -50.0,
                                ..Default::default()
                            },
                            FrameForces {
                                location: 1.0,
                                v2: 10.0,
                                m3: 0.0,
                                ..Default::default()
                            },
                        ],
                    },
                );
            }
            results
        }

        fn clear(&mut self) {}
    }

    fn cantilever() -> StructuralModel {
        let mut model = StructuralModel::new();
        model.add_node(0.0, 0.0, 0.0, Restraint::fixed()).unwrap();
        model.add_node(5.0, 0.0, 0.0, Restraint::free()).unwrap();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        model
    }

    #[test]
    fn invalid_model_fails_before_touching_engine() {
        let engine = FakeEngine::new(true);
        let build_calls = Rc::clone(&engine.build_calls);
        let mut service = AnalysisService::new(Box::new(engine));
        let case = LoadCase::new("LC1", LoadCaseType::Dead).unwrap();
        let empty = StructuralModel::new();
        let results = service.analyze(
            &empty,
            &default_materials(),
            &default_sections(),
            &case,
            &[],
            &[],
            &[],
            None,
        );
        assert!(!results.success);
        assert!(results.error_message.starts_with("Validation failed:"));
        assert_eq!(*build_calls.borrow(), 0);
    }

    #[test]
    fn successful_run_enriches_diagrams() {
        let mut service = AnalysisService::new(Box::new(FakeEngine::new(true)));
        let case = LoadCase::new("LC1", LoadCaseType::Dead).unwrap();
        let results = service.analyze(
            &cantilever(),
            &default_materials(),
            &default_sections(),
            &case,
            &[],
            &[],
            &[],
            None,
        );
        assert!(results.success);
        assert_eq!(results.frame_results[&1].forces.len(), DEFAULT_NUM_POINTS);
    }

    #[test]
    fn non_convergent_run_reports_failed_result() {
        let mut service = AnalysisService::new(Box::new(FakeEngine::new(false)));
        let case = LoadCase::new("LC1", LoadCaseType::Dead).unwrap();
        let results = service.analyze(
            &cantilever(),
            &default_materials(),
            &default_sections(),
            &case,
            &[],
            &[],
            &[],
            None,
        );
        assert!(!results.success);
        assert_eq!(results.error_message, "Analysis did not converge");
        assert!(results.frame_results.is_empty());
    }

    #[test]
    fn apply_failure_is_prefixed_and_contained() {
        let mut engine = FakeEngine::new(true);
        engine.fail_apply = true;
        let mut service = AnalysisService::new(Box::new(engine));
        let case = LoadCase::new("LC1", LoadCaseType::Dead).unwrap();
        let results = service.analyze(
            &cantilever(),
            &default_materials(),
            &default_sections(),
            &case,
            &[],
            &[],
            &[],
            None,
        );
        assert!(!results.success);
        assert!(results.error_message.starts_with("Failed to apply loads:"));
    }

    #[test]
    fn progress_reports_all_six_steps() {
        let steps = RefCell::new(Vec::new());
        let cb = |step: usize, total: usize, msg: &str| {
            steps.borrow_mut().push((step, total, msg.to_string()));
        };
        let mut service = AnalysisService::new(Box::new(FakeEngine::new(true)));
        let case = LoadCase::new("LC1", LoadCaseType::Dead).unwrap();
        service.analyze(
            &cantilever(),
            &default_materials(),
            &default_sections(),
            &case,
            &[],
            &[],
            &[],
            Some(&cb),
        );
        let steps = steps.into_inner();
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0].0, 1);
        assert_eq!(steps[5], (6, 6, "Reconstructing force diagrams...".to_string()));
    }

    #[test]
    fn batch_filters_loads_by_case_and_survives_failures() {
        let mut service = AnalysisService::new(Box::new(FakeEngine::new(true)));
        let dead = LoadCase::new("Dead", LoadCaseType::Dead).unwrap();
        let live = LoadCase::new("Live", LoadCaseType::Live).unwrap();
        let model = cantilever();
        let nodal = vec![
            NodalLoad::new(2, dead.id).with_forces(0.0, 0.0, -10.0),
            NodalLoad::new(2, live.id).with_forces(0.0, 0.0, -4.0),
            NodalLoad::new(2, Uuid::new_v4()).with_forces(1.0, 0.0, 0.0),
        ];
        let results = service.analyze_multiple_cases(
            &model,
            &default_materials(),
            &default_sections(),
            &[dead.clone(), live.clone()],
            &nodal,
            &[],
            &[],
            None,
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].load_case_id, dead.id);
        assert_eq!(results[1].load_case_id, live.id);
        assert!(results.iter().all(|r| r.success));
    }
}
