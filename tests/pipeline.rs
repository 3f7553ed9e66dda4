//! Pipeline tests through the public API, with the solver simulated by
//! writing the output artifacts a converged run would produce.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use tempfile::tempdir;

use portico::catalog::{default_materials, default_sections};
use portico::diagrams::{enrich_frame_results, DEFAULT_NUM_POINTS};
use portico::engine::{ResultsParser, TclWriter};
use portico::error::EngineError;
use portico::prelude::*;

fn portal_frame() -> StructuralModel {
    // Two columns and a beam, pinned beam ends
    let mut model = StructuralModel::new();
    model.add_node(0.0, 0.0, 0.0, Restraint::fixed()).unwrap();
    model.add_node(0.0, 0.0, 3.0, Restraint::free()).unwrap();
    model.add_node(6.0, 0.0, 3.0, Restraint::free()).unwrap();
    model.add_node(6.0, 0.0, 0.0, Restraint::fixed()).unwrap();
    model.add_frame(1, 2, "A36", "W14X22").unwrap();
    model.add_frame(2, 3, "A36", "W14X22").unwrap();
    model.add_frame(4, 3, "A36", "W14X22").unwrap();
    model
        .update_frame(2, None, None, None, Some(FrameReleases::pinned_pinned()), None)
        .unwrap();
    model
}

#[test]
fn generated_script_covers_whole_portal_frame() {
    let model = portal_frame();
    let dir = tempdir().unwrap();
    let writer = TclWriter::new(dir.path());
    let case = LoadCase::new("Dead", LoadCaseType::Dead).unwrap();
    let load = DistributedLoad::uniform(2, case.id, 8.0, LoadDirection::Gravity);

    let path = writer
        .write_model(
            &model,
            &default_materials(),
            &default_sections(),
            &case,
            &[],
            &[load],
            &[],
        )
        .unwrap();
    let content = std::fs::read_to_string(path).unwrap();

    // All four nodes, both supports, three beam elements
    for id in 1..=4 {
        assert!(content.contains(&format!("node {id} ")));
    }
    assert!(content.contains("fix 1 1 1 1 1 1 1"));
    assert!(content.contains("fix 4 1 1 1 1 1 1"));
    assert_eq!(content.matches("element elasticBeamColumn").count(), 3);

    // Only the beam (frame 2) carries release hardware
    assert_eq!(content.matches("element zeroLength").count(), 2);
    assert!(content.contains(&format!(
        "element elasticBeamColumn 2 {} {}",
        1_000_000 + 2 * 2,
        1_000_000 + 2 * 2 + 1
    )));

    // Member load lands on the beam
    assert!(content.contains("eleLoad -ele 2 -type -beamUniform"));

    // Regeneration from the same inputs is byte-identical
    let load = DistributedLoad::uniform(2, case.id, 8.0, LoadDirection::Gravity);
    let again = writer
        .write_model(
            &model,
            &default_materials(),
            &default_sections(),
            &case,
            &[],
            &[load],
            &[],
        )
        .unwrap();
    assert_eq!(content, std::fs::read_to_string(again).unwrap());
}

#[test]
fn parsed_artifacts_flow_into_enriched_diagrams() {
    // Simulate a converged cantilever run: fixed node 1, tip node 2,
    // tip load 10 kN down in local y, span 5 m.
    let mut model = StructuralModel::new();
    model.add_node(0.0, 0.0, 0.0, Restraint::fixed()).unwrap();
    model.add_node(5.0, 0.0, 0.0, Restraint::free()).unwrap();
    model.add_frame(1, 2, "A36", "W14X22").unwrap();

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("node_displacements.out"),
        "1 0 0 0 0 0 0\n2 0 -8.3e-3 0 0 0 -2.5e-3\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("node_reactions.out"),
        "1 0 10.0 0 0 0 50.0\n",
    )
    .unwrap();
    // Element end forces: Vy_i=+10, Mz_i=+50, Vy_j=-10, Mz_j=0
    std::fs::write(
        dir.path().join("element_forces.out"),
        "1 0 10.0 0 0 0 50.0 0 -10.0 0 0 0 0\n",
    )
    .unwrap();

    let parser = ResultsParser::new(dir.path());
    assert!(parser.check_analysis_success("...\nANALYSIS COMPLETE\n"));

    let case = LoadCase::new("Tip", LoadCaseType::Live).unwrap();
    let mut results = AnalysisResults::new(case.id);
    results.displacements = parser.parse_displacements().unwrap();
    results.reactions = parser.parse_reactions().unwrap();
    results.frame_results = parser.parse_element_forces().unwrap();

    assert_relative_eq!(results.get_reaction(1).unwrap().fy, 10.0);
    assert_relative_eq!(results.max_displacement(), (8.3e-3f64).abs(), max_relative = 1e-9);

    enrich_frame_results(&mut results, &model, DEFAULT_NUM_POINTS);

    let fr = results.get_frame_result(1).unwrap();
    assert_eq!(fr.forces.len(), DEFAULT_NUM_POINTS);
    // Hogging -50 kN-m at the fixed end, linear to zero at the tip
    assert_relative_eq!(fr.forces[0].m3, -50.0);
    assert_relative_eq!(fr.forces[DEFAULT_NUM_POINTS - 1].m3, 0.0, epsilon = 1e-9);
    let mid = &fr.forces[DEFAULT_NUM_POINTS / 2];
    assert_relative_eq!(mid.m3, -25.0, max_relative = 1e-9);
    assert_relative_eq!(mid.v2, 10.0);
    assert_relative_eq!(fr.m_max(), -50.0);
}

/// Engine double that scripts the solver interaction
struct ScriptedEngine {
    converge: bool,
    steps: Rc<RefCell<Vec<&'static str>>>,
}

impl AnalysisEngine for ScriptedEngine {
    fn build_model(
        &mut self,
        _model: &StructuralModel,
        _materials: &MaterialMap,
        _sections: &SectionMap,
    ) -> Result<(), EngineError> {
        self.steps.borrow_mut().push("build");
        Ok(())
    }

    fn apply_loads(
        &mut self,
        _load_case: &LoadCase,
        _nodal_loads: &[NodalLoad],
        _distributed_loads: &[DistributedLoad],
        _point_loads: &[PointLoadOnFrame],
    ) -> Result<(), EngineError> {
        self.steps.borrow_mut().push("loads");
        Ok(())
    }

    fn run_analysis(&mut self, _progress: Option<&ProgressFn>) -> bool {
        self.steps.borrow_mut().push("run");
        self.converge
    }

    fn get_results(&mut self, load_case: &LoadCase) -> AnalysisResults {
        self.steps.borrow_mut().push("results");
        let mut results = AnalysisResults::new(load_case.id);
        results.success = self.converge;
        results
    }

    fn clear(&mut self) {
        self.steps.borrow_mut().push("clear");
    }
}

#[test]
fn service_drives_engine_in_contract_order() {
    let steps = Rc::new(RefCell::new(Vec::new()));
    let engine = ScriptedEngine {
        converge: true,
        steps: Rc::clone(&steps),
    };
    let mut service = AnalysisService::new(Box::new(engine));

    let mut model = StructuralModel::new();
    model.add_node(0.0, 0.0, 0.0, Restraint::fixed()).unwrap();
    model.add_node(5.0, 0.0, 0.0, Restraint::free()).unwrap();
    model.add_frame(1, 2, "A36", "W14X22").unwrap();

    let case = LoadCase::new("LC1", LoadCaseType::Dead).unwrap();
    let results = service.analyze(
        &model,
        &default_materials(),
        &default_sections(),
        &case,
        &[],
        &[],
        &[],
        None,
    );
    assert!(results.success);
    assert_eq!(
        *steps.borrow(),
        vec!["clear", "build", "loads", "run", "results"]
    );
}
