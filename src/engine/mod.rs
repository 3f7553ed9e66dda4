//! Analysis engine abstraction and the OpenSees implementation.
//!
//! [`AnalysisEngine`] is the seam between the orchestration pipeline and a
//! concrete solver. The shipped implementation drives the OpenSees binary
//! through a generated Tcl script; alternative engines plug in behind the
//! same trait.

mod exec;
mod parse;
mod script;

pub use exec::{find_opensees_executable, OpenSeesAdapter, ANALYSIS_TIMEOUT_SECS};
pub use parse::ResultsParser;
pub use script::{
    TclWriter, RELEASE_ELEMENT_OFFSET, RELEASE_MATERIAL_TAG, RELEASE_NODE_OFFSET,
    RELEASE_STIFFNESS, RIGID_STIFFNESS,
};

use crate::catalog::{MaterialMap, SectionMap};
use crate::error::EngineError;
use crate::loads::{DistributedLoad, LoadCase, NodalLoad, PointLoadOnFrame};
use crate::model::StructuralModel;
use crate::results::AnalysisResults;

/// Progress callback receiving `(current_step, total_steps, message)`
pub type ProgressFn<'a> = dyn Fn(usize, usize, &str) + 'a;

/// Contract every analysis engine implements.
///
/// An engine instance holds per-run state (script path, captured output,
/// working directory) and therefore processes one run at a time; concurrent
/// analyses need one instance each.
pub trait AnalysisEngine {
    /// Store the model and catalogs for the upcoming run
    fn build_model(
        &mut self,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
    ) -> Result<(), EngineError>;

    /// Apply one load case and finalize the solver input
    fn apply_loads(
        &mut self,
        load_case: &LoadCase,
        nodal_loads: &[NodalLoad],
        distributed_loads: &[DistributedLoad],
        point_loads: &[PointLoadOnFrame],
    ) -> Result<(), EngineError>;

    /// Execute the solver. Returns whether the analysis converged; all
    /// failure modes (missing executable, timeout, non-zero exit) are
    /// reported as `false` with a diagnostic retrievable via `get_results`.
    fn run_analysis(&mut self, progress: Option<&ProgressFn>) -> bool;

    /// Extract typed results for the analyzed load case
    fn get_results(&mut self, load_case: &LoadCase) -> AnalysisResults;

    /// Reset per-run state and release the working directory
    fn clear(&mut self);
}
