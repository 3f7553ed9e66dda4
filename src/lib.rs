//! Portico - a structural modeling and analysis front end core
//!
//! This library provides the analysis orchestration pipeline for 3D frame
//! models:
//! - A typed domain model (nodes, frames, shells, restraints, releases, loads)
//! - A validation gate deciding whether a model is analyzable
//! - Deterministic translation of a model into an OpenSees TCL script,
//!   including soft-spring encoding of partial end releases
//! - Subprocess execution of the OpenSees binary with a hard timeout
//! - Parsing of solver output back into typed results
//! - Analytical reconstruction of continuous internal-force diagrams
//!
//! All units are SI: meters, kilonewtons, kN·m. Elastic moduli are stored in
//! kN/m² (kPa) so no unit conversion happens at the solver boundary.
//!
//! ## Example
//! ```rust
//! use portico::prelude::*;
//!
//! let mut model = StructuralModel::new();
//! let n1 = model.add_node(0.0, 0.0, 0.0, Restraint::fixed()).unwrap().id;
//! let n2 = model.add_node(5.0, 0.0, 0.0, Restraint::free()).unwrap().id;
//! model.add_frame(n1, n2, "A36", "W14X22").unwrap();
//!
//! let materials = MaterialMap::from([("A36".to_string(), Material::steel_a36())]);
//! let sections = SectionMap::from([("W14X22".to_string(), Section::w14x22())]);
//!
//! let report = validate_model(&model, &materials, &sections);
//! assert!(report.is_valid());
//! ```

pub mod catalog;
pub mod diagrams;
pub mod engine;
pub mod error;
pub mod loads;
pub mod model;
pub mod results;
pub mod service;
pub mod validation;

// Re-export common types
pub mod prelude {
    pub use crate::catalog::{Material, MaterialMap, Section, SectionMap};
    pub use crate::engine::{AnalysisEngine, OpenSeesAdapter, ProgressFn};
    pub use crate::error::{EngineError, ModelError};
    pub use crate::loads::{
        DistributedLoad, LoadCase, LoadCaseType, LoadDirection, NodalLoad, PointLoadDirection,
        PointLoadOnFrame,
    };
    pub use crate::model::{
        Frame, FrameReleases, LocalAxes, Node, Restraint, RestraintType, Shell, ShellType,
        StructuralModel,
    };
    pub use crate::results::{
        AnalysisResults, FrameForces, FrameResult, NodalDisplacement, NodalReaction,
    };
    pub use crate::service::AnalysisService;
    pub use crate::validation::{validate_model, ValidationResult};
}
