//! Pre-analysis model validation.
//!
//! Decides whether a model is analyzable before anything is handed to the
//! solver. All checks run unconditionally so the caller sees every problem
//! at once rather than fixing them one at a time.

use crate::catalog::{MaterialMap, SectionMap};
use crate::model::StructuralModel;

/// Outcome of validating a model: errors block analysis, warnings do not.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validate a model against the material and section catalogs.
pub fn validate_model(
    model: &StructuralModel,
    materials: &MaterialMap,
    sections: &SectionMap,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_has_nodes(model, &mut result);
    check_has_frames(model, &mut result);
    check_supports(model, &mut result);
    check_material_references(model, materials, &mut result);
    check_section_references(model, sections, &mut result);
    check_connectivity(model, &mut result);

    result
}

fn check_has_nodes(model: &StructuralModel, result: &mut ValidationResult) {
    match model.node_count() {
        0 => result.error("Model has no nodes"),
        1 => result.error("Model must have at least 2 nodes"),
        _ => {}
    }
}

fn check_has_frames(model: &StructuralModel, result: &mut ValidationResult) {
    if model.frame_count() == 0 {
        result.error("Model has no frame elements");
    }
}

fn check_supports(model: &StructuralModel, result: &mut ValidationResult) {
    let supported: Vec<_> = model.supported_nodes().collect();
    if supported.is_empty() {
        result.error("Model has no supported nodes (no boundary conditions)");
        return;
    }

    let total_restrained: usize = supported
        .iter()
        .map(|n| n.restraint.restrained_dof_count())
        .sum();
    // Six restrained DOFs is the minimum to prevent rigid body motion in 3D
    if total_restrained < 6 {
        result.error(format!(
            "Insufficient restraints: only {total_restrained} DOFs restrained. \
             Need at least 6 for 3D stability."
        ));
    }

    let has_ux = supported.iter().any(|n| n.restraint.ux);
    let has_uy = supported.iter().any(|n| n.restraint.uy);
    let has_uz = supported.iter().any(|n| n.restraint.uz);
    if !(has_ux && has_uy && has_uz) {
        let mut missing = Vec::new();
        if !has_ux {
            missing.push("X");
        }
        if !has_uy {
            missing.push("Y");
        }
        if !has_uz {
            missing.push("Z");
        }
        result.warning(format!(
            "No translation restraint in {} direction(s). \
             Model may have rigid body motion.",
            missing.join(", ")
        ));
    }
}

fn check_material_references(
    model: &StructuralModel,
    materials: &MaterialMap,
    result: &mut ValidationResult,
) {
    for frame in model.iter_frames() {
        if !materials.contains_key(&frame.material_name) {
            result.error(format!(
                "Frame {} references unknown material '{}'",
                frame.id, frame.material_name
            ));
        }
    }
}

fn check_section_references(
    model: &StructuralModel,
    sections: &SectionMap,
    result: &mut ValidationResult,
) {
    for frame in model.iter_frames() {
        if !sections.contains_key(&frame.section_name) {
            result.error(format!(
                "Frame {} references unknown section '{}'",
                frame.id, frame.section_name
            ));
        }
    }
}

fn check_connectivity(model: &StructuralModel, result: &mut ValidationResult) {
    if model.node_count() == 0 || model.frame_count() == 0 {
        return;
    }

    let unconnected: Vec<u32> = model
        .iter_nodes()
        .filter(|n| model.frames_using_node(n.id).next().is_none())
        .map(|n| n.id)
        .collect();
    if !unconnected.is_empty() {
        result.warning(format!(
            "Nodes {unconnected:?} are not connected to any frame elements"
        ));
    }

    let mut any_supported = false;
    let mut supported_and_connected = false;
    for node in model.supported_nodes() {
        any_supported = true;
        if model.frames_using_node(node.id).next().is_some() {
            supported_and_connected = true;
            break;
        }
    }
    if any_supported && !supported_and_connected {
        result.error(
            "No supported node is connected to frame elements. Model will be unstable.",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_materials, default_sections};
    use crate::model::Restraint;

    fn cantilever() -> StructuralModel {
        let mut model = StructuralModel::new();
        model.add_node(0.0, 0.0, 0.0, Restraint::fixed()).unwrap();
        model.add_node(5.0, 0.0, 0.0, Restraint::free()).unwrap();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        model
    }

    #[test]
    fn valid_cantilever_passes() {
        let result = validate_model(&cantilever(), &default_materials(), &default_sections());
        assert!(result.is_valid(), "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_model_collects_all_errors() {
        let model = StructuralModel::new();
        let result = validate_model(&model, &default_materials(), &default_sections());
        assert!(!result.is_valid());
        // No short-circuit: node, frame and support errors all present
        assert!(result.errors.iter().any(|e| e.contains("no nodes")));
        assert!(result.errors.iter().any(|e| e.contains("no frame elements")));
        assert!(result.errors.iter().any(|e| e.contains("no supported nodes")));
    }

    #[test]
    fn insufficient_restraints_reported() {
        let mut model = StructuralModel::new();
        model.add_node(0.0, 0.0, 0.0, Restraint::pinned()).unwrap();
        model.add_node(5.0, 0.0, 0.0, Restraint::free()).unwrap();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        let result = validate_model(&model, &default_materials(), &default_sections());
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("Insufficient restraints: only 3 DOFs")));
    }

    #[test]
    fn unknown_material_and_section_reported_per_frame() {
        let mut model = cantilever();
        model
            .update_frame(1, Some("unobtanium"), Some("X99"), None, None, None)
            .unwrap();
        let result = validate_model(&model, &default_materials(), &default_sections());
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("unknown material 'unobtanium'")));
        assert!(result.errors.iter().any(|e| e.contains("unknown section 'X99'")));
    }

    #[test]
    fn floating_node_is_warning_not_error() {
        let mut model = cantilever();
        model.add_node(10.0, 10.0, 0.0, Restraint::free()).unwrap();
        let result = validate_model(&model, &default_materials(), &default_sections());
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("not connected")));
    }

    #[test]
    fn missing_translation_direction_warns() {
        let mut model = StructuralModel::new();
        // Restrain everything except translation in Y
        let r = Restraint::new(true, false, true, true, true, true);
        model.add_node(0.0, 0.0, 0.0, r).unwrap();
        model.add_node(0.0, 0.0, 3.0, r).unwrap();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        let result = validate_model(&model, &default_materials(), &default_sections());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("No translation restraint in Y")));
    }
}
