//! Material and section catalogs.
//!
//! Frames carry material and section names; the catalogs resolve those
//! names to physical properties at translation time. All values are SI:
//! stiffness in kPa, areas in m2, inertias in m4, density in kg/m3.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Named lookup from material name to properties
pub type MaterialMap = HashMap<String, Material>;

/// Named lookup from section name to properties
pub type SectionMap = HashMap<String, Section>;

/// Isotropic linear-elastic material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Young's modulus, kPa
    pub elastic_modulus: f64,
    /// Poisson's ratio
    pub poisson_ratio: f64,
    /// Density, kg/m3
    pub density: f64,
    /// Yield strength, kPa (steel)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_strength: Option<f64>,
    /// Ultimate tensile strength, kPa (steel)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultimate_strength: Option<f64>,
    /// Compressive strength f'c, kPa (concrete)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressive_strength: Option<f64>,
}

impl Material {
    pub fn new(name: &str, elastic_modulus: f64, poisson_ratio: f64, density: f64) -> Self {
        Self {
            name: name.to_string(),
            elastic_modulus,
            poisson_ratio,
            density,
            yield_strength: None,
            ultimate_strength: None,
            compressive_strength: None,
        }
    }

    /// Shear modulus derived from E and nu, kPa
    pub fn shear_modulus(&self) -> f64 {
        self.elastic_modulus / (2.0 * (1.0 + self.poisson_ratio))
    }

    /// ASTM A36 structural steel
    pub fn steel_a36() -> Self {
        let mut m = Self::new("A36", 200.0e6, 0.3, 7850.0);
        m.yield_strength = Some(250.0e3);
        m.ultimate_strength = Some(400.0e3);
        m
    }

    /// Normal-weight concrete, f'c = 30 MPa
    pub fn concrete_30() -> Self {
        let mut m = Self::new("H30", 25.7e6, 0.2, 2400.0);
        m.compressive_strength = Some(30.0e3);
        m
    }
}

/// Frame cross-section properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// Cross-sectional area, m2
    pub area: f64,
    /// Torsional constant, m4
    pub torsional_constant: f64,
    /// Moment of inertia about local axis 2, m4
    pub i22: f64,
    /// Moment of inertia about local axis 3 (major), m4
    pub i33: f64,
    /// Overall depth, m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    /// Flange width, m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flange_width: Option<f64>,
    /// Web thickness, m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_thickness: Option<f64>,
    /// Flange thickness, m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flange_thickness: Option<f64>,
}

impl Section {
    pub fn new(name: &str, area: f64, torsional_constant: f64, i22: f64, i33: f64) -> Self {
        Self {
            name: name.to_string(),
            area,
            torsional_constant,
            i22,
            i33,
            depth: None,
            flange_width: None,
            web_thickness: None,
            flange_thickness: None,
        }
    }

    /// AISC W14x22 rolled shape
    pub fn w14x22() -> Self {
        let mut s = Self::new("W14X22", 4.187e-3, 8.66e-8, 2.914e-6, 8.283e-5);
        s.depth = Some(0.349);
        s.flange_width = Some(0.127);
        s.web_thickness = Some(0.0058);
        s.flange_thickness = Some(0.0085);
        s
    }

    /// Rectangular section b x h (local 2 across width, 3 across depth)
    pub fn rectangular(name: &str, width: f64, depth: f64) -> Self {
        let area = width * depth;
        let i33 = width * depth.powi(3) / 12.0;
        let i22 = depth * width.powi(3) / 12.0;
        // Roark's approximation for a solid rectangle
        let (a, b) = if width >= depth {
            (width / 2.0, depth / 2.0)
        } else {
            (depth / 2.0, width / 2.0)
        };
        let j = a * b.powi(3) * (16.0 / 3.0 - 3.36 * (b / a) * (1.0 - b.powi(4) / (12.0 * a.powi(4))));
        let mut s = Self::new(name, area, j, i22, i33);
        s.depth = Some(depth);
        s
    }
}

/// Catalog pre-populated with the built-in materials
pub fn default_materials() -> MaterialMap {
    let mut map = MaterialMap::new();
    for material in [Material::steel_a36(), Material::concrete_30()] {
        map.insert(material.name.clone(), material);
    }
    map
}

/// Catalog pre-populated with the built-in sections
pub fn default_sections() -> SectionMap {
    let mut map = SectionMap::new();
    for section in [Section::w14x22(), Section::rectangular("B300X500", 0.3, 0.5)] {
        map.insert(section.name.clone(), section);
    }
    map
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn shear_modulus_from_elastic_constants() {
        let steel = Material::steel_a36();
        assert_relative_eq!(steel.shear_modulus(), 200.0e6 / 2.6, max_relative = 1e-12);
    }

    #[test]
    fn rectangular_section_properties() {
        let s = Section::rectangular("B300X500", 0.3, 0.5);
        assert_relative_eq!(s.area, 0.15);
        assert_relative_eq!(s.i33, 0.3 * 0.5f64.powi(3) / 12.0);
        assert_relative_eq!(s.i22, 0.5 * 0.3f64.powi(3) / 12.0);
        // J for a solid rectangle is below the polar moment I22 + I33
        assert!(s.torsional_constant > 0.0);
        assert!(s.torsional_constant < s.i22 + s.i33);
    }

    #[test]
    fn default_catalogs_resolve_by_name() {
        let materials = default_materials();
        let sections = default_sections();
        assert!(materials.contains_key("A36"));
        assert!(materials.contains_key("H30"));
        assert!(sections.contains_key("W14X22"));
        assert!(sections.contains_key("B300X500"));
    }
}
