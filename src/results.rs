//! Typed analysis results.
//!
//! One [`AnalysisResults`] per load case: nodal displacements and reactions
//! in global coordinates, frame internal forces in local coordinates.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Displacements at a node, global coordinates. Translations in m,
/// rotations in rad.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NodalDisplacement {
    pub node_id: u32,
    pub ux: f64,
    pub uy: f64,
    pub uz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl NodalDisplacement {
    pub fn translation_magnitude(&self) -> f64 {
        (self.ux * self.ux + self.uy * self.uy + self.uz * self.uz).sqrt()
    }

    pub fn rotation_magnitude(&self) -> f64 {
        (self.rx * self.rx + self.ry * self.ry + self.rz * self.rz).sqrt()
    }
}

/// Reaction forces at a support node, global coordinates. Forces in kN,
/// moments in kN-m.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NodalReaction {
    pub node_id: u32,
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl NodalReaction {
    pub fn force_magnitude(&self) -> f64 {
        (self.fx * self.fx + self.fy * self.fy + self.fz * self.fz).sqrt()
    }

    pub fn moment_magnitude(&self) -> f64 {
        (self.mx * self.mx + self.my * self.my + self.mz * self.mz).sqrt()
    }
}

/// Internal forces at one station along a frame, local coordinates.
///
/// P is axial (tension positive), V2/V3 shears, T torsion, M2/M3 bending
/// moments about the local 2 and 3 axes. Forces in kN, moments in kN-m.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FrameForces {
    /// Station as a fraction of frame length, in [0, 1]
    pub location: f64,
    pub p: f64,
    pub v2: f64,
    pub v3: f64,
    pub t: f64,
    pub m2: f64,
    pub m3: f64,
}

/// All force stations along one frame element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameResult {
    pub frame_id: u32,
    pub forces: Vec<FrameForces>,
}

fn max_by_abs(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |best: f64, v| if v.abs() >= best.abs() { v } else { best })
}

impl FrameResult {
    pub fn new(frame_id: u32) -> Self {
        Self {
            frame_id,
            forces: Vec::new(),
        }
    }

    /// Maximum axial force (tension positive)
    pub fn p_max(&self) -> f64 {
        self.forces.iter().map(|f| f.p).fold(0.0, f64::max)
    }

    /// Minimum axial force (compression negative)
    pub fn p_min(&self) -> f64 {
        self.forces.iter().map(|f| f.p).fold(0.0, f64::min)
    }

    /// Signed extreme of V2, largest by absolute value
    pub fn v2_max(&self) -> f64 {
        max_by_abs(self.forces.iter().map(|f| f.v2))
    }

    pub fn v3_max(&self) -> f64 {
        max_by_abs(self.forces.iter().map(|f| f.v3))
    }

    pub fn t_max(&self) -> f64 {
        max_by_abs(self.forces.iter().map(|f| f.t))
    }

    pub fn m2_max(&self) -> f64 {
        max_by_abs(self.forces.iter().map(|f| f.m2))
    }

    pub fn m3_max(&self) -> f64 {
        max_by_abs(self.forces.iter().map(|f| f.m3))
    }

    /// Governing shear across both local directions, with sign
    pub fn v_max(&self) -> f64 {
        let v2 = self.v2_max();
        let v3 = self.v3_max();
        if v2.abs() >= v3.abs() {
            v2
        } else {
            v3
        }
    }

    /// Governing moment across both local axes, with sign
    pub fn m_max(&self) -> f64 {
        let m2 = self.m2_max();
        let m3 = self.m3_max();
        if m2.abs() >= m3.abs() {
            m2
        } else {
            m3
        }
    }

    pub fn force_at_start(&self) -> Option<&FrameForces> {
        self.forces
            .iter()
            .find(|f| f.location == 0.0)
            .or_else(|| self.forces.first())
    }

    pub fn force_at_end(&self) -> Option<&FrameForces> {
        self.forces
            .iter()
            .find(|f| f.location == 1.0)
            .or_else(|| self.forces.last())
    }
}

/// Complete results from a structural analysis of one load case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub id: Uuid,
    pub load_case_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub error_message: String,
    pub displacements: BTreeMap<u32, NodalDisplacement>,
    pub reactions: BTreeMap<u32, NodalReaction>,
    pub frame_results: BTreeMap<u32, FrameResult>,
    pub analysis_time_seconds: f64,
}

impl AnalysisResults {
    pub fn new(load_case_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            load_case_id,
            timestamp: Utc::now(),
            success: true,
            error_message: String::new(),
            displacements: BTreeMap::new(),
            reactions: BTreeMap::new(),
            frame_results: BTreeMap::new(),
            analysis_time_seconds: 0.0,
        }
    }

    /// A failed result carrying only the diagnostic message
    pub fn failed(load_case_id: Uuid, error: impl Into<String>) -> Self {
        let mut results = Self::new(load_case_id);
        results.success = false;
        results.error_message = error.into();
        results
    }

    pub fn get_displacement(&self, node_id: u32) -> Option<&NodalDisplacement> {
        self.displacements.get(&node_id)
    }

    pub fn get_reaction(&self, node_id: u32) -> Option<&NodalReaction> {
        self.reactions.get(&node_id)
    }

    pub fn get_frame_result(&self, frame_id: u32) -> Option<&FrameResult> {
        self.frame_results.get(&frame_id)
    }

    pub fn max_displacement(&self) -> f64 {
        self.displacements
            .values()
            .map(|d| d.translation_magnitude())
            .fold(0.0, f64::max)
    }

    pub fn max_rotation(&self) -> f64 {
        self.displacements
            .values()
            .map(|d| d.rotation_magnitude())
            .fold(0.0, f64::max)
    }
}
