//! Frame elements - 1D members (beams, columns, braces) connecting two nodes

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::Node;

/// Minimum frame length in meters
pub const MIN_FRAME_LENGTH: f64 = 0.01;

/// End releases for a frame element.
///
/// Each boolean indicates whether the corresponding local DOF is released
/// (true) at that end. The default is fully fixed, no releases.
///
/// Local DOF order per end: P (axial), V2, V3 (shear), T (torsion),
/// M2, M3 (bending).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReleases {
    pub p_i: bool,
    pub v2_i: bool,
    pub v3_i: bool,
    pub t_i: bool,
    pub m2_i: bool,
    pub m3_i: bool,

    pub p_j: bool,
    pub v2_j: bool,
    pub v3_j: bool,
    pub t_j: bool,
    pub m2_j: bool,
    pub m3_j: bool,
}

impl FrameReleases {
    /// Fully fixed, no releases (the default)
    pub fn fixed_fixed() -> Self {
        Self::default()
    }

    /// Moment releases (M2, M3) at both ends
    pub fn pinned_pinned() -> Self {
        Self {
            m2_i: true,
            m3_i: true,
            m2_j: true,
            m3_j: true,
            ..Self::default()
        }
    }

    /// Moment release at end j only
    pub fn fixed_pinned() -> Self {
        Self {
            m2_j: true,
            m3_j: true,
            ..Self::default()
        }
    }

    /// Moment release at end i only
    pub fn pinned_fixed() -> Self {
        Self {
            m2_i: true,
            m3_i: true,
            ..Self::default()
        }
    }

    pub fn is_fully_fixed(&self) -> bool {
        *self == Self::default()
    }

    /// Released flags at end i, in local DOF order [P, V2, V3, T, M2, M3]
    pub fn end_i(&self) -> [bool; 6] {
        [self.p_i, self.v2_i, self.v3_i, self.t_i, self.m2_i, self.m3_i]
    }

    /// Released flags at end j, in local DOF order [P, V2, V3, T, M2, M3]
    pub fn end_j(&self) -> [bool; 6] {
        [self.p_j, self.v2_j, self.v3_j, self.t_j, self.m2_j, self.m3_j]
    }

    pub fn any_released_at_i(&self) -> bool {
        self.end_i().iter().any(|&r| r)
    }

    pub fn any_released_at_j(&self) -> bool {
        self.end_j().iter().any(|&r| r)
    }
}

/// A frame element connecting two nodes.
///
/// Material and section are string foreign keys into external catalogs,
/// resolved at analysis time. The frame holds only node ids; geometry
/// queries go through the owning [`StructuralModel`](crate::model::StructuralModel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub id: u32,
    pub node_i_id: u32,
    pub node_j_id: u32,
    pub material_name: String,
    pub section_name: String,
    /// Rotation about the local 1 axis, radians
    pub rotation: f64,
    pub releases: FrameReleases,
    pub label: String,
}

impl Frame {
    pub fn new(
        id: u32,
        node_i_id: u32,
        node_j_id: u32,
        material_name: &str,
        section_name: &str,
    ) -> Result<Self, ModelError> {
        if node_i_id == node_j_id {
            return Err(ModelError::SelfConnectingFrame(node_i_id));
        }

        Ok(Self {
            id,
            node_i_id,
            node_j_id,
            material_name: material_name.to_string(),
            section_name: section_name.to_string(),
            rotation: 0.0,
            releases: FrameReleases::default(),
            label: String::new(),
        })
    }

    pub fn connects(&self, node_id: u32) -> bool {
        self.node_i_id == node_id || self.node_j_id == node_id
    }
}

/// Validate that the distance between two nodes is a legal frame length
pub(crate) fn validate_frame_length(node_i: &Node, node_j: &Node) -> Result<f64, ModelError> {
    let length = node_i.distance_to(node_j);
    if length < MIN_FRAME_LENGTH {
        return Err(ModelError::FrameTooShort {
            length,
            min: MIN_FRAME_LENGTH,
        });
    }
    Ok(length)
}
