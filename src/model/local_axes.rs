//! Local coordinate systems for frame elements.
//!
//! Follows the SAP2000/ETABS convention:
//! - Axis 1: along the element, from node i to node j
//! - Axis 2: perpendicular to axis 1, horizontal for non-vertical elements
//! - Axis 3: perpendicular to 1 and 2 (right-hand rule)

use serde::{Deserialize, Serialize};

use crate::model::Node;

/// Local coordinate system of a frame element.
///
/// The three axes are unit vectors in global coordinates and form a
/// right-handed system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalAxes {
    pub axis1: [f64; 3],
    pub axis2: [f64; 3],
    pub axis3: [f64; 3],
    pub rotation: f64,
}

impl LocalAxes {
    /// Transform a vector from global to local coordinates
    pub fn global_to_local(&self, v: [f64; 3]) -> [f64; 3] {
        [dot(self.axis1, v), dot(self.axis2, v), dot(self.axis3, v)]
    }

    /// Transform a vector from local to global coordinates
    pub fn local_to_global(&self, v: [f64; 3]) -> [f64; 3] {
        [
            self.axis1[0] * v[0] + self.axis2[0] * v[1] + self.axis3[0] * v[2],
            self.axis1[1] * v[0] + self.axis2[1] * v[1] + self.axis3[1] * v[2],
            self.axis1[2] * v[0] + self.axis2[2] * v[1] + self.axis3[2] * v[2],
        ]
    }
}

/// Calculate local axes for a frame element.
///
/// For non-vertical elements axis 2 is horizontal (in the global XY plane);
/// for vertical elements global X is used as the reference. The rotation
/// angle spins axes 2 and 3 about axis 1.
pub fn calculate_local_axes(node_i: &Node, node_j: &Node, rotation: f64) -> LocalAxes {
    let dx = node_j.x - node_i.x;
    let dy = node_j.y - node_i.y;
    let dz = node_j.z - node_i.z;
    let length = (dx * dx + dy * dy + dz * dz).sqrt();

    // Coincident nodes have no direction; fall back to the global axes so
    // downstream geometry stays finite
    if length < 1e-9 {
        return LocalAxes {
            axis1: [1.0, 0.0, 0.0],
            axis2: [0.0, 1.0, 0.0],
            axis3: [0.0, 0.0, 1.0],
            rotation,
        };
    }

    let ax1 = [dx / length, dy / length, dz / length];

    let horizontal_length = (dx * dx + dy * dy).sqrt();
    let is_vertical = horizontal_length < 1e-9;

    let (ax2_init, ax3_init) = if is_vertical {
        // Vertical element: global X as reference for axis 2
        let ax3 = normalize(cross(ax1, [1.0, 0.0, 0.0]));
        let ax2 = normalize(cross(ax3, ax1));
        (ax2, ax3)
    } else {
        // Horizontal perpendicular to the XY projection of axis 1
        let ax2 = [-dy / horizontal_length, dx / horizontal_length, 0.0];
        let ax3 = normalize(cross(ax1, ax2));
        (ax2, ax3)
    };

    let (axis2, axis3) = if rotation.abs() > 1e-9 {
        (
            rotate_about_axis(ax2_init, ax1, rotation),
            rotate_about_axis(ax3_init, ax1, rotation),
        )
    } else {
        (ax2_init, ax3_init)
    };

    LocalAxes {
        axis1: ax1,
        axis2,
        axis3,
        rotation,
    }
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let length = dot(v, v).sqrt();
    if length < 1e-12 {
        return [0.0, 0.0, 0.0];
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Rodrigues' rotation of `v` about the unit `axis` by `angle` radians
fn rotate_about_axis(v: [f64; 3], axis: [f64; 3], angle: f64) -> [f64; 3] {
    let c = angle.cos();
    let s = angle.sin();
    let k = cross(axis, v);
    let d = dot(axis, v);

    [
        v[0] * c + k[0] * s + axis[0] * d * (1.0 - c),
        v[1] * c + k[1] * s + axis[1] * d * (1.0 - c),
        v[2] * c + k[2] * s + axis[2] * d * (1.0 - c),
    ]
}
