//! Nodes - points in 3D space where structural elements connect

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::Restraint;

/// Decimal places kept on node coordinates
pub const COORDINATE_PRECISION: i32 = 6;

/// A structural node (joint) in 3D space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub restraint: Restraint,
}

fn round_coord(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION);
    (value * scale).round() / scale
}

impl Node {
    /// Create a node, validating that coordinates are finite and rounding
    /// them to the model precision.
    pub fn new(id: u32, x: f64, y: f64, z: f64, restraint: Restraint) -> Result<Self, ModelError> {
        for (value, name) in [(x, "x"), (y, "y"), (z, "z")] {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteCoordinate { name, value });
            }
        }

        Ok(Self {
            id,
            x: round_coord(x),
            y: round_coord(y),
            z: round_coord(z),
            restraint,
        })
    }

    pub fn position(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Check if the node has any restrained DOF
    pub fn is_supported(&self) -> bool {
        !self.restraint.is_free()
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        self.distance_to_point(other.x, other.y, other.z)
    }

    pub fn distance_to_point(&self, x: f64, y: f64, z: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        let dz = self.z - z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Move the node to a new position
    pub fn move_to(&mut self, x: f64, y: f64, z: f64) {
        self.x = round_coord(x);
        self.y = round_coord(y);
        self.z = round_coord(z);
    }
}
