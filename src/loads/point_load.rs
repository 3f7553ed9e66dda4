//! Concentrated loads at a point along a frame element

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Direction of a point load on a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointLoadDirection {
    /// Always global -Z
    #[default]
    Gravity,
    /// Axial, along the element
    LocalX,
    LocalY,
    LocalZ,
    GlobalX,
    GlobalY,
    GlobalZ,
}

/// A concentrated force, with optional moment, at a fractional location
/// along a frame element. Force in kN, moment in kN-m.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointLoadOnFrame {
    pub id: Uuid,
    pub frame_id: u32,
    pub load_case_id: Uuid,
    /// Position as a fraction of frame length, in [0, 1]
    pub location: f64,
    /// Force magnitude, kN
    pub p: f64,
    /// Moment magnitude about the axis perpendicular to the force, kN-m
    pub m: f64,
    pub direction: PointLoadDirection,
}

impl PointLoadOnFrame {
    pub fn new(
        frame_id: u32,
        load_case_id: Uuid,
        location: f64,
        p: f64,
        direction: PointLoadDirection,
    ) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&location) {
            return Err(ModelError::InvalidLoad(format!(
                "location must be between 0 and 1, got {location}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            frame_id,
            load_case_id,
            location,
            p,
            m: 0.0,
            direction,
        })
    }

    pub fn with_moment(mut self, m: f64) -> Self {
        self.m = m;
        self
    }

    /// Force at mid-span
    pub fn midpoint(
        frame_id: u32,
        load_case_id: Uuid,
        p: f64,
        direction: PointLoadDirection,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame_id,
            load_case_id,
            location: 0.5,
            p,
            m: 0.0,
            direction,
        }
    }

    pub fn is_at_start(&self) -> bool {
        self.location == 0.0
    }

    pub fn is_at_end(&self) -> bool {
        self.location == 1.0
    }
}
