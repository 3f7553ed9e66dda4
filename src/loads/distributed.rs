//! Distributed loads along frame elements

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Direction of a distributed load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadDirection {
    /// Always global -Z
    #[default]
    Gravity,
    /// Along the element axis
    LocalX,
    LocalY,
    LocalZ,
    GlobalX,
    GlobalY,
    GlobalZ,
}

/// A distributed load along a frame element.
///
/// Uniform or trapezoidal, over the full length or a partial range given as
/// fractions of the frame length. Intensities are kN/m.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributedLoad {
    pub id: Uuid,
    pub frame_id: u32,
    pub load_case_id: Uuid,
    pub direction: LoadDirection,
    /// Intensity at `start_loc`, kN/m
    pub w_start: f64,
    /// Intensity at `end_loc`, kN/m
    pub w_end: f64,
    /// Start of loaded range as a fraction of length, in [0, 1]
    pub start_loc: f64,
    /// End of loaded range as a fraction of length, in [0, 1]
    pub end_loc: f64,
}

impl DistributedLoad {
    /// Create a trapezoidal load over `[start_loc, end_loc]`.
    pub fn new(
        frame_id: u32,
        load_case_id: Uuid,
        direction: LoadDirection,
        w_start: f64,
        w_end: Option<f64>,
        start_loc: f64,
        end_loc: f64,
    ) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&start_loc) {
            return Err(ModelError::InvalidLoad(format!(
                "start_loc must be between 0 and 1, got {start_loc}"
            )));
        }
        if !(0.0..=1.0).contains(&end_loc) {
            return Err(ModelError::InvalidLoad(format!(
                "end_loc must be between 0 and 1, got {end_loc}"
            )));
        }
        if start_loc >= end_loc {
            return Err(ModelError::InvalidLoad(format!(
                "start_loc ({start_loc}) must be less than end_loc ({end_loc})"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            frame_id,
            load_case_id,
            direction,
            w_start,
            w_end: w_end.unwrap_or(w_start),
            start_loc,
            end_loc,
        })
    }

    /// Uniform load over the full element length
    pub fn uniform(
        frame_id: u32,
        load_case_id: Uuid,
        w: f64,
        direction: LoadDirection,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame_id,
            load_case_id,
            direction,
            w_start: w,
            w_end: w,
            start_loc: 0.0,
            end_loc: 1.0,
        }
    }

    /// Triangular load over the full length, zero at one end
    pub fn triangular(
        frame_id: u32,
        load_case_id: Uuid,
        w_max: f64,
        ascending: bool,
        direction: LoadDirection,
    ) -> Self {
        let (w_start, w_end) = if ascending { (0.0, w_max) } else { (w_max, 0.0) };
        Self {
            id: Uuid::new_v4(),
            frame_id,
            load_case_id,
            direction,
            w_start,
            w_end,
            start_loc: 0.0,
            end_loc: 1.0,
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.w_start == self.w_end
    }

    pub fn is_full_length(&self) -> bool {
        self.start_loc == 0.0 && self.end_loc == 1.0
    }

    pub fn average_intensity(&self) -> f64 {
        (self.w_start + self.w_end) / 2.0
    }

    /// Intensity at a fractional location, zero outside the loaded range
    pub fn intensity_at(&self, location: f64) -> f64 {
        if location < self.start_loc || location > self.end_loc {
            return 0.0;
        }
        if self.is_uniform() {
            return self.w_start;
        }
        let t = (location - self.start_loc) / (self.end_loc - self.start_loc);
        self.w_start + t * (self.w_end - self.w_start)
    }
}
