//! Concentrated forces and moments at nodes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A concentrated load at a node.
///
/// Forces in kN and moments in kN-m, all in global coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodalLoad {
    pub id: Uuid,
    pub node_id: u32,
    pub load_case_id: Uuid,
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl NodalLoad {
    pub fn new(node_id: u32, load_case_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            node_id,
            load_case_id,
            fx: 0.0,
            fy: 0.0,
            fz: 0.0,
            mx: 0.0,
            my: 0.0,
            mz: 0.0,
        }
    }

    pub fn with_forces(mut self, fx: f64, fy: f64, fz: f64) -> Self {
        self.fx = fx;
        self.fy = fy;
        self.fz = fz;
        self
    }

    pub fn with_moments(mut self, mx: f64, my: f64, mz: f64) -> Self {
        self.mx = mx;
        self.my = my;
        self.mz = mz;
        self
    }

    pub fn force_vector(&self) -> [f64; 3] {
        [self.fx, self.fy, self.fz]
    }

    pub fn moment_vector(&self) -> [f64; 3] {
        [self.mx, self.my, self.mz]
    }

    pub fn is_zero(&self) -> bool {
        self.fx == 0.0
            && self.fy == 0.0
            && self.fz == 0.0
            && self.mx == 0.0
            && self.my == 0.0
            && self.mz == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_detection() {
        let case = Uuid::new_v4();
        assert!(NodalLoad::new(1, case).is_zero());
        assert!(!NodalLoad::new(1, case).with_forces(0.0, 0.0, -10.0).is_zero());
        assert!(!NodalLoad::new(1, case).with_moments(5.0, 0.0, 0.0).is_zero());
    }
}
