//! Restraints (boundary conditions) at nodes

use serde::{Deserialize, Serialize};

/// Predefined restraint types for common support conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestraintType {
    Free,
    Fixed,
    Pinned,
    RollerX,
    RollerY,
    RollerZ,
    VerticalOnly,
    Custom,
}

/// Boundary conditions at a node.
///
/// Each boolean indicates whether that degree of freedom is restrained:
/// true = fixed, false = free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restraint {
    pub ux: bool,
    pub uy: bool,
    pub uz: bool,
    pub rx: bool,
    pub ry: bool,
    pub rz: bool,
}

impl Restraint {
    pub fn new(ux: bool, uy: bool, uz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        Self {
            ux,
            uy,
            uz,
            rx,
            ry,
            rz,
        }
    }

    pub fn free() -> Self {
        Self::default()
    }

    pub fn fixed() -> Self {
        Self::new(true, true, true, true, true, true)
    }

    /// Translations fixed, rotations free
    pub fn pinned() -> Self {
        Self::new(true, true, true, false, false, false)
    }

    pub fn roller_x() -> Self {
        Self::new(false, true, true, false, false, false)
    }

    pub fn roller_y() -> Self {
        Self::new(true, false, true, false, false, false)
    }

    pub fn roller_z() -> Self {
        Self::new(true, true, false, false, false, false)
    }

    /// Only the vertical translation (Uz) restrained
    pub fn vertical_only() -> Self {
        Self::new(false, false, true, false, false, false)
    }

    /// Check if all degrees of freedom are free
    pub fn is_free(&self) -> bool {
        !(self.ux || self.uy || self.uz || self.rx || self.ry || self.rz)
    }

    /// Check if all degrees of freedom are fixed
    pub fn is_fixed(&self) -> bool {
        self.ux && self.uy && self.uz && self.rx && self.ry && self.rz
    }

    /// Get DOF flags as [ux, uy, uz, rx, ry, rz]
    pub fn to_array(&self) -> [bool; 6] {
        [self.ux, self.uy, self.uz, self.rx, self.ry, self.rz]
    }

    /// Number of restrained degrees of freedom
    pub fn restrained_dof_count(&self) -> usize {
        self.to_array().iter().filter(|&&v| v).count()
    }

    /// Create a restraint from a predefined type.
    ///
    /// `Custom` starts out fully free; the caller sets DOFs individually.
    pub fn from_type(restraint_type: RestraintType) -> Self {
        match restraint_type {
            RestraintType::Free | RestraintType::Custom => Self::free(),
            RestraintType::Fixed => Self::fixed(),
            RestraintType::Pinned => Self::pinned(),
            RestraintType::RollerX => Self::roller_x(),
            RestraintType::RollerY => Self::roller_y(),
            RestraintType::RollerZ => Self::roller_z(),
            RestraintType::VerticalOnly => Self::vertical_only(),
        }
    }

    /// Classify the DOF pattern into a named type.
    ///
    /// Exact-pattern match; anything that is not a preset is `Custom`.
    pub fn restraint_type(&self) -> RestraintType {
        if *self == Self::free() {
            RestraintType::Free
        } else if *self == Self::fixed() {
            RestraintType::Fixed
        } else if *self == Self::pinned() {
            RestraintType::Pinned
        } else if *self == Self::roller_x() {
            RestraintType::RollerX
        } else if *self == Self::roller_y() {
            RestraintType::RollerY
        } else if *self == Self::roller_z() {
            RestraintType::RollerZ
        } else if *self == Self::vertical_only() {
            RestraintType::VerticalOnly
        } else {
            RestraintType::Custom
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: [RestraintType; 7] = [
        RestraintType::Free,
        RestraintType::Fixed,
        RestraintType::Pinned,
        RestraintType::RollerX,
        RestraintType::RollerY,
        RestraintType::RollerZ,
        RestraintType::VerticalOnly,
    ];

    #[test]
    fn preset_round_trip() {
        for preset in PRESETS {
            let restraint = Restraint::from_type(preset);
            assert_eq!(restraint.restraint_type(), preset);
            assert_eq!(Restraint::from_type(restraint.restraint_type()), restraint);
        }
    }

    #[test]
    fn custom_pattern_classifies_as_custom() {
        let restraint = Restraint::new(true, false, false, true, false, false);
        assert_eq!(restraint.restraint_type(), RestraintType::Custom);
    }

    #[test]
    fn dof_counts() {
        assert_eq!(Restraint::free().restrained_dof_count(), 0);
        assert_eq!(Restraint::fixed().restrained_dof_count(), 6);
        assert_eq!(Restraint::pinned().restrained_dof_count(), 3);
        assert_eq!(Restraint::vertical_only().restrained_dof_count(), 1);
    }

    #[test]
    fn fixed_and_free_flags() {
        assert!(Restraint::free().is_free());
        assert!(!Restraint::free().is_fixed());
        assert!(Restraint::fixed().is_fixed());
        assert!(!Restraint::pinned().is_fixed());
    }
}
