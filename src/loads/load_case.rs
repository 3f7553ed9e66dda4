//! Load cases group loads that act together (e.g. all dead loads)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Standard load case classifications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadCaseType {
    Dead,
    Live,
    RoofLive,
    Snow,
    Wind,
    Seismic,
    Temperature,
    #[default]
    Other,
}

/// A named load case.
///
/// `self_weight_multiplier` scales the automatic element self-weight applied
/// with this case; 0 disables self-weight entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCase {
    pub id: Uuid,
    pub name: String,
    pub case_type: LoadCaseType,
    pub description: String,
    pub self_weight_multiplier: f64,
}

impl LoadCase {
    pub fn new(name: &str, case_type: LoadCaseType) -> Result<Self, ModelError> {
        if name.is_empty() {
            return Err(ModelError::InvalidLoad(
                "load case name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            case_type,
            description: String::new(),
            self_weight_multiplier: 0.0,
        })
    }

    /// Dead-load case with self-weight enabled
    pub fn dead() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Dead".to_string(),
            case_type: LoadCaseType::Dead,
            description: String::new(),
            self_weight_multiplier: 1.0,
        }
    }

    pub fn live() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Live".to_string(),
            case_type: LoadCaseType::Live,
            description: String::new(),
            self_weight_multiplier: 0.0,
        }
    }

    pub fn with_self_weight(mut self, multiplier: f64) -> Self {
        self.self_weight_multiplier = multiplier;
        self
    }

    pub fn includes_self_weight(&self) -> bool {
        self.self_weight_multiplier != 0.0
    }
}
