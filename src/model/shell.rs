//! Shell elements - 2D area elements defined by 3 or 4 nodes

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Shell formulation type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellType {
    #[default]
    Shell,
    Membrane,
    Plate,
}

/// A shell element.
///
/// Like frames, shells hold node ids and a material name resolved through
/// the owning model and catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub id: u32,
    pub node_ids: Vec<u32>,
    pub material_name: String,
    /// Thickness in meters
    pub thickness: f64,
    pub shell_type: ShellType,
    pub label: String,
}

impl Shell {
    pub fn new(
        id: u32,
        node_ids: Vec<u32>,
        material_name: &str,
        thickness: f64,
    ) -> Result<Self, ModelError> {
        if node_ids.len() != 3 && node_ids.len() != 4 {
            return Err(ModelError::InvalidShellNodeCount(node_ids.len()));
        }

        Ok(Self {
            id,
            node_ids,
            material_name: material_name.to_string(),
            thickness,
            shell_type: ShellType::default(),
            label: String::new(),
        })
    }

    pub fn connects(&self, node_id: u32) -> bool {
        self.node_ids.contains(&node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_requires_3_or_4_nodes() {
        assert!(Shell::new(1, vec![1, 2, 3], "H30", 0.2).is_ok());
        assert!(Shell::new(1, vec![1, 2, 3, 4], "H30", 0.2).is_ok());
        assert!(matches!(
            Shell::new(1, vec![1, 2], "H30", 0.2),
            Err(ModelError::InvalidShellNodeCount(2))
        ));
    }
}
