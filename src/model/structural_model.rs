//! The structural model container.
//!
//! Owns all nodes, frames and shells in id-keyed ordered maps. Elements
//! reference nodes by id only; geometry queries resolve through the model,
//! so there is no cached-reference state to invalidate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::frame::validate_frame_length;
use crate::model::{
    calculate_local_axes, Frame, FrameReleases, LocalAxes, Node, Restraint, Shell,
    MIN_FRAME_LENGTH,
};

/// Distance below which two node positions are considered duplicates, meters
pub const NODE_DUPLICATE_TOLERANCE: f64 = 0.001;

/// Container for all structural model data.
///
/// Iteration order over nodes and frames is ascending by id, which keeps
/// downstream solver-input generation deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuralModel {
    nodes: BTreeMap<u32, Node>,
    next_node_id: u32,
    frames: BTreeMap<u32, Frame>,
    next_frame_id: u32,
    shells: BTreeMap<u32, Shell>,
    next_shell_id: u32,
}

impl StructuralModel {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_node_id: 1,
            frames: BTreeMap::new(),
            next_frame_id: 1,
            shells: BTreeMap::new(),
            next_shell_id: 1,
        }
    }

    // Node operations

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_node(&self, node_id: u32) -> Result<&Node, ModelError> {
        self.nodes.get(&node_id).ok_or(ModelError::NodeNotFound(node_id))
    }

    pub fn has_node(&self, node_id: u32) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Add a node, rejecting positions that duplicate an existing node
    /// within [`NODE_DUPLICATE_TOLERANCE`].
    pub fn add_node(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        restraint: Restraint,
    ) -> Result<&Node, ModelError> {
        self.add_node_with_tolerance(x, y, z, restraint, NODE_DUPLICATE_TOLERANCE)
    }

    /// Add a node with a caller-chosen duplicate-position tolerance
    pub fn add_node_with_tolerance(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        restraint: Restraint,
        tolerance: f64,
    ) -> Result<&Node, ModelError> {
        if let Some(existing) = self.find_node_at(x, y, z, tolerance) {
            return Err(ModelError::DuplicateNodePosition {
                x,
                y,
                z,
                existing_id: existing.id,
            });
        }

        let node_id = self.next_node_id;
        let node = Node::new(node_id, x, y, z, restraint)?;
        self.next_node_id += 1;
        self.nodes.insert(node_id, node);
        Ok(&self.nodes[&node_id])
    }

    /// Add a node with a caller-chosen id (used by deserialization and
    /// import paths). Bumps the allocator past the given id.
    pub fn add_node_with_id(
        &mut self,
        node_id: u32,
        x: f64,
        y: f64,
        z: f64,
        restraint: Restraint,
    ) -> Result<&Node, ModelError> {
        if self.nodes.contains_key(&node_id) {
            return Err(ModelError::DuplicateNodeId(node_id));
        }

        let node = Node::new(node_id, x, y, z, restraint)?;
        if node_id >= self.next_node_id {
            self.next_node_id = node_id + 1;
        }
        self.nodes.insert(node_id, node);
        Ok(&self.nodes[&node_id])
    }

    /// Remove a node. Fails while any frame or shell references it.
    pub fn remove_node(&mut self, node_id: u32) -> Result<Node, ModelError> {
        let frame_ids: Vec<u32> = self.frames_using_node(node_id).map(|f| f.id).collect();
        if !frame_ids.is_empty() {
            return Err(ModelError::NodeUsedByFrames { node_id, frame_ids });
        }

        let shell_ids: Vec<u32> = self
            .shells
            .values()
            .filter(|s| s.connects(node_id))
            .map(|s| s.id)
            .collect();
        if !shell_ids.is_empty() {
            return Err(ModelError::NodeUsedByShells { node_id, shell_ids });
        }

        self.nodes
            .remove(&node_id)
            .ok_or(ModelError::NodeNotFound(node_id))
    }

    /// Update node position and/or restraint.
    ///
    /// A new position is held to the same invariants as `add_node`: finite
    /// coordinates, no duplicate within [`NODE_DUPLICATE_TOLERANCE`], and no
    /// attached frame shortened below the minimum length.
    pub fn update_node(
        &mut self,
        node_id: u32,
        position: Option<(f64, f64, f64)>,
        restraint: Option<Restraint>,
    ) -> Result<&Node, ModelError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(ModelError::NodeNotFound(node_id));
        }

        if let Some((x, y, z)) = position {
            for (value, name) in [(x, "x"), (y, "y"), (z, "z")] {
                if !value.is_finite() {
                    return Err(ModelError::NonFiniteCoordinate { name, value });
                }
            }
            if let Some(existing) = self.find_node_at(x, y, z, NODE_DUPLICATE_TOLERANCE) {
                if existing.id != node_id {
                    return Err(ModelError::DuplicateNodePosition {
                        x,
                        y,
                        z,
                        existing_id: existing.id,
                    });
                }
            }
            for frame in self.frames_using_node(node_id) {
                let other_id = if frame.node_i_id == node_id {
                    frame.node_j_id
                } else {
                    frame.node_i_id
                };
                let length = self.get_node(other_id)?.distance_to_point(x, y, z);
                if length < MIN_FRAME_LENGTH {
                    return Err(ModelError::FrameTooShort {
                        length,
                        min: MIN_FRAME_LENGTH,
                    });
                }
            }
        }

        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(ModelError::NodeNotFound(node_id))?;
        if let Some((x, y, z)) = position {
            node.move_to(x, y, z);
        }
        if let Some(restraint) = restraint {
            node.restraint = restraint;
        }

        Ok(&self.nodes[&node_id])
    }

    pub fn find_node_at(&self, x: f64, y: f64, z: f64, tolerance: f64) -> Option<&Node> {
        self.nodes
            .values()
            .find(|n| n.distance_to_point(x, y, z) <= tolerance)
    }

    /// All nodes with at least one restrained DOF
    pub fn supported_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_supported())
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    // Frame operations

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn get_frame(&self, frame_id: u32) -> Result<&Frame, ModelError> {
        self.frames
            .get(&frame_id)
            .ok_or(ModelError::FrameNotFound(frame_id))
    }

    pub fn has_frame(&self, frame_id: u32) -> bool {
        self.frames.contains_key(&frame_id)
    }

    /// Add a frame between two existing nodes.
    ///
    /// The node pair must be unique (undirected) and at least
    /// [`MIN_FRAME_LENGTH`](crate::model::MIN_FRAME_LENGTH) apart.
    pub fn add_frame(
        &mut self,
        node_i_id: u32,
        node_j_id: u32,
        material_name: &str,
        section_name: &str,
    ) -> Result<&Frame, ModelError> {
        let node_i = self.get_node(node_i_id)?;
        let node_j = self.get_node(node_j_id)?;
        validate_frame_length(node_i, node_j)?;

        if let Some(existing) = self.find_frame_between(node_i_id, node_j_id) {
            return Err(ModelError::DuplicateFrame {
                node_i_id,
                node_j_id,
                existing_id: existing.id,
            });
        }

        let frame_id = self.next_frame_id;
        let frame = Frame::new(frame_id, node_i_id, node_j_id, material_name, section_name)?;
        self.next_frame_id += 1;
        self.frames.insert(frame_id, frame);
        Ok(&self.frames[&frame_id])
    }

    pub fn remove_frame(&mut self, frame_id: u32) -> Result<Frame, ModelError> {
        self.frames
            .remove(&frame_id)
            .ok_or(ModelError::FrameNotFound(frame_id))
    }

    /// Update frame properties. Node assignments cannot change; delete and
    /// recreate instead.
    pub fn update_frame(
        &mut self,
        frame_id: u32,
        material_name: Option<&str>,
        section_name: Option<&str>,
        rotation: Option<f64>,
        releases: Option<FrameReleases>,
        label: Option<&str>,
    ) -> Result<&Frame, ModelError> {
        let frame = self
            .frames
            .get_mut(&frame_id)
            .ok_or(ModelError::FrameNotFound(frame_id))?;

        if let Some(name) = material_name {
            frame.material_name = name.to_string();
        }
        if let Some(name) = section_name {
            frame.section_name = name.to_string();
        }
        if let Some(rotation) = rotation {
            frame.rotation = rotation;
        }
        if let Some(releases) = releases {
            frame.releases = releases;
        }
        if let Some(label) = label {
            frame.label = label.to_string();
        }

        Ok(&self.frames[&frame_id])
    }

    /// Find a frame connecting two nodes, in either direction
    pub fn find_frame_between(&self, node_i_id: u32, node_j_id: u32) -> Option<&Frame> {
        self.frames.values().find(|f| {
            (f.node_i_id == node_i_id && f.node_j_id == node_j_id)
                || (f.node_i_id == node_j_id && f.node_j_id == node_i_id)
        })
    }

    pub fn frames_using_node(&self, node_id: u32) -> impl Iterator<Item = &Frame> {
        self.frames.values().filter(move |f| f.connects(node_id))
    }

    pub fn iter_frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.values()
    }

    /// Length of a frame, resolved through the current node positions
    pub fn frame_length(&self, frame_id: u32) -> Result<f64, ModelError> {
        let frame = self.get_frame(frame_id)?;
        let node_i = self.get_node(frame.node_i_id)?;
        let node_j = self.get_node(frame.node_j_id)?;
        Ok(node_i.distance_to(node_j))
    }

    /// Local coordinate system of a frame
    pub fn frame_local_axes(&self, frame_id: u32) -> Result<LocalAxes, ModelError> {
        let frame = self.get_frame(frame_id)?;
        let node_i = self.get_node(frame.node_i_id)?;
        let node_j = self.get_node(frame.node_j_id)?;
        Ok(calculate_local_axes(node_i, node_j, frame.rotation))
    }

    // Shell operations

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    pub fn get_shell(&self, shell_id: u32) -> Result<&Shell, ModelError> {
        self.shells
            .get(&shell_id)
            .ok_or(ModelError::ShellNotFound(shell_id))
    }

    pub fn add_shell(
        &mut self,
        node_ids: Vec<u32>,
        material_name: &str,
        thickness: f64,
    ) -> Result<&Shell, ModelError> {
        for &node_id in &node_ids {
            self.get_node(node_id)?;
        }

        let shell_id = self.next_shell_id;
        let shell = Shell::new(shell_id, node_ids, material_name, thickness)?;
        self.next_shell_id += 1;
        self.shells.insert(shell_id, shell);
        Ok(&self.shells[&shell_id])
    }

    pub fn remove_shell(&mut self, shell_id: u32) -> Result<Shell, ModelError> {
        self.shells
            .remove(&shell_id)
            .ok_or(ModelError::ShellNotFound(shell_id))
    }

    pub fn iter_shells(&self) -> impl Iterator<Item = &Shell> {
        self.shells.values()
    }

    /// Remove everything and reset id allocators ("new project")
    pub fn clear(&mut self) {
        self.shells.clear();
        self.next_shell_id = 1;
        self.frames.clear();
        self.next_frame_id = 1;
        self.nodes.clear();
        self.next_node_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_model() -> StructuralModel {
        let mut model = StructuralModel::new();
        model.add_node(0.0, 0.0, 0.0, Restraint::fixed()).unwrap();
        model.add_node(5.0, 0.0, 0.0, Restraint::free()).unwrap();
        model
    }

    #[test]
    fn node_ids_increase_monotonically() {
        let mut model = StructuralModel::new();
        let a = model.add_node(0.0, 0.0, 0.0, Restraint::free()).unwrap().id;
        let b = model.add_node(1.0, 0.0, 0.0, Restraint::free()).unwrap().id;
        assert_eq!((a, b), (1, 2));

        // Ids are never reused after removal
        model.remove_node(2).unwrap();
        let c = model.add_node(2.0, 0.0, 0.0, Restraint::free()).unwrap().id;
        assert_eq!(c, 3);
    }

    #[test]
    fn duplicate_position_rejected() {
        let mut model = two_node_model();
        let err = model.add_node(0.0005, 0.0, 0.0, Restraint::free());
        assert!(matches!(
            err,
            Err(ModelError::DuplicateNodePosition { existing_id: 1, .. })
        ));
    }

    #[test]
    fn duplicate_frame_pair_rejected_both_directions() {
        let mut model = two_node_model();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        assert!(matches!(
            model.add_frame(2, 1, "A36", "W14X22"),
            Err(ModelError::DuplicateFrame { existing_id: 1, .. })
        ));
    }

    #[test]
    fn frame_requires_existing_nodes() {
        let mut model = two_node_model();
        assert!(matches!(
            model.add_frame(1, 99, "A36", "W14X22"),
            Err(ModelError::NodeNotFound(99))
        ));
    }

    #[test]
    fn remove_node_blocked_while_referenced() {
        let mut model = two_node_model();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();

        let err = model.remove_node(2);
        assert!(matches!(
            err,
            Err(ModelError::NodeUsedByFrames { node_id: 2, .. })
        ));

        model.remove_frame(1).unwrap();
        assert!(model.remove_node(2).is_ok());
    }

    #[test]
    fn frame_length_resolves_current_positions() {
        let mut model = two_node_model();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        assert!((model.frame_length(1).unwrap() - 5.0).abs() < 1e-12);

        model.update_node(2, Some((3.0, 4.0, 0.0)), None).unwrap();
        assert!((model.frame_length(1).unwrap() - 5.0).abs() < 1e-12);
        model.update_node(2, Some((10.0, 0.0, 0.0)), None).unwrap();
        assert!((model.frame_length(1).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn update_node_rejects_non_finite_coordinates() {
        let mut model = two_node_model();
        assert!(matches!(
            model.update_node(2, Some((f64::NAN, 0.0, 0.0)), None),
            Err(ModelError::NonFiniteCoordinate { name: "x", .. })
        ));
        assert!(matches!(
            model.update_node(2, Some((0.0, f64::INFINITY, 0.0)), None),
            Err(ModelError::NonFiniteCoordinate { name: "y", .. })
        ));
        // Failed updates leave the node untouched
        assert_eq!(model.get_node(2).unwrap().position(), (5.0, 0.0, 0.0));
    }

    #[test]
    fn update_node_rejects_move_onto_existing_node() {
        let mut model = two_node_model();
        assert!(matches!(
            model.update_node(2, Some((0.0005, 0.0, 0.0)), None),
            Err(ModelError::DuplicateNodePosition { existing_id: 1, .. })
        ));
        // Moving within tolerance of its own position is not a duplicate
        assert!(model.update_node(2, Some((5.0001, 0.0, 0.0)), None).is_ok());
    }

    #[test]
    fn update_node_rejects_collapsing_attached_frame() {
        let mut model = two_node_model();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        assert!(matches!(
            model.update_node(2, Some((0.005, 0.0, 0.0)), None),
            Err(ModelError::FrameTooShort { .. })
        ));
        assert!((model.frame_length(1).unwrap() - 5.0).abs() < 1e-12);

        // Without the frame the same move is fine
        model.remove_frame(1).unwrap();
        assert!(model.update_node(2, Some((0.005, 0.0, 0.0)), None).is_ok());
    }

    #[test]
    fn add_node_tolerance_is_per_call() {
        let mut model = two_node_model();
        assert!(matches!(
            model.add_node_with_tolerance(5.05, 0.0, 0.0, Restraint::free(), 0.1),
            Err(ModelError::DuplicateNodePosition { existing_id: 2, .. })
        ));
        assert!(model
            .add_node_with_tolerance(5.05, 0.0, 0.0, Restraint::free(), 0.01)
            .is_ok());
    }

    #[test]
    fn clear_resets_allocators() {
        let mut model = two_node_model();
        model.add_frame(1, 2, "A36", "W14X22").unwrap();
        model.clear();
        assert_eq!(model.node_count(), 0);
        assert_eq!(model.frame_count(), 0);
        let id = model.add_node(0.0, 0.0, 0.0, Restraint::free()).unwrap().id;
        assert_eq!(id, 1);
    }

    #[test]
    fn supported_nodes_filter() {
        let model = two_node_model();
        let supported: Vec<u32> = model.supported_nodes().map(|n| n.id).collect();
        assert_eq!(supported, vec![1]);
    }
}
