//! Error types for model operations and the solver boundary

use thiserror::Error;

/// Errors from structural model mutations and queries
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Node {0} not found in model")]
    NodeNotFound(u32),

    #[error("Frame {0} not found in model")]
    FrameNotFound(u32),

    #[error("Shell {0} not found in model")]
    ShellNotFound(u32),

    #[error("Node ID {0} already exists")]
    DuplicateNodeId(u32),

    #[error("A node already exists at ({x:.4}, {y:.4}, {z:.4}): node {existing_id}")]
    DuplicateNodePosition {
        x: f64,
        y: f64,
        z: f64,
        existing_id: u32,
    },

    #[error("Frame ID {0} already exists")]
    DuplicateFrameId(u32),

    #[error("A frame already exists between nodes {node_i_id} and {node_j_id}: frame {existing_id}")]
    DuplicateFrame {
        node_i_id: u32,
        node_j_id: u32,
        existing_id: u32,
    },

    #[error("Shell ID {0} already exists")]
    DuplicateShellId(u32),

    #[error("Frame cannot connect node {0} to itself")]
    SelfConnectingFrame(u32),

    #[error("Frame length ({length:.6} m) is below minimum ({min:.2} m)")]
    FrameTooShort { length: f64, min: f64 },

    #[error("Cannot remove node {node_id}: referenced by frames {frame_ids:?}")]
    NodeUsedByFrames { node_id: u32, frame_ids: Vec<u32> },

    #[error("Cannot remove node {node_id}: referenced by shells {shell_ids:?}")]
    NodeUsedByShells { node_id: u32, shell_ids: Vec<u32> },

    #[error("Coordinate {name} must be finite, got {value}")]
    NonFiniteCoordinate { name: &'static str, value: f64 },

    #[error("Invalid load: {0}")]
    InvalidLoad(String),

    #[error("Shell must have 3 or 4 nodes, got {0}")]
    InvalidShellNodeCount(usize),
}

/// Errors from the solver boundary: translation, subprocess and parsing
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Script generation failed: {0}")]
    Script(String),

    #[error("Frame {frame_id} references unknown material '{name}'")]
    UnknownMaterial { frame_id: u32, name: String },

    #[error("Frame {frame_id} references unknown section '{name}'")]
    UnknownSection { frame_id: u32, name: String },

    #[error(
        "OpenSees executable not found. \
         Set OPENSEES_EXE environment variable or add OpenSees to PATH."
    )]
    ExecutableNotFound,

    #[error("Analysis timed out after {0} seconds")]
    Timeout(u64),

    #[error("Engine not ready: {0}")]
    NotReady(&'static str),

    #[error("Failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EngineError {
    pub(crate) fn parse(file: &str, reason: impl Into<String>) -> Self {
        EngineError::Parse {
            file: file.to_string(),
            reason: reason.into(),
        }
    }
}
