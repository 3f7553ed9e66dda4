//! Domain model: nodes, frames, shells and the model container

mod frame;
mod local_axes;
mod node;
mod restraint;
mod shell;
mod structural_model;

pub use frame::{Frame, FrameReleases, MIN_FRAME_LENGTH};
pub use local_axes::{calculate_local_axes, LocalAxes};
pub use node::{Node, COORDINATE_PRECISION};
pub use restraint::{Restraint, RestraintType};
pub use shell::{Shell, ShellType};
pub use structural_model::{StructuralModel, NODE_DUPLICATE_TOLERANCE};
