//! Load definitions: load cases, nodal loads and member loads

mod distributed;
mod load_case;
mod nodal_load;
mod point_load;

pub use distributed::{DistributedLoad, LoadDirection};
pub use load_case::{LoadCase, LoadCaseType};
pub use nodal_load::NodalLoad;
pub use point_load::{PointLoadDirection, PointLoadOnFrame};
