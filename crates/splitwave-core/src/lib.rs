//! Core types and traits for the splitwave field solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the grid, event, communication and solver
//! crates: identifiers, axis and face types, extents, coordinate twists
//! and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dims;
pub mod error;
pub mod id;
pub mod twist;

pub use dims::{Axis, Face, Side, Size3};
pub use error::{ConfigError, RegionError, TransportError};
pub use id::{FieldName, Rank, FIELD_B, FIELD_E};
pub use twist::AxisTwist;

/// One grid cell of a vector field: the x, y and z components.
pub type FieldVector = [f32; 3];
