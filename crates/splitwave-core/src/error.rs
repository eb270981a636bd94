//! Error types shared across the splitwave workspace.
//!
//! Organised by failure class: configuration (setup-time), region
//! (programming-level view defects) and transport (fatal communication
//! failures). None of them is retried internally; all surface to the
//! embedding driver.

use std::error::Error;
use std::fmt;

use crate::dims::{Axis, Size3};
use crate::id::{FieldName, Rank};

/// Setup-time configuration errors.
///
/// Detected by `validate()` calls at construction or on first use,
/// before any device work is issued.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `c * dt` does not equal the cell width, so the characteristic
    /// shift of one cell per step does not hold.
    UnstableSplitting {
        /// Distance light travels in one time step (`c * dt`).
        light_step: f64,
        /// Configured cell width.
        cell_width: f64,
    },
    /// Cells are not cubic (or square in 2-D).
    NonCubicCells {
        /// Axis whose spacing differs from the cell width.
        axis: Axis,
        /// Spacing along that axis.
        spacing: f64,
        /// Configured cell width.
        cell_width: f64,
    },
    /// A spacing, time step or physical constant is not finite and positive.
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// A guard margin is narrower than the stencil neighbourhood.
    GuardTooNarrow {
        /// Axis with the narrow guard.
        axis: Axis,
        /// Configured guard width.
        guard: usize,
        /// Neighbourhood radius required by the stencil.
        radius: usize,
    },
    /// A field's guard differs from the configured guard width.
    GuardMismatch {
        /// Axis where the widths differ.
        axis: Axis,
        /// Guard width in the solver configuration.
        configured: usize,
        /// Guard width of the registered field.
        field: usize,
    },
    /// A 2-D solver was handed a field with more than one cell along z.
    NonPlanarGrid {
        /// Interior extent of the field.
        extent: Size3,
    },
    /// E and B were handed to a sweep as views of the same buffer.
    SharedFieldBuffer,
    /// A kernel block size has a zero component.
    InvalidBlockSize {
        /// The configured block size.
        block: Size3,
    },
    /// Dimensionality other than 2 or 3.
    UnsupportedDimension {
        /// The requested dimensionality.
        dims: usize,
    },
    /// A required field name is not registered.
    UnknownField {
        /// The unresolved name.
        name: FieldName,
    },
    /// Two fields updated together have different core+border extents.
    FieldShapeMismatch {
        /// Core+border extent of the first field.
        first: Size3,
        /// Core+border extent of the second field.
        second: Size3,
    },
    /// The domain decomposition is unusable.
    InvalidDecomposition {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnstableSplitting {
                light_step,
                cell_width,
            } => write!(
                f,
                "directional splitting requires c*dt == cell width, got c*dt={light_step} and width={cell_width}"
            ),
            Self::NonCubicCells {
                axis,
                spacing,
                cell_width,
            } => write!(
                f,
                "directional splitting requires cubic cells: spacing along {axis} is {spacing}, width is {cell_width}"
            ),
            Self::InvalidParameter { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::GuardTooNarrow {
                axis,
                guard,
                radius,
            } => write!(
                f,
                "guard width {guard} along {axis} is narrower than stencil radius {radius}"
            ),
            Self::GuardMismatch {
                axis,
                configured,
                field,
            } => write!(
                f,
                "field guard width {field} along {axis} differs from configured width {configured}"
            ),
            Self::NonPlanarGrid { extent } => {
                write!(f, "2-D solver needs a single cell along z, field interior is {extent}")
            }
            Self::SharedFieldBuffer => write!(f, "E and B must live in different buffers"),
            Self::InvalidBlockSize { block } => {
                write!(f, "block size {block} has a zero component")
            }
            Self::UnsupportedDimension { dims } => {
                write!(f, "only 2-D and 3-D grids are supported, got {dims}-D")
            }
            Self::UnknownField { name } => write!(f, "field '{name}' is not registered"),
            Self::FieldShapeMismatch { first, second } => {
                write!(f, "field extents differ: {first} vs {second}")
            }
            Self::InvalidDecomposition { reason } => {
                write!(f, "invalid decomposition: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors constructing grid layouts or sub-views.
///
/// These indicate a misconfigured guard width or margin request and are
/// treated as programming-level defects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionError {
    /// The requested margins leave no cells on some axis.
    NonPositiveExtent {
        /// Axis with the empty extent.
        axis: Axis,
        /// Extent of the viewed region along that axis.
        extent: usize,
        /// Margin requested at the low end.
        margin_low: usize,
        /// Margin requested at the high end.
        margin_high: usize,
    },
    /// The interior is thinner than the guard that must be packed from it.
    InteriorSmallerThanGuard {
        /// Offending axis.
        axis: Axis,
        /// Interior extent along that axis.
        interior: usize,
        /// Guard width along that axis.
        guard: usize,
    },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveExtent {
                axis,
                extent,
                margin_low,
                margin_high,
            } => write!(
                f,
                "margins {margin_low}+{margin_high} leave no cells along {axis} (extent {extent})"
            ),
            Self::InteriorSmallerThanGuard {
                axis,
                interior,
                guard,
            } => write!(
                f,
                "interior extent {interior} along {axis} is smaller than guard width {guard}"
            ),
        }
    }
}

impl Error for RegionError {}

/// Failures of the communication fabric or of the workers driving it.
///
/// Always fatal to the simulation step: inconsistent halo data corrupts
/// the physics irrecoverably.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The peer's endpoint is gone.
    Disconnected {
        /// The unreachable peer.
        peer: Rank,
    },
    /// The peer rank does not exist in this fabric.
    UnknownPeer {
        /// The requested peer.
        peer: Rank,
    },
    /// A received halo slab has the wrong number of cells.
    PayloadMismatch {
        /// Cells expected by the receiving guard region.
        expected: usize,
        /// Cells actually received.
        received: usize,
    },
    /// A device or communication worker is not running.
    WorkerUnavailable {
        /// Description of the failure.
        reason: String,
    },
    /// An asynchronous operation was dropped without completing.
    Abandoned,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { peer } => write!(f, "peer {peer} disconnected"),
            Self::UnknownPeer { peer } => write!(f, "unknown peer {peer}"),
            Self::PayloadMismatch { expected, received } => write!(
                f,
                "halo payload has {received} cells, expected {expected}"
            ),
            Self::WorkerUnavailable { reason } => write!(f, "worker unavailable: {reason}"),
            Self::Abandoned => write!(f, "operation abandoned before completion"),
        }
    }
}

impl Error for TransportError {}
