//! Directional-splitting Maxwell solver for splitwave.
//!
//! Each time step advances E and B by three one-dimensional sweeps, one
//! per axis, each followed by a halo exchange of both fields. All work is
//! submitted to device queues and ordered through a [`Transaction`]
//! passed in by the caller; the solver itself never blocks on device
//! work.
//!
//! # Pieces
//!
//! - [`SolverConfig`]: grid spacing, time step and launch geometry,
//!   checked once by [`SolverConfig::validate`].
//! - [`DataConnector`]: the registry handing out [`FieldLease`]s.
//! - [`SplitStencil`]: the per-line numerical update; the default is
//!   [`CharacteristicStencil`].
//! - [`AxisSweep`]: runs a stencil over every line of a twisted view.
//! - [`SourceInjector`]: optional field source applied after the last
//!   sweep of a step.
//! - [`DirSplitting`]: the per-step state machine.
//!
//! [`Transaction`]: splitwave_event::Transaction

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod solver;
pub mod source;
pub mod stencil;

pub use config::{InjectionWindow, SolverConfig, SplittingPattern, SPEED_OF_LIGHT};
pub use dispatch::AxisSweep;
pub use error::{RegistryError, SolverError};
pub use registry::{AccessMode, DataConnector, FieldLease};
pub use solver::{DirSplitting, SolverContext, SolverState, StepReport, SOLVER_FIELDS};
pub use source::{PlaneSource, SourceInjector};
pub use stencil::{CharacteristicStencil, SplitStencil};
