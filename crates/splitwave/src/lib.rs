//! splitwave: a distributed directional-splitting Maxwell solver.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all splitwave sub-crates. For most users, adding `splitwave` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use splitwave::prelude::*;
//!
//! // One periodic partition of 8×8×8 cells with a one-cell guard.
//! let layout = GridLayout::new(Size3::splat(8), Size3::splat(1)).unwrap();
//! let registry = DataConnector::new();
//! let e = registry.register(Field::new(FIELD_E, layout)).unwrap();
//! registry.register(Field::new(FIELD_B, layout)).unwrap();
//! e.buffer().fill_interior_with(|[x, _, _]| [0.0, x as f32, 0.0]);
//!
//! let decomposition = Decomposition::new(Size3::splat(1), [Boundary::Periodic; 3]).unwrap();
//! let endpoint = LocalFabric::new(1).into_endpoints().remove(0);
//! let halo = HaloExchange::new(
//!     Topology::new(Rank(0), decomposition).unwrap(),
//!     Arc::new(endpoint),
//!     DeviceQueue::spawn("comm").unwrap(),
//! )
//! .unwrap();
//! let queue = DeviceQueue::spawn("compute").unwrap();
//! let mut transaction = Transaction::new();
//!
//! let solver = DirSplitting::new(
//!     SolverConfig::for_cell_width(1.0e-6, 3),
//!     Arc::new(CharacteristicStencil),
//! )
//! .unwrap();
//! let mut ctx = SolverContext {
//!     registry: &registry,
//!     transaction: &mut transaction,
//!     queue: &queue,
//!     halo: &halo,
//! };
//! solver.update_after_current(&mut ctx, 0).unwrap();
//! let report = solver.update_before_current(&mut ctx, 0).unwrap();
//! assert_eq!(report.sweep_axes().as_slice(), &Axis::ALL);
//! transaction.synchronize().unwrap();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `splitwave-core` | Axes, extents, twists, names, ranks, error types |
//! | [`grid`] | `splitwave-grid` | Guarded grid buffers, strided views, halo regions |
//! | [`event`] | `splitwave-event` | Completion events, device queues, transactions |
//! | [`comm`] | `splitwave-comm` | Decomposition, transports, distributed fields, halo exchange |
//! | [`solver`] | `splitwave-solver` | Configuration, field registry, axis sweeps, the solver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and errors (`splitwave-core`).
///
/// Contains [`types::Axis`], [`types::Size3`], the [`types::AxisTwist`]
/// component permutation and the shared error enums.
pub use splitwave_core as types;

/// Guarded grid storage (`splitwave-grid`).
///
/// [`grid::GridBuffer`] owns one partition's cells; [`grid::SubView`] and
/// [`grid::ViewMut`] address them through a possibly twisted frame.
pub use splitwave_grid as grid;

/// Asynchronous ordering primitives (`splitwave-event`).
///
/// Work is submitted to a [`event::DeviceQueue`] after an
/// [`event::Event`]; a [`event::Transaction`] accumulates the events of
/// one step.
pub use splitwave_event as event;

/// Domain decomposition and guard exchange (`splitwave-comm`).
///
/// Provides the [`comm::Transport`] trait, the in-process
/// [`comm::LocalFabric`] and [`comm::HaloExchange`].
pub use splitwave_comm as comm;

/// The directional-splitting solver (`splitwave-solver`).
///
/// [`solver::DirSplitting`] advances E and B leased from a
/// [`solver::DataConnector`].
pub use splitwave_solver as solver;

/// Common imports for typical splitwave usage.
///
/// ```rust
/// use splitwave::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use splitwave_core::{
        Axis, AxisTwist, Face, FieldName, FieldVector, Rank, Side, Size3, FIELD_B, FIELD_E,
    };

    // Errors
    pub use splitwave_core::{ConfigError, RegionError, TransportError};
    pub use splitwave_solver::{RegistryError, SolverError};

    // Grid
    pub use splitwave_grid::{GridBuffer, GridLayout};

    // Events
    pub use splitwave_event::{DeviceQueue, Event, Transaction};

    // Communication
    pub use splitwave_comm::{
        Boundary, Decomposition, Field, HaloExchange, LocalFabric, Topology, Transport,
    };

    // Solver
    pub use splitwave_solver::{
        AccessMode, CharacteristicStencil, DataConnector, DirSplitting, InjectionWindow,
        PlaneSource, SolverConfig, SolverContext, SourceInjector, SplitStencil,
        SplittingPattern, StepReport,
    };
}
