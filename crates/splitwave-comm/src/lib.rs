//! Partition topology and halo exchange for splitwave.
//!
//! A global grid is cut into a box of partitions ([`Decomposition`]).
//! Each partition owns a [`Field`] per physical quantity and keeps the
//! guard cells of that field up to date through a [`HaloExchange`],
//! which moves border slabs over a [`Transport`].
//!
//! [`LocalFabric`] is the in-process transport: one endpoint per rank,
//! connected by channels, so multi-partition runs can be driven from
//! threads of a single process.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod exchange;
pub mod field;
pub mod topology;
pub mod transport;

pub use exchange::HaloExchange;
pub use field::Field;
pub use topology::{Boundary, Decomposition, Topology};
pub use transport::{LocalEndpoint, LocalFabric, Tag, Transport};
