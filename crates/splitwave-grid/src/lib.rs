//! Device-resident grid buffers for splitwave.
//!
//! A [`GridBuffer`] owns one vector-valued grid split into an interior
//! (core + border) and a guard margin that mirrors neighbouring
//! partitions. Sub-views are non-copying strided windows into the
//! buffer's memory.
//!
//! # Layout
//!
//! ```text
//! GridBuffer
//! ├── GridLayout (interior extent + per-axis guard width)
//! └── Arc<DeviceMemory> (x-fastest Vec<FieldVector>, one lock)
//!
//! SubView<'a>  = &'a GridBuffer + ViewLayout
//! ViewLayout   = (origin, strides, extent, component twist)
//! ViewMut<'g>  = locked cells + ViewLayout, what kernels run against
//! ```
//!
//! Ownership of regions is by convention: kernels write only the
//! interior, the halo exchange writes only the guard.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod layout;
pub mod memory;
pub mod view;

pub use buffer::GridBuffer;
pub use layout::{GridLayout, Region};
pub use memory::DeviceMemory;
pub use splitwave_core::RegionError;
pub use view::{SubView, ViewLayout, ViewMut};
