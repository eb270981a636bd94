//! Asynchronous completion tracking for splitwave.
//!
//! Every kernel launch and halo transfer is submitted without blocking
//! and returns an [`Event`]. Events compose by [`Event::join`]; a
//! [`Transaction`] threads the "current" event through a sequence of
//! submissions so that later work is ordered after earlier work.
//! A [`DeviceQueue`] is an in-order execution queue backed by a worker
//! thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod event;
pub mod queue;
pub mod transaction;

pub use event::{Completion, Event, EventStatus};
pub use queue::DeviceQueue;
pub use transaction::Transaction;
