//! Test utilities and mock types for splitwave development.
//!
//! Provides mock [`Transport`]s for failure and traffic tests (failing at
//! issue time or inside the transfer), a
//! [`RecordingStencil`] that logs the lines a sweep visits, and in
//! [`fixtures`] a ready-made partition plus a plain-array reference
//! update to compare solver output against.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use splitwave_comm::{Tag, Transport};
use splitwave_core::{FieldVector, Rank, TransportError};
use splitwave_solver::SplitStencil;

pub use fixtures::{Partition, ReferenceGrid};

/// A transport whose every operation fails with the same error.
///
/// `probe` fails too, so the failure surfaces synchronously from the
/// first exchange that has a neighbour.
pub struct FailingTransport {
    rank: Rank,
    error: TransportError,
}

impl FailingTransport {
    pub fn new(rank: Rank, error: TransportError) -> Self {
        Self { rank, error }
    }

    /// Fails with [`TransportError::Disconnected`] naming `peer`.
    pub fn disconnected(rank: Rank, peer: Rank) -> Self {
        Self::new(rank, TransportError::Disconnected { peer })
    }
}

impl Transport for FailingTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn probe(&self, _peer: Rank) -> Result<(), TransportError> {
        Err(self.error.clone())
    }

    fn send(&self, _peer: Rank, _tag: Tag, _payload: Vec<FieldVector>) -> Result<(), TransportError> {
        Err(self.error.clone())
    }

    fn recv(&self, _peer: Rank, _tag: &Tag) -> Result<Vec<FieldVector>, TransportError> {
        Err(self.error.clone())
    }
}

/// A transport that accepts every probe and send but loses the payloads,
/// so each receive fails with the configured error.
///
/// Exchanges pass issue-time checks and fail later, inside the transfer
/// on the communication queue.
pub struct DroppingTransport {
    rank: Rank,
    error: TransportError,
}

impl DroppingTransport {
    pub fn new(rank: Rank, error: TransportError) -> Self {
        Self { rank, error }
    }

    /// Receives fail with [`TransportError::Disconnected`] naming `peer`.
    pub fn disconnected(rank: Rank, peer: Rank) -> Self {
        Self::new(rank, TransportError::Disconnected { peer })
    }
}

impl Transport for DroppingTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn probe(&self, _peer: Rank) -> Result<(), TransportError> {
        Ok(())
    }

    fn send(&self, _peer: Rank, _tag: Tag, _payload: Vec<FieldVector>) -> Result<(), TransportError> {
        Ok(())
    }

    fn recv(&self, _peer: Rank, _tag: &Tag) -> Result<Vec<FieldVector>, TransportError> {
        Err(self.error.clone())
    }
}

/// Wraps a transport and counts the calls made through it.
pub struct CountingTransport<T> {
    inner: T,
    probes: AtomicUsize,
    sends: AtomicUsize,
    recvs: AtomicUsize,
}

impl<T: Transport> CountingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            probes: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            recvs: AtomicUsize::new(0),
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn recvs(&self) -> usize {
        self.recvs.load(Ordering::SeqCst)
    }
}

impl<T: Transport> Transport for CountingTransport<T> {
    fn rank(&self) -> Rank {
        self.inner.rank()
    }

    fn probe(&self, peer: Rank) -> Result<(), TransportError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.inner.probe(peer)
    }

    fn send(&self, peer: Rank, tag: Tag, payload: Vec<FieldVector>) -> Result<(), TransportError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.inner.send(peer, tag, payload)
    }

    fn recv(&self, peer: Rank, tag: &Tag) -> Result<Vec<FieldVector>, TransportError> {
        self.recvs.fetch_add(1, Ordering::SeqCst);
        self.inner.recv(peer, tag)
    }
}

/// A stencil that leaves fields unchanged and records the length of
/// every line it is handed, in call order.
#[derive(Default)]
pub struct RecordingStencil {
    lines: Mutex<Vec<usize>>,
}

impl RecordingStencil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line lengths seen so far.
    pub fn lines(&self) -> Vec<usize> {
        self.lines.lock().clone()
    }

    /// Collapse the log into `(line length, count)` runs.
    pub fn runs(&self) -> Vec<(usize, usize)> {
        let mut runs: Vec<(usize, usize)> = Vec::new();
        for len in self.lines() {
            match runs.last_mut() {
                Some((l, n)) if *l == len => *n += 1,
                _ => runs.push((len, 1)),
            }
        }
        runs
    }
}

impl SplitStencil for RecordingStencil {
    fn name(&self) -> &str {
        "recording"
    }

    fn radius(&self) -> usize {
        1
    }

    fn update_line(
        &self,
        e: &[FieldVector],
        _b: &[FieldVector],
        e_out: &mut [FieldVector],
        _b_out: &mut [FieldVector],
    ) {
        assert_eq!(e.len(), e_out.len() + 2, "line handed without guard neighbourhood");
        self.lines.lock().push(e_out.len());
    }
}
