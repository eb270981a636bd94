//! Completion events.
//!
//! An [`Event`] is a set of leaf signals; it is complete when every leaf
//! is. A leaf moves from pending to complete or failed exactly once and
//! never back. Joining two events unions their leaves and drops the ones
//! already complete, so long join chains stay flat.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;
use splitwave_core::TransportError;

/// Observable state of an [`Event`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventStatus {
    /// At least one underlying operation is still in flight.
    Pending,
    /// Every underlying operation finished successfully.
    Complete,
    /// An underlying operation failed. Terminal.
    Failed(TransportError),
}

enum SignalState {
    Pending,
    Complete,
    Failed(TransportError),
}

struct Signal {
    state: Mutex<SignalState>,
    ready: Condvar,
}

impl Signal {
    fn new(state: SignalState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            ready: Condvar::new(),
        })
    }

    fn status(&self) -> EventStatus {
        match &*self.state.lock() {
            SignalState::Pending => EventStatus::Pending,
            SignalState::Complete => EventStatus::Complete,
            SignalState::Failed(e) => EventStatus::Failed(e.clone()),
        }
    }

    /// First settle wins; later calls are ignored.
    fn settle(&self, outcome: Result<(), TransportError>) {
        let mut state = self.state.lock();
        if !matches!(*state, SignalState::Pending) {
            return;
        }
        *state = match outcome {
            Ok(()) => SignalState::Complete,
            Err(e) => SignalState::Failed(e),
        };
        self.ready.notify_all();
    }

    fn wait(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        while matches!(*state, SignalState::Pending) {
            self.ready.wait(&mut state);
        }
        match &*state {
            SignalState::Failed(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

/// Completion token for one asynchronous operation or a join of several.
#[derive(Clone, Default)]
pub struct Event {
    signals: SmallVec<[Arc<Signal>; 4]>,
}

impl Event {
    /// An event that is already complete.
    pub fn completed() -> Self {
        Self::default()
    }

    /// An event that has already failed with `error`.
    pub fn failed(error: TransportError) -> Self {
        let mut signals = SmallVec::new();
        signals.push(Signal::new(SignalState::Failed(error)));
        Self { signals }
    }

    /// A pending event and the producer half that settles it.
    pub fn pending() -> (Self, Completion) {
        let signal = Signal::new(SignalState::Pending);
        let mut signals = SmallVec::new();
        signals.push(Arc::clone(&signal));
        (
            Self { signals },
            Completion {
                signal: Some(signal),
            },
        )
    }

    /// An event complete only when both `self` and `other` are.
    pub fn join(&self, other: &Event) -> Event {
        let mut signals: SmallVec<[Arc<Signal>; 4]> = SmallVec::new();
        for s in self.signals.iter().chain(other.signals.iter()) {
            if s.status() == EventStatus::Complete {
                continue;
            }
            if signals.iter().any(|kept| Arc::ptr_eq(kept, s)) {
                continue;
            }
            signals.push(Arc::clone(s));
        }
        Event { signals }
    }

    /// Current state without blocking.
    ///
    /// A failure of any part is reported even while other parts are
    /// still pending.
    pub fn status(&self) -> EventStatus {
        let mut pending = false;
        for s in &self.signals {
            match s.status() {
                EventStatus::Failed(e) => return EventStatus::Failed(e),
                EventStatus::Pending => pending = true,
                EventStatus::Complete => {}
            }
        }
        if pending {
            EventStatus::Pending
        } else {
            EventStatus::Complete
        }
    }

    /// Whether every part has completed successfully.
    pub fn is_complete(&self) -> bool {
        self.status() == EventStatus::Complete
    }

    /// Block until every part has settled.
    ///
    /// Returns the first failure found. Only device workers and the
    /// driver's final synchronisation call this; the solver never does.
    pub fn wait(&self) -> Result<(), TransportError> {
        for s in &self.signals {
            s.wait()?;
        }
        Ok(())
    }

    /// Number of leaf operations this event still tracks.
    pub fn width(&self) -> usize {
        self.signals.len()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("width", &self.signals.len())
            .field("status", &self.status())
            .finish()
    }
}

/// Producer half of a pending [`Event`].
///
/// Dropping it without settling fails the event with
/// [`TransportError::Abandoned`], so a panicking worker can never leave
/// waiters hanging.
#[must_use = "dropping a Completion fails its event"]
pub struct Completion {
    signal: Option<Arc<Signal>>,
}

impl Completion {
    /// Mark the operation successful.
    pub fn complete(self) {
        self.settle(Ok(()));
    }

    /// Mark the operation failed.
    pub fn fail(self, error: TransportError) {
        self.settle(Err(error));
    }

    /// Settle with an operation's result.
    pub fn settle(mut self, outcome: Result<(), TransportError>) {
        if let Some(signal) = self.signal.take() {
            signal.settle(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.settle(Err(TransportError::Abandoned));
        }
    }
}
