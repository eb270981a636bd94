//! The explicit "current transaction" context.

use splitwave_core::TransportError;

use crate::event::{Event, EventStatus};

/// Holds the event every new submission must be ordered after.
///
/// Passed by `&mut` through the solver instead of living in a global.
/// Callers choose per call whether a new event is joined with the
/// current one ([`join`](Self::join)) or replaces it
/// ([`replace`](Self::replace)).
#[derive(Debug, Default)]
pub struct Transaction {
    current: Event,
}

impl Transaction {
    /// A transaction with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current event. Does not mutate the transaction.
    pub fn current(&self) -> Event {
        self.current.clone()
    }

    /// Make the current event `current ⊔ event`.
    pub fn join(&mut self, event: Event) {
        self.current = self.current.join(&event);
    }

    /// Make `event` the current event, dropping the previous one.
    pub fn replace(&mut self, event: Event) {
        self.current = event;
    }

    /// Fail fast if a failure has already landed. Never blocks.
    pub fn check(&self) -> Result<(), TransportError> {
        match self.current.status() {
            EventStatus::Failed(e) => Err(e),
            EventStatus::Pending | EventStatus::Complete => Ok(()),
        }
    }

    /// Block until everything in flight has settled.
    ///
    /// This is the embedding driver's synchronisation point; nothing in
    /// the solver calls it. On success the transaction is reset to a
    /// completed event; on failure it keeps the failed event.
    pub fn synchronize(&mut self) -> Result<(), TransportError> {
        self.current.wait()?;
        self.current = Event::completed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transaction_is_complete() {
        let tx = Transaction::new();
        assert!(tx.current().is_complete());
        assert!(tx.check().is_ok());
    }

    #[test]
    fn join_keeps_earlier_work() {
        let mut tx = Transaction::new();
        let (a, done_a) = Event::pending();
        let (b, done_b) = Event::pending();
        tx.join(a);
        tx.join(b);
        done_b.complete();
        assert!(!tx.current().is_complete());
        done_a.complete();
        assert!(tx.current().is_complete());
    }

    #[test]
    fn replace_forgets_earlier_work() {
        let mut tx = Transaction::new();
        let (a, _done_a) = Event::pending();
        tx.join(a);
        tx.replace(Event::completed());
        assert!(tx.current().is_complete());
    }

    #[test]
    fn check_surfaces_landed_failure() {
        let mut tx = Transaction::new();
        tx.join(Event::failed(TransportError::Abandoned));
        assert_eq!(tx.check(), Err(TransportError::Abandoned));
        assert_eq!(tx.synchronize(), Err(TransportError::Abandoned));
    }

    #[test]
    fn synchronize_resets_to_completed() {
        let mut tx = Transaction::new();
        let (a, done_a) = Event::pending();
        tx.join(a);
        done_a.complete();
        assert!(tx.synchronize().is_ok());
        assert_eq!(tx.current().width(), 0);
    }
}
