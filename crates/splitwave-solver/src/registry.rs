//! The field registry and its leases.
//!
//! A [`DataConnector`] maps field names to distributed fields. Solvers
//! take a [`FieldLease`] for each field they touch: any number of
//! [`AccessMode::Read`] leases may coexist, a [`AccessMode::ReadWrite`]
//! lease is exclusive. A lease is returned when dropped, so every exit
//! path of a solver invocation releases what it took.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use smallvec::SmallVec;
use splitwave_comm::Field;
use splitwave_core::FieldName;
use splitwave_grid::GridLayout;

use crate::error::RegistryError;

/// How a lease may use its field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Shared, read-only access.
    Read,
    /// Exclusive access.
    ReadWrite,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

enum LeaseState {
    Free,
    Shared(SmallVec<[u64; 2]>),
    Exclusive(u64),
}

struct Entry {
    field: Arc<Field>,
    state: LeaseState,
}

#[derive(Default)]
struct Inner {
    entries: IndexMap<FieldName, Entry>,
    next_ticket: u64,
}

/// Registry of the distributed fields of one partition.
#[derive(Default)]
pub struct DataConnector {
    inner: Mutex<Inner>,
}

impl DataConnector {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `field` under its own name.
    pub fn register(&self, field: Field) -> Result<Arc<Field>, RegistryError> {
        let mut inner = self.inner.lock();
        let name = field.name().clone();
        if inner.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateField { name });
        }
        let field = Arc::new(field);
        inner.entries.insert(
            name,
            Entry {
                field: Arc::clone(&field),
                state: LeaseState::Free,
            },
        );
        Ok(field)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &FieldName) -> bool {
        self.inner.lock().entries.contains_key(name)
    }

    /// Layout of the field registered under `name`, without leasing it.
    pub fn layout(&self, name: &FieldName) -> Option<GridLayout> {
        self.inner
            .lock()
            .entries
            .get(name)
            .map(|e| *e.field.buffer().layout())
    }

    /// Registered names in registration order.
    pub fn field_names(&self) -> Vec<FieldName> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Lease `name` for `mode` access.
    pub fn get(&self, name: &FieldName, mode: AccessMode) -> Result<FieldLease<'_>, RegistryError> {
        let mut inner = self.inner.lock();
        let ticket = inner.next_ticket;
        let entry = inner
            .entries
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownField { name: name.clone() })?;
        let conflict = |held| RegistryError::AlreadyLeased {
            name: name.clone(),
            held,
        };
        match &mut entry.state {
            LeaseState::Exclusive(_) => return Err(conflict(AccessMode::ReadWrite)),
            LeaseState::Shared(_) if mode == AccessMode::ReadWrite => {
                return Err(conflict(AccessMode::Read))
            }
            LeaseState::Shared(holders) => holders.push(ticket),
            LeaseState::Free => {
                entry.state = match mode {
                    AccessMode::Read => LeaseState::Shared(SmallVec::from_elem(ticket, 1)),
                    AccessMode::ReadWrite => LeaseState::Exclusive(ticket),
                };
            }
        }
        let field = Arc::clone(&entry.field);
        inner.next_ticket += 1;
        Ok(FieldLease {
            registry: self,
            field,
            mode,
            ticket: Some(ticket),
        })
    }

    /// Forcibly clear every lease held on `name`.
    ///
    /// Outstanding [`FieldLease`] values stay usable but no longer count
    /// as holders; dropping them later is a no-op.
    pub fn release(&self, name: &FieldName) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let entry = inner
            .entries
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownField { name: name.clone() })?;
        if matches!(entry.state, LeaseState::Free) {
            return Err(RegistryError::NotLeased { name: name.clone() });
        }
        entry.state = LeaseState::Free;
        Ok(())
    }

    /// Whether any lease is held on `name`.
    pub fn is_leased(&self, name: &FieldName) -> bool {
        self.inner
            .lock()
            .entries
            .get(name)
            .is_some_and(|e| !matches!(e.state, LeaseState::Free))
    }

    fn return_ticket(&self, name: &FieldName, ticket: u64) {
        let mut inner = self.inner.lock();
        let Some(entry) = inner.entries.get_mut(name) else {
            return;
        };
        match &mut entry.state {
            LeaseState::Exclusive(t) if *t == ticket => entry.state = LeaseState::Free,
            LeaseState::Shared(holders) => {
                holders.retain(|t| *t != ticket);
                if holders.is_empty() {
                    entry.state = LeaseState::Free;
                }
            }
            _ => {}
        }
    }
}

impl fmt::Debug for DataConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataConnector")
            .field("fields", &self.field_names())
            .finish()
    }
}

/// A held lease on one registered field.
///
/// Dereferences to the [`Field`]. Returned to the registry on drop.
pub struct FieldLease<'r> {
    registry: &'r DataConnector,
    field: Arc<Field>,
    mode: AccessMode,
    ticket: Option<u64>,
}

impl FieldLease<'_> {
    /// Shared handle to the leased field, for work submitted to queues.
    pub fn field(&self) -> &Arc<Field> {
        &self.field
    }

    /// The access mode of this lease.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Return the lease now.
    pub fn release(mut self) {
        self.give_back();
    }

    fn give_back(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.registry.return_ticket(self.field.name(), ticket);
        }
    }
}

impl Deref for FieldLease<'_> {
    type Target = Field;

    fn deref(&self) -> &Field {
        &self.field
    }
}

impl Drop for FieldLease<'_> {
    fn drop(&mut self) {
        self.give_back();
    }
}

impl fmt::Debug for FieldLease<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldLease")
            .field("field", self.field.name())
            .field("mode", &self.mode)
            .finish()
    }
}
