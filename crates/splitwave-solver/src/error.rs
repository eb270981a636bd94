//! Solver and registry error types.

use std::error::Error;
use std::fmt;

use splitwave_core::{ConfigError, FieldName, RegionError, TransportError};

use crate::registry::AccessMode;

/// Errors from the [`DataConnector`](crate::DataConnector) field registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// No field is registered under this name.
    UnknownField {
        /// The unresolved name.
        name: FieldName,
    },
    /// A field with this name is already registered.
    DuplicateField {
        /// The duplicate name.
        name: FieldName,
    },
    /// The requested access conflicts with a lease already held.
    AlreadyLeased {
        /// The contested field.
        name: FieldName,
        /// Mode of the lease currently held.
        held: AccessMode,
    },
    /// Release of a field nobody holds.
    NotLeased {
        /// The field that was not leased.
        name: FieldName,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { name } => write!(f, "field '{name}' is not registered"),
            Self::DuplicateField { name } => write!(f, "field '{name}' is already registered"),
            Self::AlreadyLeased { name, held } => {
                write!(f, "field '{name}' is already leased for {held}")
            }
            Self::NotLeased { name } => write!(f, "field '{name}' is not leased"),
        }
    }
}

impl Error for RegistryError {}

/// Any failure of a solver invocation.
///
/// Every variant is fatal to the step. Leases taken by the step have
/// been released by the time the error reaches the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// Setup or consistency violation, including unknown field names.
    Configuration(ConfigError),
    /// A sub-view could not be formed.
    Region(RegionError),
    /// Halo exchange or device worker failure.
    Transport(TransportError),
    /// A lease could not be taken or returned.
    Registry(RegistryError),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
            Self::Region(e) => write!(f, "region error: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Registry(e) => write!(f, "registry error: {e}"),
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            Self::Region(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Registry(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e)
    }
}

impl From<RegionError> for SolverError {
    fn from(e: RegionError) -> Self {
        Self::Region(e)
    }
}

impl From<TransportError> for SolverError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

/// Unknown names are configuration errors; every other registry failure
/// stays a registry error.
impl From<RegistryError> for SolverError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownField { name } => {
                Self::Configuration(ConfigError::UnknownField { name })
            }
            other => Self::Registry(other),
        }
    }
}
