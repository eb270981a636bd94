//! Strongly-typed identifiers for fields and partitions.

use std::borrow::Cow;
use std::fmt;

/// Symbolic name of a distributed field, as resolved by the field registry.
///
/// Built-in names are `const` and never allocate; user-defined names may
/// be owned strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(Cow<'static, str>);

/// Registry name of the electric field.
pub const FIELD_E: FieldName = FieldName::from_static("FieldE");

/// Registry name of the magnetic field.
pub const FIELD_B: FieldName = FieldName::from_static("FieldB");

impl FieldName {
    /// Name backed by a static string.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FieldName {
    fn from(v: &'static str) -> Self {
        Self::from_static(v)
    }
}

impl From<String> for FieldName {
    fn from(v: String) -> Self {
        Self(Cow::Owned(v))
    }
}

/// Identifies one partition (device) of the decomposed domain.
///
/// Ranks are assigned x-fastest over the partition grid:
/// `rank = px + nx * (py + ny * pz)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u32);

impl Rank {
    /// The rank as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Rank {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
