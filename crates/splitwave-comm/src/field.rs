//! A named distributed field: one partition's grid plus exchange state.

use std::sync::atomic::{AtomicU64, Ordering};

use splitwave_core::FieldName;
use splitwave_grid::{GridBuffer, GridLayout};

/// One partition's share of a distributed vector field.
#[derive(Debug)]
pub struct Field {
    name: FieldName,
    buffer: GridBuffer,
    exchange_seq: AtomicU64,
}

impl Field {
    /// Allocate a zeroed field.
    pub fn new(name: impl Into<FieldName>, layout: GridLayout) -> Self {
        Self {
            name: name.into(),
            buffer: GridBuffer::new(layout),
            exchange_seq: AtomicU64::new(0),
        }
    }

    /// Registry name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// The field's grid buffer.
    pub fn buffer(&self) -> &GridBuffer {
        &self.buffer
    }

    /// Number of exchanges issued so far.
    pub fn exchanges_issued(&self) -> u64 {
        self.exchange_seq.load(Ordering::Acquire)
    }

    /// Claim the sequence number for the next exchange.
    pub(crate) fn next_sequence(&self) -> u64 {
        self.exchange_seq.fetch_add(1, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitwave_core::{Size3, FIELD_B};

    #[test]
    fn sequence_advances_per_claim() {
        let layout = GridLayout::new(Size3::new(2, 2, 1), Size3::new(1, 1, 0)).unwrap();
        let f = Field::new(FIELD_B, layout);
        assert_eq!(f.name(), &FIELD_B);
        assert_eq!(f.next_sequence(), 0);
        assert_eq!(f.next_sequence(), 1);
        assert_eq!(f.exchanges_issued(), 2);
    }
}
