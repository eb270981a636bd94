//! Device memory backing a grid buffer.

use parking_lot::{Mutex, MutexGuard};
use splitwave_core::FieldVector;

/// Zero-initialised cell storage shared between the host and the
/// device workers that run kernels and transfers against it.
///
/// Access is serialised by a single lock. Workers hold it only for the
/// duration of one kernel block sweep or one pack/unpack, never across
/// a blocking transport call.
pub struct DeviceMemory {
    cells: Mutex<Vec<FieldVector>>,
    len: usize,
}

impl DeviceMemory {
    /// Allocate `cell_count` zeroed cells.
    pub fn zeroed(cell_count: usize) -> Self {
        Self {
            cells: Mutex::new(vec![[0.0; 3]; cell_count]),
            len: cell_count,
        }
    }

    /// Lock the cells for exclusive access.
    pub fn lock(&self) -> MutexGuard<'_, Vec<FieldVector>> {
        self.cells.lock()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the allocation is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DeviceMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceMemory")
            .field("cells", &self.len)
            .finish()
    }
}

// Compile-time assertion: DeviceMemory must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<DeviceMemory>();
};
