//! The [`GridBuffer`]: one partition's grid in device memory.

use std::sync::Arc;

use splitwave_core::{Axis, FieldVector, RegionError, Size3, TransportError};

use crate::layout::{GridLayout, Region};
use crate::memory::DeviceMemory;
use crate::view::{signed, SubView, ViewLayout};

/// Owns exactly one grid on one device.
///
/// Created once at setup and kept for the whole run. The memory handle
/// is shared with device workers; the buffer itself is not `Clone`.
pub struct GridBuffer {
    layout: GridLayout,
    memory: Arc<DeviceMemory>,
}

impl GridBuffer {
    /// Allocate a zeroed buffer for `layout`.
    pub fn new(layout: GridLayout) -> Self {
        Self {
            memory: Arc::new(DeviceMemory::zeroed(layout.cell_count())),
            layout,
        }
    }

    /// The buffer's geometry.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Shared handle to the device memory, for work submitted to queues.
    pub fn memory(&self) -> &Arc<DeviceMemory> {
        &self.memory
    }

    /// Sub-region shrunk by `margin_low` cells from the minimum corner and
    /// `margin_high` cells from the maximum corner of the full buffer.
    ///
    /// Fails with [`RegionError::NonPositiveExtent`] if any axis would be
    /// left with no cells. Nothing is copied.
    pub fn view(&self, margin_low: Size3, margin_high: Size3) -> Result<SubView<'_>, RegionError> {
        let full = self.layout.full();
        let mut extent = [0usize; 3];
        for axis in Axis::ALL {
            let n = full.get(axis);
            let lo = margin_low.get(axis);
            let hi = margin_high.get(axis);
            match n.checked_sub(lo).and_then(|r| r.checked_sub(hi)) {
                Some(e) if e > 0 => extent[axis.index()] = e,
                _ => {
                    return Err(RegionError::NonPositiveExtent {
                        axis,
                        extent: n,
                        margin_low: lo,
                        margin_high: hi,
                    })
                }
            }
        }
        let origin = full.linear(margin_low.0);
        let strides = [1, full.x() as isize, (full.x() * full.y()) as isize];
        Ok(SubView::new(
            self,
            ViewLayout::new(origin, strides, Size3(extent)),
        ))
    }

    /// The core + border region: the full buffer minus the guard on
    /// every side.
    pub fn core_border(&self) -> SubView<'_> {
        let guard = self.layout.guard();
        let full = self.layout.full();
        let strides = [1, full.x() as isize, (full.x() * full.y()) as isize];
        SubView::new(
            self,
            ViewLayout::new(full.linear(guard.0), strides, self.layout.interior()),
        )
    }

    /// Host read of one cell at full-buffer coordinates.
    pub fn read_cell(&self, index: [usize; 3]) -> FieldVector {
        self.memory.lock()[self.layout.full().linear(index)]
    }

    /// Host write of one cell at full-buffer coordinates.
    pub fn write_cell(&self, index: [usize; 3], value: FieldVector) {
        let at = self.layout.full().linear(index);
        self.memory.lock()[at] = value;
    }

    /// Initialise every interior cell from its interior coordinates.
    pub fn fill_interior_with(&self, mut f: impl FnMut([usize; 3]) -> FieldVector) {
        let view = self.core_border().layout();
        let mut cells = self.memory.lock();
        for index in self.layout.interior().indices() {
            cells[view.offset(signed(index))] = f(index);
        }
    }

    /// Copy the interior out, x fastest.
    pub fn interior_to_vec(&self) -> Vec<FieldVector> {
        let view = self.core_border().layout();
        let cells = self.memory.lock();
        self.layout
            .interior()
            .indices()
            .map(|index| cells[view.offset(signed(index))])
            .collect()
    }

    /// Copy a region out, x fastest.
    pub fn pack(&self, region: &Region) -> Vec<FieldVector> {
        let full = self.layout.full();
        let cells = self.memory.lock();
        region.cells().map(|i| cells[full.linear(i)]).collect()
    }

    /// Copy `data` into a region, x fastest.
    ///
    /// Fails with [`TransportError::PayloadMismatch`] if `data` does not
    /// have exactly one value per region cell; nothing is written then.
    pub fn unpack(&self, region: &Region, data: &[FieldVector]) -> Result<(), TransportError> {
        if data.len() != region.cell_count() {
            return Err(TransportError::PayloadMismatch {
                expected: region.cell_count(),
                received: data.len(),
            });
        }
        let full = self.layout.full();
        let mut cells = self.memory.lock();
        for (i, value) in region.cells().zip(data) {
            cells[full.linear(i)] = *value;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GridBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridBuffer")
            .field("interior", &self.layout.interior())
            .field("guard", &self.layout.guard())
            .finish()
    }
}
