//! Grid geometry: interior extent, guard margins and halo regions.

use splitwave_core::{Axis, Face, RegionError, Side, Size3};

/// Shape of one partition's grid.
///
/// The full buffer extent is `interior + 2 * guard` on every axis. The
/// interior holds the cells this partition owns (core and border); the
/// guard on each side mirrors the neighbouring partition's border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    interior: Size3,
    guard: Size3,
}

impl GridLayout {
    /// Validate and build a layout.
    ///
    /// Every interior axis must hold at least one cell, and an axis with a
    /// non-zero guard must have at least `guard` interior cells, because
    /// the halo sent to a neighbour is the `guard`-wide slab next to the
    /// face.
    pub fn new(interior: Size3, guard: Size3) -> Result<Self, RegionError> {
        for axis in Axis::ALL {
            let n = interior.get(axis);
            let g = guard.get(axis);
            if n == 0 {
                return Err(RegionError::NonPositiveExtent {
                    axis,
                    extent: 0,
                    margin_low: 0,
                    margin_high: 0,
                });
            }
            if n < g {
                return Err(RegionError::InteriorSmallerThanGuard {
                    axis,
                    interior: n,
                    guard: g,
                });
            }
        }
        Ok(Self { interior, guard })
    }

    /// Core + border extent.
    pub fn interior(&self) -> Size3 {
        self.interior
    }

    /// Guard width per axis (same on both sides).
    pub fn guard(&self) -> Size3 {
        self.guard
    }

    /// Full buffer extent including guards.
    pub fn full(&self) -> Size3 {
        self.interior.add(self.guard.scale(2))
    }

    /// Number of cells in the full buffer.
    pub fn cell_count(&self) -> usize {
        self.full().product()
    }

    /// Interior slab sent to the neighbour across `face`.
    ///
    /// The slab is `guard` cells thick along the face normal and spans the
    /// full buffer (guards included) on the other axes, so exchanging the
    /// axes one after another also fills edge and corner guards.
    /// Returns `None` when the axis has no guard.
    pub fn send_region(&self, face: Face) -> Option<Region> {
        let g = self.guard.get(face.axis);
        if g == 0 {
            return None;
        }
        let n = self.full().get(face.axis);
        let start = match face.side {
            Side::Low => g,
            Side::High => n - 2 * g,
        };
        Some(self.slab(face.axis, start, g))
    }

    /// Guard slab filled with data received across `face`.
    pub fn guard_region(&self, face: Face) -> Option<Region> {
        let g = self.guard.get(face.axis);
        if g == 0 {
            return None;
        }
        let n = self.full().get(face.axis);
        let start = match face.side {
            Side::Low => 0,
            Side::High => n - g,
        };
        Some(self.slab(face.axis, start, g))
    }

    fn slab(&self, axis: Axis, start: usize, width: usize) -> Region {
        let mut origin = [0usize; 3];
        let mut extent = self.full();
        origin[axis.index()] = start;
        extent.0[axis.index()] = width;
        Region { origin, extent }
    }
}

/// An axis-aligned box of cells in full-buffer coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Minimum corner.
    pub origin: [usize; 3],
    /// Cells per axis.
    pub extent: Size3,
}

impl Region {
    /// Number of cells in the region.
    pub fn cell_count(&self) -> usize {
        self.extent.product()
    }

    /// Full-buffer coordinates of every cell, x fastest.
    pub fn cells(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let o = self.origin;
        self.extent
            .indices()
            .map(move |i| [o[0] + i[0], o[1] + i[1], o[2] + i[2]])
    }
}
