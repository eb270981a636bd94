//! Field sources applied during the injection window.

use std::f32::consts::TAU;

use splitwave_core::{Axis, FieldVector};
use splitwave_grid::ViewMut;

/// Writes a prescribed source into the electric field.
///
/// Runs on the compute queue after the last sweep of a step and before
/// that sweep's exchange. `e` is the core+border view of E in the
/// untwisted frame.
pub trait SourceInjector: Send + Sync + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Apply the source for `step`.
    fn inject(&self, e: &mut ViewMut<'_>, step: u32);
}

/// A sinusoidal plane source: overwrites E on one interior plane.
///
/// `E = amplitude * sin(2π * step / period) * polarization` on the plane
/// `normal == index`. Planes outside the local interior are skipped, so
/// the same source can be handed to every partition with its local
/// index.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneSource {
    /// Axis normal to the source plane.
    pub normal: Axis,
    /// Interior index of the plane along `normal`.
    pub index: usize,
    /// Direction of the driven E field.
    pub polarization: FieldVector,
    /// Peak field strength.
    pub amplitude: f32,
    /// Oscillation period, in steps.
    pub period: f32,
}

impl PlaneSource {
    fn value(&self, step: u32) -> FieldVector {
        let phase = TAU * step as f32 / self.period;
        let s = self.amplitude * phase.sin();
        self.polarization.map(|p| p * s)
    }
}

impl SourceInjector for PlaneSource {
    fn name(&self) -> &str {
        "plane"
    }

    fn inject(&self, e: &mut ViewMut<'_>, step: u32) {
        let extent = e.size();
        let n = self.normal.index();
        if self.index >= extent.0[n] {
            return;
        }
        let value = self.value(step);
        for index in extent.indices().filter(|i| i[n] == self.index) {
            e.set(
                [index[0] as isize, index[1] as isize, index[2] as isize],
                value,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitwave_core::Size3;
    use splitwave_grid::{GridBuffer, GridLayout};

    #[test]
    fn plane_source_writes_only_its_plane() {
        let buffer = GridBuffer::new(GridLayout::new(Size3::new(4, 3, 1), Size3::new(1, 1, 0)).unwrap());
        let source = PlaneSource {
            normal: Axis::X,
            index: 2,
            polarization: [0.0, 1.0, 0.0],
            amplitude: 2.0,
            period: 4.0,
        };
        {
            let layout = buffer.core_border().layout();
            let mut cells = buffer.memory().lock();
            let mut view = ViewMut::new(&mut cells[..], layout);
            // Quarter period: sin = 1.
            source.inject(&mut view, 1);
        }
        let view = buffer.core_border();
        for y in 0..3 {
            assert_eq!(view.read([2, y, 0]), [0.0, 2.0, 0.0]);
            assert_eq!(view.read([1, y, 0]), [0.0; 3]);
        }
    }

    #[test]
    fn plane_outside_interior_is_skipped() {
        let buffer = GridBuffer::new(GridLayout::new(Size3::new(2, 2, 1), Size3::new(1, 1, 0)).unwrap());
        let source = PlaneSource {
            normal: Axis::Y,
            index: 5,
            polarization: [1.0, 0.0, 0.0],
            amplitude: 1.0,
            period: 4.0,
        };
        let layout = buffer.core_border().layout();
        let mut cells = buffer.memory().lock();
        source.inject(&mut ViewMut::new(&mut cells[..], layout), 1);
        assert!(cells.iter().all(|c| *c == [0.0; 3]));
    }
}
