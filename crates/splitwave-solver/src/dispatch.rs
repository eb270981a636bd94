//! The axis-sweep kernel dispatcher.
//!
//! A sweep twists the E and B views so the sweep axis becomes the fast
//! axis, tiles the transverse plane into blocks and runs the stencil over
//! every line of every block. Each line is gathered with its guard
//! neighbourhood before anything is written, so the in-place update sees
//! only old values along the line.

use std::sync::Arc;

use splitwave_core::{AxisTwist, ConfigError, FieldVector, Size3};
use splitwave_event::{DeviceQueue, Event};
use splitwave_grid::{SubView, ViewMut};
use tracing::debug;

use crate::stencil::SplitStencil;

/// Launches a [`SplitStencil`] over twisted views on a device queue.
#[derive(Clone)]
pub struct AxisSweep {
    stencil: Arc<dyn SplitStencil>,
    block: Size3,
}

impl AxisSweep {
    /// Dispatcher for `stencil` with kernel block extents `block`.
    ///
    /// Fails with [`ConfigError::InvalidBlockSize`] if `block` has a zero
    /// component.
    pub fn new(stencil: Arc<dyn SplitStencil>, block: Size3) -> Result<Self, ConfigError> {
        if !block.is_positive() {
            return Err(ConfigError::InvalidBlockSize { block });
        }
        Ok(Self { stencil, block })
    }

    /// The stencil being dispatched.
    pub fn stencil(&self) -> &Arc<dyn SplitStencil> {
        &self.stencil
    }

    /// Submit one sweep along `twist.fast_axis()`.
    ///
    /// `e` and `b` are the core+border views of two distinct buffers and
    /// `grid` is their common extent, all in the untwisted frame. The
    /// sweep runs after `depends_on` and returns without blocking.
    ///
    /// Fails with [`ConfigError::SharedFieldBuffer`] if `e` and `b` view
    /// the same buffer; nothing is submitted then.
    pub fn sweep(
        &self,
        queue: &DeviceQueue,
        twist: AxisTwist,
        e: SubView<'_>,
        b: SubView<'_>,
        grid: Size3,
        depends_on: &Event,
    ) -> Result<Event, ConfigError> {
        let e_memory = Arc::clone(e.buffer().memory());
        let b_memory = Arc::clone(b.buffer().memory());
        if Arc::ptr_eq(&e_memory, &b_memory) {
            return Err(ConfigError::SharedFieldBuffer);
        }
        let e_layout = e.layout().twist(twist);
        let b_layout = b.layout().twist(twist);
        let extent = twist.apply_size(grid);
        let block = twist.apply_size(self.block);
        let stencil = Arc::clone(&self.stencil);

        debug!(
            axis = %twist.fast_axis(),
            stencil = stencil.name(),
            extent = %extent,
            "launching sweep"
        );
        Ok(queue.submit("axis-sweep", depends_on, move || {
            let mut e_cells = e_memory.lock();
            let mut b_cells = b_memory.lock();
            let mut e_view = ViewMut::new(&mut e_cells[..], e_layout);
            let mut b_view = ViewMut::new(&mut b_cells[..], b_layout);
            let mut lines = LineScratch::new(extent.x(), stencil.radius());
            for j0 in (0..extent.y()).step_by(block.y()) {
                for k0 in (0..extent.z()).step_by(block.z()) {
                    for k in k0..(k0 + block.z()).min(extent.z()) {
                        for j in j0..(j0 + block.y()).min(extent.y()) {
                            lines.run(&*stencil, &mut e_view, &mut b_view, j, k);
                        }
                    }
                }
            }
            Ok(())
        }))
    }
}

impl std::fmt::Debug for AxisSweep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisSweep")
            .field("stencil", &self.stencil.name())
            .field("block", &self.block)
            .finish()
    }
}

/// Reusable line buffers for one sweep.
struct LineScratch {
    len: usize,
    radius: usize,
    e: Vec<FieldVector>,
    b: Vec<FieldVector>,
    e_out: Vec<FieldVector>,
    b_out: Vec<FieldVector>,
}

impl LineScratch {
    fn new(len: usize, radius: usize) -> Self {
        let padded = len + 2 * radius;
        Self {
            len,
            radius,
            e: vec![[0.0; 3]; padded],
            b: vec![[0.0; 3]; padded],
            e_out: vec![[0.0; 3]; len],
            b_out: vec![[0.0; 3]; len],
        }
    }

    fn run(
        &mut self,
        stencil: &dyn SplitStencil,
        e_view: &mut ViewMut<'_>,
        b_view: &mut ViewMut<'_>,
        j: usize,
        k: usize,
    ) {
        let (j, k, r) = (j as isize, k as isize, self.radius as isize);
        for (n, i) in (-r..self.len as isize + r).enumerate() {
            self.e[n] = e_view.get([i, j, k]);
            self.b[n] = b_view.get([i, j, k]);
        }
        let interior = self.radius..self.radius + self.len;
        self.e_out.copy_from_slice(&self.e[interior.clone()]);
        self.b_out.copy_from_slice(&self.b[interior]);
        stencil.update_line(&self.e, &self.b, &mut self.e_out, &mut self.b_out);
        for i in 0..self.len {
            e_view.set([i as isize, j, k], self.e_out[i]);
            b_view.set([i as isize, j, k], self.b_out[i]);
        }
    }
}
